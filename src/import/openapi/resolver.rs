//! `$ref` resolution for in-document pointers

use std::collections::HashSet;

use serde_json::Value;

use crate::constants::MAX_REF_HOPS;

/// Supported pointer prefixes and the path of the map each one indexes
const NAMESPACES: [(&str, &[&str]); 7] = [
    // Swagger 2.0
    ("#/definitions/", &["definitions"]),
    ("#/parameters/", &["parameters"]),
    ("#/responses/", &["responses"]),
    // OpenAPI 3.0
    ("#/components/schemas/", &["components", "schemas"]),
    ("#/components/parameters/", &["components", "parameters"]),
    ("#/components/responses/", &["components", "responses"]),
    ("#/components/requestBodies/", &["components", "requestBodies"]),
];

/// The `$ref` pointer of a schema, if it has one
pub fn reference(schema: &Value) -> Option<&str> {
    schema.get("$ref")?.as_str()
}

/// Looks one pointer up. The trailing segment indexes the namespace's map.
pub fn lookup<'a>(pointer: &str, spec: &'a Value) -> Option<&'a Value> {
    let (prefix, path) = NAMESPACES
        .iter()
        .find(|(prefix, _)| pointer.starts_with(prefix))?;

    let name = pointer[prefix.len()..].rsplit('/').next()?;
    let name = name.replace("~1", "/").replace("~0", "~");

    let mut node = spec;
    for segment in path.iter() {
        node = node.get(segment)?;
    }
    node.get(name.as_str())
}

/// Dereference `schema` against `spec`.
///
/// Schemas without `$ref` come back unchanged, as do pointers with an
/// unsupported prefix or a missing target. A target that is itself a `$ref`
/// is followed, at most [`MAX_REF_HOPS`] times and never through the same
/// pointer twice.
pub fn resolve<'a>(schema: &'a Value, spec: &'a Value) -> &'a Value {
    let mut current = schema;
    let mut visited: HashSet<&str> = HashSet::new();

    for _ in 0..MAX_REF_HOPS {
        let Some(pointer) = reference(current) else {
            return current;
        };
        if !visited.insert(pointer) {
            tracing::warn!(pointer, "Circular $ref chain");
            return current;
        }
        match lookup(pointer, spec) {
            Some(target) => current = target,
            None => {
                tracing::debug!(pointer, "Unresolvable $ref left as is");
                return current;
            }
        }
    }

    tracing::warn!("$ref chain too long");
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> Value {
        json!({
            "definitions": { "Pet": { "type": "object" } },
            "parameters": { "limit": { "name": "limit", "in": "query" } },
            "responses": { "NotFound": { "description": "missing" } },
            "components": {
                "schemas": {
                    "User": { "type": "string" },
                    "Alias": { "$ref": "#/components/schemas/User" },
                    "Loop": { "$ref": "#/components/schemas/Loop" },
                    "a/b": { "type": "integer" }
                },
                "parameters": { "page": { "name": "page", "in": "query" } },
                "responses": { "Ok": { "description": "ok" } },
                "requestBodies": { "NewUser": { "content": {} } }
            }
        })
    }

    #[test]
    fn test_no_ref_is_identity() {
        let spec = spec();
        let schema = json!({ "type": "integer" });
        assert_eq!(resolve(&schema, &spec), &schema);
    }

    #[test]
    fn test_every_namespace_resolves_to_exact_object() {
        let spec = spec();
        let cases = [
            ("#/definitions/Pet", &spec["definitions"]["Pet"]),
            ("#/parameters/limit", &spec["parameters"]["limit"]),
            ("#/responses/NotFound", &spec["responses"]["NotFound"]),
            ("#/components/schemas/User", &spec["components"]["schemas"]["User"]),
            ("#/components/parameters/page", &spec["components"]["parameters"]["page"]),
            ("#/components/responses/Ok", &spec["components"]["responses"]["Ok"]),
            (
                "#/components/requestBodies/NewUser",
                &spec["components"]["requestBodies"]["NewUser"],
            ),
        ];
        for (pointer, expected) in cases {
            let schema = json!({ "$ref": pointer });
            assert_eq!(resolve(&schema, &spec), expected, "{}", pointer);
        }
    }

    #[test]
    fn test_unknown_prefix_is_identity() {
        let spec = spec();
        let schema = json!({ "$ref": "other.yaml#/Pet" });
        assert_eq!(resolve(&schema, &spec), &schema);

        let missing = json!({ "$ref": "#/components/schemas/Nope" });
        assert_eq!(resolve(&missing, &spec), &missing);
    }

    #[test]
    fn test_follows_chained_refs() {
        let spec = spec();
        let schema = json!({ "$ref": "#/components/schemas/Alias" });
        assert_eq!(resolve(&schema, &spec), &json!({ "type": "string" }));
    }

    #[test]
    fn test_self_reference_terminates() {
        let spec = spec();
        let schema = json!({ "$ref": "#/components/schemas/Loop" });
        let resolved = resolve(&schema, &spec);
        assert_eq!(reference(resolved), Some("#/components/schemas/Loop"));
    }

    #[test]
    fn test_escaped_pointer_segment() {
        let spec = spec();
        assert_eq!(
            lookup("#/components/schemas/a~1b", &spec),
            Some(&json!({ "type": "integer" }))
        );
    }
}
