//! Placeholder example values for schemas

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::resolver;
use crate::constants::{MAX_SYNTH_DEPTH, MAX_SYNTH_NODES};

/// Build a deterministic placeholder value shaped like `schema`.
///
/// Precedence: `example`, then `default`, then a zero value for the declared
/// type. Objects recurse over their properties in declaration order and arrays
/// hold one synthesized item. Unknown or missing types become `{}`, as does a
/// schema that refers back to one of its own ancestors. Once
/// [`MAX_SYNTH_NODES`] values have been built, the rest become `{}` too.
pub fn synthesize<'a>(schema: &'a Value, spec: &'a Value) -> Value {
    Synthesizer {
        spec,
        active: Vec::new(),
        budget: MAX_SYNTH_NODES,
    }
    .value_for(schema, 0)
}

struct Synthesizer<'a> {
    spec: &'a Value,
    /// `$ref` pointers being expanded on the current path
    active: Vec<&'a str>,
    /// Values left to build
    budget: usize,
}

impl<'a> Synthesizer<'a> {
    fn value_for(&mut self, schema: &'a Value, depth: usize) -> Value {
        if depth > MAX_SYNTH_DEPTH {
            tracing::debug!(depth, "Schema nesting too deep");
            return empty_object();
        }
        if self.budget == 0 {
            return empty_object();
        }
        self.budget -= 1;
        if self.budget == 0 {
            tracing::debug!(limit = MAX_SYNTH_NODES, "Synthesis budget used up");
        }

        let pointer = resolver::reference(schema);
        if let Some(pointer) = pointer {
            if self.active.contains(&pointer) {
                tracing::debug!(pointer, "Recursive schema cut short");
                return empty_object();
            }
            self.active.push(pointer);
        }

        let resolved = resolver::resolve(schema, self.spec);
        let value = self.value_for_resolved(resolved, depth);

        if pointer.is_some() {
            self.active.pop();
        }
        value
    }

    fn value_for_resolved(&mut self, schema: &'a Value, depth: usize) -> Value {
        if let Some(example) = schema.get("example") {
            return example.clone();
        }
        if let Some(default) = schema.get("default") {
            return default.clone();
        }

        match schema.get("type").and_then(Value::as_str) {
            Some("object") => {
                let mut object = Map::new();
                if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                    for (name, property) in properties {
                        object.insert(name.clone(), self.value_for(property, depth + 1));
                    }
                }
                Value::Object(object)
            }
            Some("array") => {
                let item = match schema.get("items") {
                    Some(items) => self.value_for(items, depth + 1),
                    None => empty_object(),
                };
                Value::Array(vec![item])
            }
            Some("integer") => json!(0),
            Some("number") => json!(0.0),
            Some("boolean") => json!(false),
            Some("string") => string_for_format(schema.get("format").and_then(Value::as_str)),
            _ => empty_object(),
        }
    }
}

fn string_for_format(format: Option<&str>) -> Value {
    match format {
        Some("date-time") => json!(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)),
        Some("date") => json!(Utc::now().date_naive().to_string()),
        Some("uuid") => json!(Uuid::nil().to_string()),
        _ => json!(""),
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
