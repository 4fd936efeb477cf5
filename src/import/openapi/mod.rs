//! OpenAPI/Swagger specification importer
//!
//! A spec is turned into an [`ImportPlan`] (folders and request templates held
//! in memory) by the v2 or v3 planner, then the plan is written through the
//! repositories inside a single transaction.

pub mod resolver;
pub mod synthesizer;
mod v2;
mod v3;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::constants::{SPEC_EXTENSIONS, UNTITLED_SPEC};
use crate::error::ImportError;
use crate::models::{Folder, Header, HttpMethod, Id, Param, Request};
use crate::storage::Store;

pub use resolver::resolve;
pub use synthesizer::synthesize;

/// Spec flavour, from the top-level `swagger` / `openapi` field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecVersion {
    V2,
    V3,
}

/// What an import created
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSummary {
    pub root_folder_id: Id,
    pub folders: usize,
    pub requests: usize,
}

/// Import the spec stored at `path`
pub fn import_spec_file<S: Store>(path: &Path, store: &mut S) -> Result<ImportSummary, ImportError> {
    let bytes = fs::read(path).map_err(|err| {
        tracing::warn!(path = %path.display(), error = %err, "Cannot read spec file");
        ImportError::InvalidFile
    })?;
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    import_spec(&bytes, extension, store)
}

/// Import a spec document. `extension` picks the parser (`json`, `yaml`, `yml`).
///
/// Nothing is written unless the whole document was planned successfully, and
/// a failed write rolls back everything written before it.
pub fn import_spec<S: Store>(
    bytes: &[u8],
    extension: &str,
    store: &mut S,
) -> Result<ImportSummary, ImportError> {
    let spec = parse_document(bytes, extension)?;
    let version = detect_version(&spec)?;
    tracing::info!(?version, "Importing spec");

    let plan = match version {
        SpecVersion::V2 => v2::plan(&spec)?,
        SpecVersion::V3 => v3::plan(&spec)?,
    };
    persist(plan, store)
}

/// Parse JSON or YAML into a JSON value whose root must be an object
pub fn parse_document(bytes: &[u8], extension: &str) -> Result<Value, ImportError> {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    if !SPEC_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ImportError::InvalidFile);
    }

    let document: Value = if extension == "json" {
        serde_json::from_slice(bytes).map_err(|err| {
            tracing::debug!(error = %err, "Malformed JSON spec");
            ImportError::InvalidFile
        })?
    } else {
        // Through serde_yaml::Value so non-string keys (`200:`) become strings
        let yaml: serde_yaml::Value = serde_yaml::from_slice(bytes).map_err(|err| {
            tracing::debug!(error = %err, "Malformed YAML spec");
            ImportError::InvalidFile
        })?;
        serde_json::to_value(yaml).map_err(|_| ImportError::InvalidFile)?
    };

    if !document.is_object() {
        return Err(ImportError::InvalidFile);
    }
    Ok(document)
}

/// Read the version field. Only `2.0.x` and `3.0.x` strings are accepted.
pub fn detect_version(spec: &Value) -> Result<SpecVersion, ImportError> {
    let version = spec
        .get("swagger")
        .or_else(|| spec.get("openapi"))
        .and_then(Value::as_str)
        .ok_or(ImportError::InvalidVersion)?;

    if version.starts_with("2.0") {
        Ok(SpecVersion::V2)
    } else if version.starts_with("3.0") {
        Ok(SpecVersion::V3)
    } else {
        Err(ImportError::InvalidVersion)
    }
}

/// A request waiting for its folder id
#[derive(Debug)]
pub(crate) struct PlannedRequest {
    pub tag: Option<String>,
    pub request: Request,
}

#[derive(Debug)]
pub(crate) struct ImportPlan {
    pub title: String,
    pub tags: Vec<String>,
    pub requests: Vec<PlannedRequest>,
}

impl ImportPlan {
    fn new(spec: &Value) -> Self {
        let title = spec
            .pointer("/info/title")
            .and_then(Value::as_str)
            .unwrap_or(UNTITLED_SPEC)
            .to_string();

        let mut tags: Vec<String> = Vec::new();
        for name in spec
            .get("tags")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|tag| tag.get("name").and_then(Value::as_str))
        {
            if !tags.iter().any(|t| t == name) {
                tags.push(name.to_string());
            }
        }

        ImportPlan {
            title,
            tags,
            requests: Vec::new(),
        }
    }
}

fn persist<S: Store>(plan: ImportPlan, store: &mut S) -> Result<ImportSummary, ImportError> {
    // A rollback here would also discard the caller's pending writes
    if store.in_transaction() {
        return Err(ImportError::Unexpected(
            "spec import started inside an open transaction".into(),
        ));
    }
    store.begin();
    match write_plan(plan, store) {
        Ok(summary) => {
            store.commit()?;
            tracing::info!(
                folders = summary.folders,
                requests = summary.requests,
                "Spec imported"
            );
            Ok(summary)
        }
        Err(err) => {
            store.rollback();
            tracing::warn!(error = %err, "Spec import rolled back");
            Err(err)
        }
    }
}

fn write_plan<S: Store>(plan: ImportPlan, store: &mut S) -> Result<ImportSummary, ImportError> {
    let root = store.create_folder(Folder::new(None, plan.title))?;
    let root_id = root.id.ok_or_else(|| ImportError::Unexpected("folder stored without id".into()))?;

    let mut tag_folders: HashMap<String, Id> = HashMap::new();
    for tag in plan.tags {
        let folder = store.create_folder(Folder::new(Some(root_id), tag.clone()))?;
        if let Some(id) = folder.id {
            tag_folders.insert(tag, id);
        }
    }

    let requests = plan.requests.len();
    for planned in plan.requests {
        let folder_id = planned
            .tag
            .as_ref()
            .and_then(|tag| tag_folders.get(tag))
            .copied()
            .unwrap_or(root_id);
        store.create_request(Request {
            folder_id,
            ..planned.request
        })?;
    }

    Ok(ImportSummary {
        root_folder_id: root_id,
        folders: 1 + tag_folders.len(),
        requests,
    })
}

/// One path × method pair of the spec
pub(crate) struct Operation<'a> {
    pub path: &'a str,
    pub method: HttpMethod,
    pub operation: &'a Value,
    /// Resolved parameter objects, operation-level first, then inherited path-level ones
    pub parameters: Vec<&'a Value>,
}

impl<'a> Operation<'a> {
    /// Name from `operationId`, `summary`, or the path without its leading slash
    pub fn name(&self) -> String {
        self.operation
            .get("operationId")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.operation
                    .get("summary")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_else(|| self.path.trim_start_matches('/'))
            .to_string()
    }

    pub fn first_tag(&self) -> Option<String> {
        self.operation
            .get("tags")?
            .as_array()?
            .first()?
            .as_str()
            .map(String::from)
    }

    pub fn parameters_in(&self, location: &'a str) -> impl Iterator<Item = &'a Value> + '_ {
        self.parameters
            .iter()
            .copied()
            .filter(move |p| p.get("in").and_then(Value::as_str) == Some(location))
    }

    /// Request template with url, disabled header/query entries and placement tag
    pub fn planned_request(&self, base_url: &str) -> PlannedRequest {
        let mut request = Request::new(0, self.name());
        request.method = self.method;
        request.url = format!("{}{}", base_url, self.path);
        request.headers = self
            .parameters_in("header")
            .filter_map(parameter_name)
            .map(|name| Header::disabled(name, ""))
            .collect();
        request.params = self
            .parameters_in("query")
            .filter_map(parameter_name)
            .map(|name| Param::disabled(name, ""))
            .collect();

        PlannedRequest {
            tag: self.first_tag(),
            request,
        }
    }
}

pub(crate) fn parameter_name(parameter: &Value) -> Option<&str> {
    parameter.get("name").and_then(Value::as_str)
}

/// Every operation of the spec, in document order
pub(crate) fn operations(spec: &Value) -> Vec<Operation<'_>> {
    let mut operations = Vec::new();
    let Some(paths) = spec.get("paths").and_then(Value::as_object) else {
        return operations;
    };

    for (path, item) in paths {
        let item = resolve(item, spec);
        let Some(methods) = item.as_object() else {
            continue;
        };
        let shared: Vec<&Value> = resolved_parameters(item, spec);

        for (key, operation) in methods {
            let Ok(method) = key.parse::<HttpMethod>() else {
                // `parameters`, `summary`, `servers`, vendor extensions...
                continue;
            };
            if !operation.is_object() {
                continue;
            }

            let mut parameters = resolved_parameters(operation, spec);
            for &inherited in &shared {
                let overridden = parameters.iter().any(|p| {
                    p.get("name") == inherited.get("name") && p.get("in") == inherited.get("in")
                });
                if !overridden {
                    parameters.push(inherited);
                }
            }

            operations.push(Operation {
                path: path.as_str(),
                method,
                operation,
                parameters,
            });
        }
    }

    operations
}

fn resolved_parameters<'a>(node: &'a Value, spec: &'a Value) -> Vec<&'a Value> {
    node.get("parameters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|parameter| resolve(parameter, spec))
        .filter(|parameter| parameter_name(parameter).is_some())
        .collect()
}

/// Pretty-print with a 4-space indent
pub(crate) fn pretty_json(value: &Value) -> Result<String, ImportError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|err| ImportError::Unexpected(err.to_string()))?;
    String::from_utf8(out).map_err(|err| ImportError::Unexpected(err.to_string()))
}

/// Stringify an example for a form field
pub(crate) fn example_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RepoError, RepoResult};
    use crate::models::{AuthPreset, Body, Environment, Folder};
    use crate::storage::{
        AuthPresetRepository, EnvironmentRepository, FolderRepository, RequestRepository,
        Storage, Transactional,
    };
    use pretty_assertions::assert_eq;

    const PETSTORE_V3: &str = r#"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
servers:
  - url: https://api.example.com/v1
tags:
  - name: pets
paths:
  /pets:
    get:
      operationId: listPets
      tags: [pets]
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
        - name: X-Trace
          in: header
          schema:
            type: string
      responses:
        200:
          description: OK
    post:
      summary: Create pet
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Pet'
      responses:
        201:
          description: Created
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
        age:
          type: integer
"#;

    fn all_requests(storage: &Storage) -> Vec<Request> {
        let mut out = Vec::new();
        let mut pending: Vec<Option<Id>> = vec![None];
        while let Some(parent) = pending.pop() {
            for folder in storage.list_folders(parent).unwrap() {
                out.extend(storage.list_requests(folder.id.unwrap()).unwrap());
                pending.push(folder.id);
            }
        }
        out
    }

    fn folder_count(storage: &Storage) -> usize {
        let mut count = 0;
        let mut pending: Vec<Option<Id>> = vec![None];
        while let Some(parent) = pending.pop() {
            for folder in storage.list_folders(parent).unwrap() {
                count += 1;
                pending.push(folder.id);
            }
        }
        count
    }

    #[test]
    fn test_import_v3_places_requests() {
        let mut storage = Storage::in_memory();
        let summary = import_spec(PETSTORE_V3.as_bytes(), "yaml", &mut storage).unwrap();

        assert_eq!(summary.folders, 2);
        assert_eq!(summary.requests, 2);
        assert_eq!(folder_count(&storage), 2);

        let root = storage.get_folder(summary.root_folder_id).unwrap();
        assert_eq!(root.name, "Petstore");
        let tag_folder = &storage.list_folders(root.id).unwrap()[0];
        assert_eq!(tag_folder.name, "pets");

        let tagged = storage.list_requests(tag_folder.id.unwrap()).unwrap();
        assert_eq!(tagged.len(), 1);
        let list = &tagged[0];
        assert_eq!(list.name, "listPets");
        assert_eq!(list.method, HttpMethod::GET);
        assert_eq!(list.url, "https://api.example.com/v1/pets");
        assert_eq!(list.params, vec![Param::disabled("limit", "")]);
        assert_eq!(list.headers, vec![Header::disabled("X-Trace", "")]);

        let untagged = storage.list_requests(summary.root_folder_id).unwrap();
        assert_eq!(untagged.len(), 1);
        let create = &untagged[0];
        assert_eq!(create.name, "Create pet");
        assert_eq!(create.method, HttpMethod::POST);
        assert_eq!(
            create.body,
            Body::json("{\n    \"name\": \"\",\n    \"age\": 0\n}")
        );
    }

    #[test]
    fn test_invalid_file_creates_nothing() {
        let mut storage = Storage::in_memory();
        assert_eq!(
            import_spec(PETSTORE_V3.as_bytes(), "txt", &mut storage),
            Err(ImportError::InvalidFile)
        );
        assert_eq!(
            import_spec(b"{ not json", "json", &mut storage),
            Err(ImportError::InvalidFile)
        );
        assert_eq!(
            import_spec(b"[1, 2]", "json", &mut storage),
            Err(ImportError::InvalidFile)
        );
        assert_eq!(folder_count(&storage), 0);
    }

    #[test]
    fn test_invalid_version_creates_nothing() {
        let mut storage = Storage::in_memory();
        for doc in [
            r#"{"swagger": "1.0", "info": {"title": "Old"}}"#,
            r#"{"openapi": "3.1.0", "info": {"title": "New"}}"#,
            r#"{"openapi": 3.0, "info": {"title": "Number"}}"#,
            r#"{"info": {"title": "None"}}"#,
        ] {
            assert_eq!(
                import_spec(doc.as_bytes(), "json", &mut storage),
                Err(ImportError::InvalidVersion),
                "{}",
                doc
            );
        }
        assert_eq!(folder_count(&storage), 0);
    }

    #[test]
    fn test_import_spec_file_reads_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("petstore.yml");
        std::fs::write(&path, PETSTORE_V3).unwrap();

        let mut storage = Storage::in_memory();
        let summary = import_spec_file(&path, &mut storage).unwrap();
        assert_eq!(summary.requests, 2);

        let missing = dir.path().join("missing.json");
        assert_eq!(
            import_spec_file(&missing, &mut storage),
            Err(ImportError::InvalidFile)
        );
    }

    #[test]
    fn test_path_level_parameters_are_inherited() {
        let spec = serde_json::json!({
            "openapi": "3.0.0",
            "info": { "title": "Items" },
            "paths": {
                "/items/{id}": {
                    "summary": "ignored",
                    "parameters": [
                        { "name": "X-Tenant", "in": "header" },
                        { "name": "verbose", "in": "query" }
                    ],
                    "get": {
                        "parameters": [
                            { "$ref": "#/components/parameters/Verbose" }
                        ]
                    }
                }
            },
            "components": {
                "parameters": {
                    "Verbose": { "name": "verbose", "in": "query", "required": true }
                }
            }
        });

        let ops = operations(&spec);
        assert_eq!(ops.len(), 1);
        let planned = ops[0].planned_request("");
        assert_eq!(planned.request.name, "items/{id}");
        assert_eq!(planned.request.params, vec![Param::disabled("verbose", "")]);
        assert_eq!(planned.request.headers, vec![Header::disabled("X-Tenant", "")]);
    }

    /// Storage whose request writes start failing after `allowed` successes
    struct FailingStore {
        inner: Storage,
        allowed: usize,
    }

    impl FolderRepository for FailingStore {
        fn create_folder(&mut self, folder: Folder) -> RepoResult<Folder> {
            self.inner.create_folder(folder)
        }
        fn get_folder(&self, id: Id) -> RepoResult<Folder> {
            self.inner.get_folder(id)
        }
        fn update_folder(&mut self, folder: Folder) -> RepoResult<Folder> {
            self.inner.update_folder(folder)
        }
        fn delete_folder(&mut self, id: Id) -> RepoResult<()> {
            self.inner.delete_folder(id)
        }
        fn list_folders(&self, parent_id: Option<Id>) -> RepoResult<Vec<Folder>> {
            self.inner.list_folders(parent_id)
        }
    }

    impl RequestRepository for FailingStore {
        fn create_request(&mut self, request: Request) -> RepoResult<Request> {
            if self.allowed == 0 {
                return Err(RepoError::Io("disk full".to_string()));
            }
            self.allowed -= 1;
            self.inner.create_request(request)
        }
        fn get_request(&self, id: Id) -> RepoResult<Request> {
            self.inner.get_request(id)
        }
        fn update_request(&mut self, request: Request) -> RepoResult<Request> {
            self.inner.update_request(request)
        }
        fn delete_request(&mut self, id: Id) -> RepoResult<()> {
            self.inner.delete_request(id)
        }
        fn list_requests(&self, folder_id: Id) -> RepoResult<Vec<Request>> {
            self.inner.list_requests(folder_id)
        }
    }

    impl EnvironmentRepository for FailingStore {
        fn create_environment(
            &mut self,
            environment: Environment,
        ) -> RepoResult<Environment> {
            self.inner.create_environment(environment)
        }
        fn get_environment(&self, id: Id) -> RepoResult<Environment> {
            self.inner.get_environment(id)
        }
        fn get_environment_by_name(
            &self,
            name: &str,
        ) -> RepoResult<Environment> {
            self.inner.get_environment_by_name(name)
        }
        fn update_environment(
            &mut self,
            environment: Environment,
        ) -> RepoResult<Environment> {
            self.inner.update_environment(environment)
        }
        fn delete_environment(&mut self, id: Id) -> RepoResult<()> {
            self.inner.delete_environment(id)
        }
        fn list_environments(&self) -> RepoResult<Vec<Environment>> {
            self.inner.list_environments()
        }
    }

    impl AuthPresetRepository for FailingStore {
        fn create_auth_preset(
            &mut self,
            preset: AuthPreset,
        ) -> RepoResult<AuthPreset> {
            self.inner.create_auth_preset(preset)
        }
        fn get_auth_preset(&self, id: Id) -> RepoResult<AuthPreset> {
            self.inner.get_auth_preset(id)
        }
        fn update_auth_preset(
            &mut self,
            preset: AuthPreset,
        ) -> RepoResult<AuthPreset> {
            self.inner.update_auth_preset(preset)
        }
        fn delete_auth_preset(&mut self, id: Id) -> RepoResult<()> {
            self.inner.delete_auth_preset(id)
        }
        fn list_auth_presets(&self) -> RepoResult<Vec<AuthPreset>> {
            self.inner.list_auth_presets()
        }
    }

    impl Transactional for FailingStore {
        fn in_transaction(&self) -> bool {
            self.inner.in_transaction()
        }
        fn begin(&mut self) {
            self.inner.begin()
        }
        fn commit(&mut self) -> RepoResult<()> {
            self.inner.commit()
        }
        fn rollback(&mut self) {
            self.inner.rollback()
        }
    }

    #[test]
    fn test_persistence_failure_rolls_back_whole_import() {
        let mut store = FailingStore {
            inner: Storage::in_memory(),
            allowed: 1,
        };
        let result = import_spec(PETSTORE_V3.as_bytes(), "yaml", &mut store);

        assert!(matches!(result, Err(ImportError::ImportFailed(_))));
        assert_eq!(folder_count(&store.inner), 0);
        assert!(all_requests(&store.inner).is_empty());
    }

    #[test]
    fn test_import_refused_inside_open_transaction() {
        let mut store = Storage::in_memory();
        store.begin();
        let pending = store.create_folder(Folder::new(None, "Pending")).unwrap();

        let result = import_spec(PETSTORE_V3.as_bytes(), "yaml", &mut store);
        assert!(matches!(result, Err(ImportError::Unexpected(_))));
        assert!(store.in_transaction());
        assert_eq!(folder_count(&store), 1);

        store.commit().unwrap();
        assert_eq!(store.get_folder(pending.id.unwrap()).unwrap().name, "Pending");
    }
}
