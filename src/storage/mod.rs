//! Local persistence of folders, requests, environments and auth presets.
//!
//! Everything lives in memory and, when opened on a directory, is mirrored to
//! a single YAML file after each write (or on commit inside a transaction).

pub mod repository;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::constants::GLOBAL_ENVIRONMENT;
use crate::error::{RepoError, RepoResult};
use crate::models::{AuthPreset, Environment, Folder, Id, Request};

pub use repository::{
    AuthPresetRepository, EnvironmentRepository, FolderRepository, RequestRepository, Store,
    Transactional,
};

const DATA_FILE: &str = "workspace.yaml";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Tables {
    #[serde(default)]
    next_id: Id,
    #[serde(default)]
    folders: Vec<Folder>,
    #[serde(default)]
    requests: Vec<Request>,
    #[serde(default)]
    environments: Vec<Environment>,
    #[serde(default)]
    auth_presets: Vec<AuthPreset>,
}

impl Tables {
    fn alloc_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn folder_exists(&self, id: Id) -> bool {
        self.folders.iter().any(|f| f.id == Some(id))
    }

    /// True when `candidate` is `id` itself or sits somewhere below it
    fn is_in_subtree(&self, id: Id, candidate: Id) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(candidate);
        while let Some(cur) = current {
            if cur == id {
                return true;
            }
            if !seen.insert(cur) {
                return false;
            }
            current = self
                .folders
                .iter()
                .find(|f| f.id == Some(cur))
                .and_then(|f| f.parent_id);
        }
        false
    }

    fn ensure_global_environment(&mut self) {
        if !self.environments.iter().any(|e| e.name == GLOBAL_ENVIRONMENT) {
            let id = self.alloc_id();
            self.environments.push(Environment {
                id: Some(id),
                ..Environment::new(GLOBAL_ENVIRONMENT)
            });
        }
    }
}

/// Manages locally stored collections and environments
pub struct Storage {
    tables: Tables,
    /// Saved state while a transaction is open
    snapshot: Option<Tables>,
    data_file: Option<PathBuf>,
}

impl Storage {
    /// Storage that is never written to disk
    pub fn in_memory() -> Self {
        let mut tables = Tables::default();
        tables.ensure_global_environment();
        Storage {
            tables,
            snapshot: None,
            data_file: None,
        }
    }

    /// Open (or create) the storage kept inside `dir`
    pub fn open(dir: &Path) -> RepoResult<Self> {
        fs::create_dir_all(dir)?;
        let data_file = dir.join(DATA_FILE);

        let mut tables = if data_file.exists() {
            let content = fs::read_to_string(&data_file)?;
            serde_yaml::from_str::<Tables>(&content)?
        } else {
            Tables::default()
        };
        tables.ensure_global_environment();

        let storage = Storage {
            tables,
            snapshot: None,
            data_file: Some(data_file),
        };
        storage.flush()?;
        tracing::debug!(dir = %dir.display(), "Storage opened");
        Ok(storage)
    }

    /// The environment that always takes part in resolution
    pub fn global_environment(&self) -> RepoResult<Environment> {
        self.get_environment_by_name(GLOBAL_ENVIRONMENT)
    }

    fn flush(&self) -> RepoResult<()> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };
        let content = serde_yaml::to_string(&self.tables)?;
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Apply a write. Outside a transaction it is flushed right away and
    /// undone in memory if it fails.
    fn write<T>(&mut self, op: impl FnOnce(&mut Tables) -> RepoResult<T>) -> RepoResult<T> {
        if self.snapshot.is_some() {
            return op(&mut self.tables);
        }

        let before = self.tables.clone();
        let result = op(&mut self.tables).and_then(|out| self.flush().map(|_| out));
        if result.is_err() {
            self.tables = before;
        }
        result
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Transactional for Storage {
    fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    fn begin(&mut self) {
        if self.snapshot.is_none() {
            self.snapshot = Some(self.tables.clone());
        }
    }

    fn commit(&mut self) -> RepoResult<()> {
        let Some(snapshot) = self.snapshot.take() else {
            return Ok(());
        };
        if let Err(err) = self.flush() {
            self.tables = snapshot;
            return Err(err);
        }
        Ok(())
    }

    fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.tables = snapshot;
        }
    }
}

impl FolderRepository for Storage {
    fn create_folder(&mut self, folder: Folder) -> RepoResult<Folder> {
        self.write(|t| {
            if let Some(parent) = folder.parent_id {
                if !t.folder_exists(parent) {
                    return Err(RepoError::InvalidParent);
                }
            }
            let now = Utc::now();
            let folder = Folder {
                id: Some(t.alloc_id()),
                created_at: Some(now),
                updated_at: Some(now),
                ..folder
            };
            t.folders.push(folder.clone());
            Ok(folder)
        })
    }

    fn get_folder(&self, id: Id) -> RepoResult<Folder> {
        self.tables
            .folders
            .iter()
            .find(|f| f.id == Some(id))
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn update_folder(&mut self, folder: Folder) -> RepoResult<Folder> {
        let id = folder.id.ok_or(RepoError::NotFound)?;
        self.write(|t| {
            let index = t
                .folders
                .iter()
                .position(|f| f.id == Some(id))
                .ok_or(RepoError::NotFound)?;
            if let Some(parent) = folder.parent_id {
                if !t.folder_exists(parent) || t.is_in_subtree(id, parent) {
                    return Err(RepoError::InvalidParent);
                }
            }
            let stored = &mut t.folders[index];
            stored.name = folder.name;
            stored.parent_id = folder.parent_id;
            stored.updated_at = Some(Utc::now());
            Ok(stored.clone())
        })
    }

    fn delete_folder(&mut self, id: Id) -> RepoResult<()> {
        self.write(|t| {
            if !t.folder_exists(id) {
                return Err(RepoError::NotFound);
            }
            let doomed: HashSet<Id> = t
                .folders
                .iter()
                .filter_map(|f| f.id)
                .filter(|&fid| t.is_in_subtree(id, fid))
                .collect();
            t.folders
                .retain(|f| !f.id.map(|fid| doomed.contains(&fid)).unwrap_or(false));
            t.requests.retain(|r| !doomed.contains(&r.folder_id));
            Ok(())
        })
    }

    fn list_folders(&self, parent_id: Option<Id>) -> RepoResult<Vec<Folder>> {
        let mut folders: Vec<Folder> = self
            .tables
            .folders
            .iter()
            .filter(|f| f.parent_id == parent_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }
}

impl RequestRepository for Storage {
    fn create_request(&mut self, request: Request) -> RepoResult<Request> {
        self.write(|t| {
            if !t.folder_exists(request.folder_id) {
                return Err(RepoError::InvalidParent);
            }
            let now = Utc::now();
            let request = Request {
                id: Some(t.alloc_id()),
                created_at: Some(now),
                updated_at: Some(now),
                ..request
            };
            t.requests.push(request.clone());
            Ok(request)
        })
    }

    fn get_request(&self, id: Id) -> RepoResult<Request> {
        self.tables
            .requests
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn update_request(&mut self, request: Request) -> RepoResult<Request> {
        let id = request.id.ok_or(RepoError::NotFound)?;
        self.write(|t| {
            if !t.folder_exists(request.folder_id) {
                return Err(RepoError::InvalidParent);
            }
            let stored = t
                .requests
                .iter_mut()
                .find(|r| r.id == Some(id))
                .ok_or(RepoError::NotFound)?;
            *stored = Request {
                created_at: stored.created_at,
                updated_at: Some(Utc::now()),
                ..request
            };
            Ok(stored.clone())
        })
    }

    fn delete_request(&mut self, id: Id) -> RepoResult<()> {
        self.write(|t| {
            let before = t.requests.len();
            t.requests.retain(|r| r.id != Some(id));
            if t.requests.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        })
    }

    fn list_requests(&self, folder_id: Id) -> RepoResult<Vec<Request>> {
        let mut requests: Vec<Request> = self
            .tables
            .requests
            .iter()
            .filter(|r| r.folder_id == folder_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(requests)
    }
}

impl EnvironmentRepository for Storage {
    fn create_environment(&mut self, environment: Environment) -> RepoResult<Environment> {
        self.write(|t| {
            if t.environments.iter().any(|e| e.name == environment.name) {
                return Err(RepoError::Duplicated(environment.name));
            }
            let environment = Environment {
                id: Some(t.alloc_id()),
                ..environment
            };
            t.environments.push(environment.clone());
            Ok(environment)
        })
    }

    fn get_environment(&self, id: Id) -> RepoResult<Environment> {
        self.tables
            .environments
            .iter()
            .find(|e| e.id == Some(id))
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn get_environment_by_name(&self, name: &str) -> RepoResult<Environment> {
        self.tables
            .environments
            .iter()
            .find(|e| e.name == name)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn update_environment(&mut self, environment: Environment) -> RepoResult<Environment> {
        let id = environment.id.ok_or(RepoError::NotFound)?;
        self.write(|t| {
            if t
                .environments
                .iter()
                .any(|e| e.id != Some(id) && e.name == environment.name)
            {
                return Err(RepoError::Duplicated(environment.name));
            }
            let stored = t
                .environments
                .iter_mut()
                .find(|e| e.id == Some(id))
                .ok_or(RepoError::NotFound)?;
            if stored.is_global() && environment.name != stored.name {
                return Err(RepoError::Protected(stored.name.clone()));
            }
            *stored = environment;
            Ok(stored.clone())
        })
    }

    fn delete_environment(&mut self, id: Id) -> RepoResult<()> {
        self.write(|t| {
            let index = t
                .environments
                .iter()
                .position(|e| e.id == Some(id))
                .ok_or(RepoError::NotFound)?;
            if t.environments[index].is_global() {
                return Err(RepoError::Protected(GLOBAL_ENVIRONMENT.to_string()));
            }
            t.environments.remove(index);
            Ok(())
        })
    }

    fn list_environments(&self) -> RepoResult<Vec<Environment>> {
        Ok(self.tables.environments.clone())
    }
}

impl AuthPresetRepository for Storage {
    fn create_auth_preset(&mut self, preset: AuthPreset) -> RepoResult<AuthPreset> {
        self.write(|t| {
            if t.auth_presets.iter().any(|p| p.name == preset.name) {
                return Err(RepoError::Duplicated(preset.name));
            }
            let preset = AuthPreset {
                id: Some(t.alloc_id()),
                ..preset
            };
            t.auth_presets.push(preset.clone());
            Ok(preset)
        })
    }

    fn get_auth_preset(&self, id: Id) -> RepoResult<AuthPreset> {
        self.tables
            .auth_presets
            .iter()
            .find(|p| p.id == Some(id))
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn update_auth_preset(&mut self, preset: AuthPreset) -> RepoResult<AuthPreset> {
        let id = preset.id.ok_or(RepoError::NotFound)?;
        self.write(|t| {
            if t
                .auth_presets
                .iter()
                .any(|p| p.id != Some(id) && p.name == preset.name)
            {
                return Err(RepoError::Duplicated(preset.name));
            }
            let stored = t
                .auth_presets
                .iter_mut()
                .find(|p| p.id == Some(id))
                .ok_or(RepoError::NotFound)?;
            *stored = preset;
            Ok(stored.clone())
        })
    }

    fn delete_auth_preset(&mut self, id: Id) -> RepoResult<()> {
        self.write(|t| {
            let before = t.auth_presets.len();
            t.auth_presets.retain(|p| p.id != Some(id));
            if t.auth_presets.len() == before {
                return Err(RepoError::NotFound);
            }
            // Requests keep their auth flag but lose the dangling reference
            for request in t.requests.iter_mut() {
                if request.auth_preset_id == Some(id) {
                    request.auth_preset_id = None;
                }
            }
            Ok(())
        })
    }

    fn list_auth_presets(&self) -> RepoResult<Vec<AuthPreset>> {
        let mut presets = self.tables.auth_presets.clone();
        presets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(presets)
    }
}
