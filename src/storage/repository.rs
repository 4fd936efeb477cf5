//! Repository contracts the engine talks to. The engine never reaches
//! storage any other way.

use crate::error::RepoResult;
use crate::models::{AuthPreset, Environment, Folder, Id, Request};

pub trait FolderRepository {
    fn create_folder(&mut self, folder: Folder) -> RepoResult<Folder>;
    fn get_folder(&self, id: Id) -> RepoResult<Folder>;
    fn update_folder(&mut self, folder: Folder) -> RepoResult<Folder>;
    /// Removes the folder, its subfolders and every request inside them
    fn delete_folder(&mut self, id: Id) -> RepoResult<()>;
    /// Children of `parent_id`, or the roots when `None`. Sorted by name.
    fn list_folders(&self, parent_id: Option<Id>) -> RepoResult<Vec<Folder>>;
}

pub trait RequestRepository {
    fn create_request(&mut self, request: Request) -> RepoResult<Request>;
    fn get_request(&self, id: Id) -> RepoResult<Request>;
    fn update_request(&mut self, request: Request) -> RepoResult<Request>;
    fn delete_request(&mut self, id: Id) -> RepoResult<()>;
    /// Sorted by name
    fn list_requests(&self, folder_id: Id) -> RepoResult<Vec<Request>>;
}

pub trait EnvironmentRepository {
    fn create_environment(&mut self, environment: Environment) -> RepoResult<Environment>;
    fn get_environment(&self, id: Id) -> RepoResult<Environment>;
    fn get_environment_by_name(&self, name: &str) -> RepoResult<Environment>;
    fn update_environment(&mut self, environment: Environment) -> RepoResult<Environment>;
    fn delete_environment(&mut self, id: Id) -> RepoResult<()>;
    fn list_environments(&self) -> RepoResult<Vec<Environment>>;
}

pub trait AuthPresetRepository {
    fn create_auth_preset(&mut self, preset: AuthPreset) -> RepoResult<AuthPreset>;
    fn get_auth_preset(&self, id: Id) -> RepoResult<AuthPreset>;
    fn update_auth_preset(&mut self, preset: AuthPreset) -> RepoResult<AuthPreset>;
    fn delete_auth_preset(&mut self, id: Id) -> RepoResult<()>;
    fn list_auth_presets(&self) -> RepoResult<Vec<AuthPreset>>;
}

/// Groups several writes into one unit that is either kept or discarded
pub trait Transactional {
    /// Whether `begin` has been called without a matching commit or rollback
    fn in_transaction(&self) -> bool;
    fn begin(&mut self);
    fn commit(&mut self) -> RepoResult<()>;
    fn rollback(&mut self);
}

/// Everything the engine needs from persistence
pub trait Store:
    FolderRepository + RequestRepository + EnvironmentRepository + AuthPresetRepository + Transactional
{
}

impl<T> Store for T where
    T: FolderRepository
        + RequestRepository
        + EnvironmentRepository
        + AuthPresetRepository
        + Transactional
{
}
