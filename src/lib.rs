//! # Pathway
//!
//! Import and resolution engine of a terminal-based API client.
//!
//! ## Features
//! - OpenAPI 2.0 / 3.0 import (JSON or YAML) into folders and request templates
//! - `$ref` resolution and example body synthesis
//! - Environment export import
//! - `{{name}}` / `${name}` variable resolution over global + selected environment
//! - cURL export
//! - Request sending with cancellation
//!
//! ## Architecture
//! - Storage: repositories behind traits, transactional imports
//! - Import: spec and environment importers
//! - Variables: pure resolution of request and auth templates
//! - Network Layer (Tokio runtime)
//! - App: commands the host UI calls

pub mod app;
pub mod config;
pub mod constants;
pub mod curl;
pub mod error;
pub mod import;
pub mod logging;
pub mod models;
pub mod network;
pub mod query;
pub mod storage;
pub mod variables;

// Re-export commonly used types
pub use app::{Notification, ResolvedRequest, Severity, Workbench};
pub use curl::to_curl;
pub use error::{ImportError, NetworkError, RepoError};
pub use models::{Auth, AuthPreset, Body, Environment, Folder, HttpMethod, Request};
pub use storage::{Storage, Store};
pub use variables::{resolve, Scope};
