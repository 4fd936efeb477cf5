//! Importers that turn external files into local folders, requests and environments

pub mod environment;
pub mod openapi;

pub use environment::{import_environment, import_environment_file};
pub use openapi::{import_spec, import_spec_file, ImportSummary, SpecVersion};
