//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Name of the environment that always exists and always takes part in resolution
pub const GLOBAL_ENVIRONMENT: &str = "global";

/// Placeholder prepended to relative OpenAPI v3 server urls
pub const BASE_URL_PLACEHOLDER: &str = "{{BASE_URL}}";

/// Host used when a v2 spec does not declare one
pub const DEFAULT_SPEC_HOST: &str = "localhost";

/// Folder name used when a spec has no `info.title`
pub const UNTITLED_SPEC: &str = "Untitled API";

/// File extensions accepted by the spec importer
pub const SPEC_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Max `$ref` hops followed for a single schema
pub const MAX_REF_HOPS: usize = 16;

/// Max nesting depth when synthesizing an example value
pub const MAX_SYNTH_DEPTH: usize = 32;

/// Max values built by a single synthesis, so branching schemas stay bounded
pub const MAX_SYNTH_NODES: usize = 10_000;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.5;

/// Name of the config directory under the user's home
pub const CONFIG_DIR_NAME: &str = ".pathway";

/// Log file written inside the config directory
pub const LOG_FILE_NAME: &str = "pathway.log";

/// Application name
pub const APP_NAME: &str = "Pathway";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
