//! App layer - commands the host UI calls
//!
//! Imports come back as notifications, resolution returns a fresh
//! [`ResolvedRequest`] that is then exported as cURL or sent.

pub mod commands;
pub mod state;

pub use state::{Notification, ResolvedRequest, Severity, Workbench};
