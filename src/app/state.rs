//! App state - the store plus the values handed back to the host

use crate::models::{Auth, Request};
use crate::storage::Store;

/// How loudly the host should show a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Information,
    Warning,
    Error,
}

/// One-line outcome of a command, for the status bar
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Notification {
            severity: Severity::Information,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notification {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// A request with every placeholder substituted, plus the auth it carries.
/// Never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRequest {
    pub request: Request,
    pub auth: Option<Auth>,
}

/// Entry point for the host UI. Holds no selection state; the selected
/// environment is passed to every call that resolves.
pub struct Workbench<S: Store> {
    pub store: S,
}

impl<S: Store> Workbench<S> {
    pub fn new(store: S) -> Self {
        Workbench { store }
    }
}
