//! Command handlers - import, resolve, export and send

use std::path::{Path, PathBuf};

use tokio::sync::oneshot;

use crate::app::state::{Notification, ResolvedRequest, Workbench};
use crate::constants::GLOBAL_ENVIRONMENT;
use crate::curl;
use crate::error::{ImportError, NetworkError, RepoResult};
use crate::import;
use crate::models::{Id, Request};
use crate::network::{self, HttpResponse};
use crate::storage::Store;
use crate::variables::{self, Scope};

/// Expand a leading `~` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

fn import_failure(err: &ImportError, subject: &str) -> Notification {
    match err {
        ImportError::InvalidVersion => Notification::warning(err.user_message(subject)),
        ImportError::Unexpected(detail) => {
            tracing::error!(subject, error = %detail, "Import failed unexpectedly");
            Notification::error(err.user_message(subject))
        }
        _ => {
            tracing::warn!(subject, error = %err, "Import failed");
            Notification::error(err.user_message(subject))
        }
    }
}

impl<S: Store> Workbench<S> {
    // ========================
    // Import
    // ========================

    pub fn import_openapi_spec(&mut self, path: &Path) -> Notification {
        let path = expand_home(path);
        match import::import_spec_file(&path, &mut self.store) {
            Ok(summary) => {
                tracing::info!(
                    path = %path.display(),
                    folders = summary.folders,
                    requests = summary.requests,
                    "Spec imported"
                );
                Notification::info("Openapi spec imported")
            }
            Err(err) => import_failure(&err, "openapi spec"),
        }
    }

    pub fn import_environment(&mut self, path: &Path) -> Notification {
        let path = expand_home(path);
        match import::import_environment_file(&path, &mut self.store) {
            Ok(_) => Notification::info("Environment imported"),
            Err(err) => import_failure(&err, "environment"),
        }
    }

    // ========================
    // Resolution
    // ========================

    /// Global scope, then the selected environment's scope
    pub fn scopes(&self, selected: Option<Id>) -> RepoResult<Vec<Scope>> {
        let global = self.store.get_environment_by_name(GLOBAL_ENVIRONMENT)?;
        let selected = selected
            .map(|id| self.store.get_environment(id))
            .transpose()?;
        Ok(variables::scopes_for(&global, selected.as_ref()))
    }

    /// Substitute placeholders in `request` and in its auth preset when auth is enabled
    pub fn resolve(&self, request: &Request, selected: Option<Id>) -> RepoResult<ResolvedRequest> {
        let scopes = self.scopes(selected)?;
        let auth = match (request.auth_enabled, request.auth_preset_id) {
            (true, Some(preset_id)) => {
                let preset = self.store.get_auth_preset(preset_id)?;
                Some(variables::resolve(&preset.auth, &scopes))
            }
            _ => None,
        };

        let unresolved = variables::unresolved_variables(request, &scopes);
        if !unresolved.is_empty() {
            tracing::debug!(?unresolved, "Request keeps unresolved placeholders");
        }

        Ok(ResolvedRequest {
            request: variables::resolve(request, &scopes),
            auth,
        })
    }

    // ========================
    // Export / send
    // ========================

    pub fn copy_as_curl(&self, resolved: &ResolvedRequest) -> String {
        curl::to_curl(&resolved.request, resolved.auth.as_ref())
    }

    /// Send a resolved request. Resolution has finished before this point,
    /// so cancelling only abandons the network call.
    pub async fn send(
        &self,
        resolved: &ResolvedRequest,
        cancel_rx: oneshot::Receiver<()>,
    ) -> Result<HttpResponse, NetworkError> {
        network::execute_cancellable(&resolved.request, resolved.auth.as_ref(), cancel_rx).await
    }
}
