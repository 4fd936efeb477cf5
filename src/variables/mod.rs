//! Variable resolution
//!
//! Environments become [`Scope`]s, scopes are merged (later wins) and every
//! string leaf of a request or auth preset gets its `{{name}}` / `${name}`
//! placeholders replaced. The template is never touched; callers get a copy.

pub mod scope;
pub mod visit;

pub use scope::{placeholders, Scope};
pub use visit::Resolvable;

use crate::models::Environment;

/// Scopes in precedence order: the global environment, then the selected one
pub fn scopes_for(global: &Environment, selected: Option<&Environment>) -> Vec<Scope> {
    let mut scopes = vec![Scope::from_environment(global)];
    if let Some(selected) = selected {
        if !selected.is_global() && selected.id != global.id {
            scopes.push(Scope::from_environment(selected));
        }
    }
    scopes
}

/// Resolved copy of `target`. Unknown placeholders stay as written.
pub fn resolve<T: Resolvable>(target: &T, scopes: &[Scope]) -> T {
    let scope = Scope::merge(scopes);
    let mut resolved = target.clone();
    resolved.visit_strings(&mut |text| {
        if placeholders(text).next().is_some() {
            *text = scope.substitute(text);
        }
    });
    resolved
}

/// Names `resolve` would leave untouched, without duplicates
pub fn unresolved_variables<T: Resolvable>(target: &T, scopes: &[Scope]) -> Vec<String> {
    let scope = Scope::merge(scopes);
    let mut names: Vec<String> = Vec::new();
    let mut copy = target.clone();
    copy.visit_strings(&mut |text| {
        for name in placeholders(text) {
            if scope.get(name).is_none() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    });
    names
}
