//! Variable scopes and placeholder substitution

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::Environment;

/// Matches `{{name}}` and `${name}`
fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}|\$\{\s*([^{}\s]+)\s*\}")
            .expect("placeholder regex is valid")
    })
}

/// Names referenced by the placeholders in `text`, in order of appearance
pub fn placeholders(text: &str) -> impl Iterator<Item = &str> {
    placeholder_regex().captures_iter(text).filter_map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|name| name.as_str())
    })
}

/// Immutable name → value mapping
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    values: HashMap<String, String>,
}

impl Scope {
    /// Build from pairs. On duplicate names the first one wins.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = HashMap::new();
        for (key, value) in pairs {
            values.entry(key.into()).or_insert_with(|| value.into());
        }
        Scope { values }
    }

    /// Scope of an environment's enabled variables
    pub fn from_environment(environment: &Environment) -> Self {
        Self::from_pairs(
            environment
                .variables
                .iter()
                .filter(|v| v.enabled)
                .map(|v| (v.key.as_str(), v.value.as_str())),
        )
    }

    /// Merge in order; later scopes override earlier ones
    pub fn merge(scopes: &[Scope]) -> Scope {
        let mut values = HashMap::new();
        for scope in scopes {
            values.extend(scope.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Scope { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every known placeholder. Unknown ones are left as written.
    pub fn substitute(&self, text: &str) -> String {
        placeholder_regex()
            .replace_all(text, |caps: &Captures| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                match self.get(name) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
