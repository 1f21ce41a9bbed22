//! Environment file inspection.
//!
//! The launcher never interprets `.env` values; it only checks that the keys
//! the server depends on are filled in, and optionally forwards the pairs to
//! child processes.

use std::path::Path;

use url::Url;

use crate::config::loader::ConfigError;

const MASK: &str = "****";

/// Key/value pairs parsed from an environment file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
    vars: Vec<(String, String)>,
}

impl EnvOverlay {
    /// Parse `path` without touching the process environment.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let to_config_err = |source: dotenvy::Error| ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        };

        let mut vars = Vec::new();
        for item in dotenvy::from_path_iter(path).map_err(to_config_err)? {
            vars.push(item.map_err(to_config_err)?);
        }
        Ok(Self { vars })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Last value assigned to `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Required keys that are absent or blank, in the order given.
    pub fn missing_keys(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|key| self.get(key).map_or(true, |v| v.trim().is_empty()))
            .cloned()
            .collect()
    }
}

/// Mask a value for logging.
///
/// URLs keep scheme, user, host and path with the password masked; anything
/// else is replaced entirely.
pub fn redact_value(value: &str) -> String {
    match Url::parse(value) {
        Ok(mut url) if url.has_host() => {
            if url.password().is_some() && url.set_password(Some(MASK)).is_err() {
                return MASK.to_string();
            }
            url.to_string()
        }
        _ => MASK.to_string(),
    }
}
