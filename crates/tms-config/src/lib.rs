use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use self::store::StoreConfig;
use self::translator::ProviderConfig;

pub mod store;
pub mod translator;

pub const DEEPL_AUTH_KEY: &str = "DEEPL_AUTH_KEY";
pub const GOOGLE_TRANSLATE_API_KEY: &str = "GOOGLE_TRANSLATE_API_KEY";

/// Upper bound on repeated calls spent gathering alternatives
pub const MAX_ALTERNATIVES: usize = 10;

fn default_provider() -> String {
    "DeepL".to_string()
}

fn default_alternatives_count() -> usize {
    3
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub deepl: ProviderConfig,
    pub google: ProviderConfig,
    pub store: StoreConfig,

    /// Provider used when none is picked explicitly
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Number of repeated calls spent gathering alternative translations
    #[serde(default = "default_alternatives_count")]
    pub alternatives_count: usize,
}

impl Config {
    /// Build the config from defaults and the process environment
    pub fn new() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from defaults and an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().overlay(lookup)
    }

    /// Load a JSON profile, then apply the process environment on top of it
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("Loading config from {}", path.display());
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        let config: Config =
            serde_json::from_reader(reader).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(config.overlay(|key| env::var(key).ok()))
    }

    /// Apply variables from `lookup` over the current values. Unset or blank
    /// variables leave the current value alone.
    pub fn overlay<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = var(DEEPL_AUTH_KEY) {
            self.deepl.api_key = key;
        }
        if let Some(url) = var("DEEPL_API_URL") {
            self.deepl.api_url = Some(url);
        }
        if let Some(key) = var(GOOGLE_TRANSLATE_API_KEY) {
            self.google.api_key = key;
        }
        if let Some(url) = var("GOOGLE_TRANSLATE_API_URL") {
            self.google.api_url = Some(url);
        }

        let key = "TMS_HTTP_TIMEOUT_SECONDS";
        if let Some(timeout) = parse_var::<u64>(key, var(key)) {
            self.deepl.timeout_seconds = timeout;
            self.google.timeout_seconds = timeout;
        }
        let key = "TMS_HTTP_MAX_RETRIES";
        if let Some(retries) = parse_var::<u32>(key, var(key)) {
            self.deepl.max_retries = retries;
            self.google.max_retries = retries;
        }

        if let Some(path) = var("TMS_DB_PATH") {
            self.store.db_path = PathBuf::from(path);
        }
        if let Some(provider) = var("TMS_DEFAULT_PROVIDER") {
            self.default_provider = provider;
        }
        let key = "TMS_ALTERNATIVES";
        if let Some(count) = parse_var::<usize>(key, var(key)) {
            self.alternatives_count = count;
        }

        if self.alternatives_count > MAX_ALTERNATIVES {
            tracing::warn!(
                "alternatives_count {} capped at {}",
                self.alternatives_count,
                MAX_ALTERNATIVES
            );
            self.alternatives_count = MAX_ALTERNATIVES;
        }

        self
    }
}

fn parse_var<T: FromStr>(key: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid number", key, value);
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deepl: ProviderConfig::default(),
            google: ProviderConfig::default(),
            store: StoreConfig::default(),
            default_provider: default_provider(),
            alternatives_count: default_alternatives_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_lookup(|_| None);

        assert_eq!(config.default_provider, "DeepL");
        assert_eq!(config.alternatives_count, 3);
        assert_eq!(config.deepl.timeout_seconds, 30);
        assert_eq!(config.deepl.max_retries, 0);
        assert!(!config.deepl.has_credential());
        assert!(!config.google.has_credential());
        assert_eq!(config.store.db_path, PathBuf::from("db").join("trans.sqlite3"));
    }

    #[test]
    fn test_credentials_and_overrides_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("DEEPL_AUTH_KEY", "abc:fx"),
            ("GOOGLE_TRANSLATE_API_KEY", "g-key"),
            ("TMS_HTTP_TIMEOUT_SECONDS", "5"),
            ("TMS_HTTP_MAX_RETRIES", "2"),
            ("TMS_DB_PATH", "/tmp/x.sqlite3"),
            ("TMS_DEFAULT_PROVIDER", "Google Translate"),
        ]));

        assert_eq!(config.deepl.api_key, "abc:fx");
        assert_eq!(config.google.api_key, "g-key");
        assert_eq!(config.deepl.timeout_seconds, 5);
        assert_eq!(config.google.max_retries, 2);
        assert_eq!(config.store.db_path, PathBuf::from("/tmp/x.sqlite3"));
        assert_eq!(config.default_provider, "Google Translate");
    }

    #[test]
    fn test_blank_and_unparseable_values_are_ignored() {
        let config = Config::from_lookup(lookup_from(&[
            ("DEEPL_AUTH_KEY", "   "),
            ("TMS_HTTP_TIMEOUT_SECONDS", "soon"),
            ("TMS_ALTERNATIVES", "-1"),
        ]));

        assert!(!config.deepl.has_credential());
        assert_eq!(config.deepl.timeout_seconds, 30);
        assert_eq!(config.alternatives_count, 3);
    }

    #[test]
    fn test_alternatives_count_is_capped() {
        let config = Config::from_lookup(lookup_from(&[(
            "TMS_ALTERNATIVES",
            "18446744073709551615",
        )]));
        assert_eq!(config.alternatives_count, MAX_ALTERNATIVES);

        let config = Config::from_lookup(lookup_from(&[("TMS_ALTERNATIVES", "5")]));
        assert_eq!(config.alternatives_count, 5);
    }

    #[test]
    fn test_load_file_caps_alternatives_count() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "alternatives_count": 1000000 }}"#).unwrap();

        let config = Config::load_file(file.path()).unwrap();
        assert_eq!(config.alternatives_count, MAX_ALTERNATIVES);
    }

    #[test]
    fn test_partial_json_profile_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "google": {{ "timeout_seconds": 12 }}, "alternatives_count": 1 }}"#)
            .unwrap();

        let reader = BufReader::new(File::open(file.path()).unwrap());
        let config: Config = serde_json::from_reader(reader).unwrap();

        assert_eq!(config.google.timeout_seconds, 12);
        assert_eq!(config.google.max_retries, 0);
        assert_eq!(config.alternatives_count, 1);
        assert_eq!(config.default_provider, "DeepL");
    }

    #[test]
    fn test_load_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Config::load_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
