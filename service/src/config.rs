//! Startup configuration, read once from the process environment.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use treat_core::client::DEFAULT_BASE_URL;
use treat_core::SchemaVersion;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to load .env: {0}")]
    DotEnv(#[from] dotenvy::Error),
}

/// Load a `.env` file from the working directory or its parents into the
/// process environment. A missing file is fine; an unreadable or malformed
/// one is an error.
pub fn load_dotenv() -> Result<(), ConfigError> {
    ignore_missing(dotenvy::dotenv().map(|_| ()))
}

/// Same as `load_dotenv`, for an explicit path.
pub fn load_dotenv_from(path: &Path) -> Result<(), ConfigError> {
    ignore_missing(dotenvy::from_path(path))
}

fn ignore_missing(result: Result<(), dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::DotEnv(e)),
    }
}

#[derive(Clone)]
pub struct Config {
    pub notion_token: String,
    pub database_id: String,
    pub api_url: String,
    pub bind_addr: String,
    pub schema: SchemaVersion,
    /// Global per-request timeout for Notion calls. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("notion_token", &"<redacted>")
            .field("database_id", &self.database_id)
            .field("api_url", &self.api_url)
            .field("bind_addr", &self.bind_addr)
            .field("schema", &self.schema)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Read settings from the process environment. Call `load_dotenv` first
    /// if a `.env` file should be honored.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let notion_token = get("NOTION_TOKEN").ok_or(ConfigError::Missing("NOTION_TOKEN"))?;
        let database_id =
            get("NOTION_DATABASE_ID").ok_or(ConfigError::Missing("NOTION_DATABASE_ID"))?;

        let schema = match get("TREAT_SCHEMA") {
            Some(raw) => raw
                .parse::<SchemaVersion>()
                .map_err(|e| ConfigError::Invalid {
                    key: "TREAT_SCHEMA",
                    reason: e.to_string(),
                })?,
            None => SchemaVersion::default(),
        };

        let timeout = match get("NOTION_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                    key: "NOTION_TIMEOUT_SECS",
                    reason: e.to_string(),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            notion_token,
            database_id,
            api_url: get("NOTION_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            schema,
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn required_settings_only() {
        let cfg = config(&[("NOTION_TOKEN", "secret_x"), ("NOTION_DATABASE_ID", "db")]).unwrap();
        assert_eq!(cfg.database_id, "db");
        assert_eq!(cfg.api_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(cfg.schema, SchemaVersion::Select);
        assert!(cfg.timeout.is_none());
    }

    #[test]
    fn missing_token_fails() {
        let err = config(&[("NOTION_DATABASE_ID", "db")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("NOTION_TOKEN")));
    }

    #[test]
    fn blank_database_id_fails() {
        let err = config(&[("NOTION_TOKEN", "t"), ("NOTION_DATABASE_ID", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("NOTION_DATABASE_ID")));
    }

    #[test]
    fn optional_settings_are_parsed() {
        let cfg = config(&[
            ("NOTION_TOKEN", "t"),
            ("NOTION_DATABASE_ID", "db"),
            ("NOTION_API_URL", "http://127.0.0.1:3000"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("TREAT_SCHEMA", "text"),
            ("NOTION_TIMEOUT_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(cfg.api_url, "http://127.0.0.1:3000");
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.schema, SchemaVersion::Text);
        assert_eq!(cfg.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn invalid_values_fail() {
        let base = [("NOTION_TOKEN", "t"), ("NOTION_DATABASE_ID", "db")];
        let err = config(&[base[0], base[1], ("TREAT_SCHEMA", "grid")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TREAT_SCHEMA", .. }));
        let err = config(&[base[0], base[1], ("NOTION_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "NOTION_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn missing_dotenv_file_is_ignored() {
        let path = std::env::temp_dir().join("treat-sync-config-absent.env");
        let _ = std::fs::remove_file(&path);
        assert!(load_dotenv_from(&path).is_ok());
    }

    #[test]
    fn malformed_dotenv_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("treat-sync-config-{}.env", std::process::id()));
        std::fs::write(&path, "this is not a dotenv line\n").unwrap();
        let result = load_dotenv_from(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::DotEnv(_))));
    }

    #[test]
    fn debug_output_hides_token() {
        let cfg = config(&[("NOTION_TOKEN", "secret_x"), ("NOTION_DATABASE_ID", "db")]).unwrap();
        assert!(!format!("{cfg:?}").contains("secret_x"));
    }
}
