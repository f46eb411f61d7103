//! `taxplan.toml` settings. Every table and key is optional.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "taxplan.db"
//!
//! [logging]
//! level = "info"
//! file = "taxplan.log"
//! console = true
//!
//! [advisor]
//! timeout_secs = 60
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use taxplan_core::db::DbConfig;
use thiserror::Error;

pub const DEFAULT_DATABASE: &str = "taxplan.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DbConfig,
    pub logging: LoggingConfig,
    pub advisor: AdvisorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DbConfig {
                connection_string: DEFAULT_DATABASE.to_string(),
                ..DbConfig::default()
            },
            logging: LoggingConfig::default(),
            advisor: AdvisorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// A level or any `EnvFilter` directive. `RUST_LOG` wins when set.
    pub level: String,
    /// Appended to when set.
    pub file: Option<PathBuf>,
    /// Log to stderr.
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            console: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub timeout_secs: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

impl AdvisorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::parse("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database.backend, "sqlite");
        assert_eq!(config.database.connection_string, DEFAULT_DATABASE);
        assert_eq!(config.advisor.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = AppConfig::parse(
            r#"
            [logging]
            level = "debug"
            file = "/tmp/taxplan.log"

            [advisor]
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/taxplan.log")));
        assert!(config.logging.console);
        assert_eq!(config.advisor.timeout_secs, 5);
        assert_eq!(config.database.connection_string, DEFAULT_DATABASE);
    }

    #[test]
    fn database_table_overrides_connection() {
        let config = AppConfig::parse(
            r#"
            [database]
            connection_string = ":memory:"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.backend, "sqlite");
        assert_eq!(config.database.connection_string, ":memory:");
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[advisor]\ntimeout_secs = \"soon\"\n").unwrap();

        let result = AppConfig::load(Some(file.path()));

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/taxplan.toml")));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn no_path_yields_defaults() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }
}
