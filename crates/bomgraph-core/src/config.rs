//! Connection settings for the graph database.
//!
//! Settings are loaded from (in priority order):
//! 1. `NEO4J_URI`, `NEO4J_USERNAME`, `NEO4J_PASSWORD` (a `.env` file is read first)
//! 2. Environment variables (`BOMGRAPH__NEO4J__` prefix)
//! 3. Config file (`bomgraph.toml`, `[neo4j]` section)
//!
//! Endpoint and credentials have no defaults: a process without them must not start.

use serde::Deserialize;

use crate::error::ConfigError;

const URI_SCHEMES: &[&str] = &[
    "bolt://",
    "bolt+s://",
    "bolt+ssc://",
    "neo4j://",
    "neo4j+s://",
    "neo4j+ssc://",
];

/// Endpoint, credentials, and driver tuning for the Neo4j connection.
#[derive(Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default)]
    pub uri: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Upper bound on pooled Bolt connections held by the driver.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Records pulled per round trip.
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

impl std::fmt::Debug for Neo4jSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jSettings")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("fetch_size", &self.fetch_size)
            .finish()
    }
}

impl Neo4jSettings {
    /// Build settings from explicit values, with default driver tuning.
    pub fn new(
        uri: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            username: username.into(),
            password: password.into(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }

    /// Load and validate settings for the given config file prefix.
    pub fn load(file_prefix: &str) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }

        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("BOMGRAPH")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("neo4j.uri", std::env::var("NEO4J_URI").ok())?
            .set_override_option("neo4j.username", std::env::var("NEO4J_USERNAME").ok())?
            .set_override_option("neo4j.password", std::env::var("NEO4J_PASSWORD").ok())?
            .build()?;

        Self::from_config(&cfg)
    }

    /// Extract the `[neo4j]` table from an already-built configuration.
    pub fn from_config(cfg: &config::Config) -> Result<Self, ConfigError> {
        let settings = match cfg.get::<Neo4jSettings>("neo4j") {
            Ok(s) => s,
            Err(config::ConfigError::NotFound(_)) => Self::new("", "", ""),
            Err(e) => return Err(e.into()),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Reject missing credentials and endpoints the Bolt driver cannot dial.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("neo4j.uri", &self.uri),
            ("neo4j.username", &self.username),
            ("neo4j.password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing {
                    key: key.to_string(),
                });
            }
        }

        if !URI_SCHEMES.iter().any(|s| self.uri.starts_with(s)) {
            return Err(ConfigError::Invalid {
                key: "neo4j.uri".to_string(),
                reason: format!(
                    "'{}' must start with one of: {}",
                    self.uri,
                    URI_SCHEMES.join(", ")
                ),
            });
        }

        if self.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "neo4j.max_connections".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build(pairs: &[(&str, &str)]) -> config::Config {
        let mut builder = config::Config::builder();
        for (k, v) in pairs {
            builder = builder.set_override(*k, *v).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_complete_settings() {
        let cfg = build(&[
            ("neo4j.uri", "bolt://localhost:7687"),
            ("neo4j.username", "neo4j"),
            ("neo4j.password", "secret"),
        ]);
        let settings = Neo4jSettings::from_config(&cfg).unwrap();
        assert_eq!(settings.uri, "bolt://localhost:7687");
        assert_eq!(settings.username, "neo4j");
        assert_eq!(settings.max_connections, 16);
        assert_eq!(settings.fetch_size, 256);
    }

    #[test]
    fn test_missing_section_is_fatal() {
        let cfg = build(&[]);
        let err = Neo4jSettings::from_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { ref key } if key == "neo4j.uri"));
    }

    #[test]
    fn test_missing_password_is_fatal() {
        let cfg = build(&[
            ("neo4j.uri", "neo4j://db.internal:7687"),
            ("neo4j.username", "reader"),
        ]);
        let err = Neo4jSettings::from_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { ref key } if key == "neo4j.password"));
    }

    #[test]
    fn test_bad_scheme_is_invalid() {
        let cfg = build(&[
            ("neo4j.uri", "http://localhost:7474"),
            ("neo4j.username", "neo4j"),
            ("neo4j.password", "secret"),
        ]);
        let err = Neo4jSettings::from_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("http://localhost:7474"));
    }

    #[test]
    fn test_settings_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[neo4j]\nuri = \"neo4j+s://demo.databases.neo4j.io\"\nusername = \"bom\"\npassword = \"pw\"\nfetch_size = 64"
        )
        .unwrap();

        let cfg = config::Config::builder()
            .add_source(config::File::from(file.path()))
            .build()
            .unwrap();
        let settings = Neo4jSettings::from_config(&cfg).unwrap();
        assert_eq!(settings.uri, "neo4j+s://demo.databases.neo4j.io");
        assert_eq!(settings.fetch_size, 64);
        assert_eq!(settings.max_connections, 16);
    }

    #[test]
    fn test_debug_redacts_password() {
        let settings = Neo4jSettings::new("bolt://localhost:7687", "neo4j", "hunter2");
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
