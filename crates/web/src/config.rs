//! Server configuration, loaded from TOML.
//!
//! ```toml
//! [server]
//! bind_address = "127.0.0.1:5000"
//! cors_origin = "*"
//!
//! [generator]
//! strategy = "multiplet"
//! progress_every = 10
//!
//! [jobs]
//! session_ttl_secs = 600
//! ```

use std::path::Path;
use std::time::Duration;

use netmotif_graph::GeneratorConfig;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub generator: GeneratorConfig,
    pub jobs: JobsConfig,
}

/// Web server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (e.g., "127.0.0.1:5000")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Allowed CORS origin; `*` allows any
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Streaming job housekeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Idle sessions older than this are removed
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Period of the expiry sweep
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Events buffered per session channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl JobsConfig {
    pub const fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_cors_origin() -> String {
    "*".to_string()
}

const fn default_session_ttl_secs() -> u64 {
    600
}

const fn default_sweep_interval_secs() -> u64 {
    60
}

const fn default_channel_capacity() -> usize {
    netmotif_events::DEFAULT_CHANNEL_CAPACITY
}

impl Config {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Config`] if its content is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Apply `NETMOTIF_BIND_ADDRESS` and `NETMOTIF_CORS_ORIGIN` overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(address) = std::env::var("NETMOTIF_BIND_ADDRESS") {
            self.server.bind_address = address;
        }
        if let Ok(origin) = std::env::var("NETMOTIF_CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
        self
    }

    /// Check values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), Error> {
        self.generator
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;
        if self.jobs.sweep_interval_secs == 0 {
            return Err(Error::Config(
                "jobs.sweep_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.jobs.channel_capacity == 0 {
            return Err(Error::Config(
                "jobs.channel_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    #![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

    use super::*;
    use netmotif_graph::GenerationStrategy;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind_address, "127.0.0.1:5000");
        assert_eq!(config.server.cors_origin, "*");
        assert_eq!(config.jobs.session_ttl_secs, 600);
        assert_eq!(config.jobs.sweep_interval_secs, 60);
        assert_eq!(config.jobs.channel_capacity, 256);
        assert_eq!(config.generator, GeneratorConfig::default());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            bind_address = "0.0.0.0:8080"

            [generator]
            strategy = "multiplet"
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.server.cors_origin, "*");
        assert_eq!(config.generator.strategy, GenerationStrategy::Multiplet);
        assert_eq!(config.generator.seed, Some(7));
        assert_eq!(config.generator.progress_every, 1);
        assert_eq!(config.jobs, JobsConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let zero_interval = Config::from_toml_str("[jobs]\nsweep_interval_secs = 0\n");
        assert!(matches!(zero_interval, Err(Error::Config(_))));

        let zero_progress = Config::from_toml_str("[generator]\nprogress_every = 0\n");
        assert!(matches!(zero_progress, Err(Error::Config(_))));

        let unknown_strategy = Config::from_toml_str("[generator]\nstrategy = \"magic\"\n");
        assert!(matches!(unknown_strategy, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[jobs]\nsession_ttl_secs = 5").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.jobs.session_ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
