// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Layers, later wins: built-in defaults, then a TOML file, then
//! `PATHYARD__SECTION__KEY` environment variables. Command-line flags are
//! applied on top by the commands themselves.

use crate::generator::GeneratorConfig;
use crate::metrics::MetricsConfig;
use crate::paths::DEFAULT_RELATIVE_TOLERANCE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// File name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "pathyard.toml";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "PATHYARD";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Random graph parameters
    pub generator: GeneratorConfig,
    /// Metrics battery parameters
    pub metrics: MetricsConfig,
    /// Shortest-path suite settings
    pub paths: PathsConfig,
    /// Simple-path enumeration settings
    pub all_paths: AllPathsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            generator: GeneratorConfig::default(),
            metrics: MetricsConfig::default(),
            paths: PathsConfig::default(),
            all_paths: AllPathsConfig::default(),
        }
    }
}

/// Shortest-path suite settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Relative tolerance when comparing costs across algorithms
    pub relative_tolerance: f64,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
        }
    }
}

/// Simple-path enumeration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllPathsConfig {
    /// Maximum hop count
    pub max_depth: usize,
    /// Time budget in milliseconds, no limit when absent
    pub timeout_ms: Option<u64>,
    /// Stop after this many paths
    pub path_limit: Option<usize>,
}

impl Default for AllPathsConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            timeout_ms: Some(10_000),
            path_limit: None,
        }
    }
}

impl AllPathsConfig {
    /// Time budget as a [`Duration`]
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Default location of the config file, if the platform has a config dir
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "hyperpolymath", "pathyard")
        .map(|d| d.config_dir().join(CONFIG_FILE_NAME))
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, the default location is used
/// when the file is present.
///
/// # Errors
/// Missing explicit file, unreadable or malformed TOML, or environment
/// overrides of the wrong type.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let mut builder = config::Config::builder();

    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config file");
            builder = builder.add_source(config::File::from(path).required(true));
        }
        None => {
            if let Some(path) = default_path().filter(|p| p.exists()) {
                debug!(path = %path.display(), "loading default config file");
                builder = builder.add_source(config::File::from(path).required(false));
            }
        }
    }

    let layered = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read configuration")?;

    layered
        .try_deserialize()
        .context("Invalid configuration")
}

/// Render a configuration as TOML
///
/// # Errors
/// Serialization failure.
pub fn to_toml(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pathyard.toml");
        fs::write(
            &path,
            r#"
log_level = "debug"

[generator]
nodes = 12
seed = 7

[all_paths]
max_depth = 6
path_limit = 100
"#,
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.generator.nodes, 12);
        assert_eq!(config.generator.seed, 7);
        // Untouched keys keep their defaults
        assert_eq!(config.generator.degree_max, GeneratorConfig::default().degree_max);
        assert_eq!(config.all_paths.max_depth, 6);
        assert_eq!(config.all_paths.path_limit, Some(100));
        assert_eq!(config.metrics, MetricsConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pathyard.toml");
        fs::write(&path, "[generator]\nnodes = \"many\"\n").unwrap();
        assert!(load(Some(&path)).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let text = to_toml(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_timeout_conversion() {
        let all_paths = AllPathsConfig {
            timeout_ms: Some(250),
            ..AllPathsConfig::default()
        };
        assert_eq!(all_paths.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(
            AllPathsConfig {
                timeout_ms: None,
                ..AllPathsConfig::default()
            }
            .timeout(),
            None
        );
    }
}
