//! Run configuration.
//!
//! Supplied once before a run and treated as immutable for its duration.
//! Configuration can come from defaults, a YAML file, and command-line
//! overrides, in that order of precedence (last wins).

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::errors::ConfigError;
use crate::guard::Version;

/// Version of the language under test assumed when none is configured.
pub const DEFAULT_TARGET_VERSION: [u32; 3] = [1, 9, 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Configuration for spec execution and reporting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// The version guards are evaluated against.
    pub target_version: Version,
    /// Platform identifier for platform guards; `None` when unknown.
    pub platform: Option<String>,
    /// Only examples whose full description contains this substring run.
    pub filter: Option<String>,
    pub use_colors: bool,
    pub format: ReportFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_version: Version::new(DEFAULT_TARGET_VERSION.to_vec()),
            platform: Some(std::env::consts::OS.to_string()),
            filter: None,
            use_colors: atty::is(atty::Stream::Stdout),
            format: ReportFormat::Text,
        }
    }
}

impl RunConfig {
    pub fn with_target_version(mut self, version: &str) -> Result<Self, ConfigError> {
        self.target_version = version
            .parse()
            .map_err(|_| ConfigError::InvalidVersion(version.to_string()))?;
        Ok(self)
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn from_yaml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Yaml {
            path: origin.to_string(),
            source,
        })
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        let config = Self::from_yaml_str(&text, &shown)?;
        debug!(path = %shown, target_version = %config.target_version, "loaded run config");
        Ok(config)
    }
}
