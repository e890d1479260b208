//! Optional report card configuration file.
//!
//! ```yaml
//! thresholds:
//!   gofmt: 90
//!   go_vet: 75
//! exclude:
//!   - "**/*_mock.go"
//! timeout_secs: 300
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;

use crate::error::{ReportCardError, Result};
use crate::threshold::ThresholdMap;

/// Config file names looked up in the project root.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["reportcard.yaml", ".reportcard.yaml"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Minimum percentage per check name.
    #[serde(default)]
    pub thresholds: BTreeMap<String, f64>,
    /// Glob patterns, relative to the project root, of Go files to skip.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Per-check time limit in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Where the config was loaded from, for error messages.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ReportCardError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut config: Config =
            serde_yaml::from_str(&content).map_err(|source| ReportCardError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load `explicit` if given, else the first default config in `dir`,
    /// else an empty config.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::parse_file(path);
        }
        match discover(dir) {
            Some(path) => {
                tracing::debug!(config = %path.display(), "using discovered config");
                Self::parse_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Thresholds from the file, validated against `known` check names.
    pub fn threshold_map(&self, known: &[&str]) -> Result<ThresholdMap> {
        let mut map = ThresholdMap::new();
        for (name, value) in &self.thresholds {
            map.set(name, *value, known)
                .map_err(|e| self.invalid(e.to_string()))?;
        }
        Ok(map)
    }

    /// Compile the exclude patterns.
    pub fn exclude_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = Glob::new(pattern).map_err(|e| {
                self.invalid(format!("invalid exclude pattern {:?}: {}", pattern, e))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| self.invalid(format!("invalid exclude patterns: {}", e)))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Check every field so problems surface before any check runs.
    pub fn validate(&self, known: &[&str]) -> Result<()> {
        self.threshold_map(known)?;
        self.exclude_set()?;
        if self.timeout_secs == Some(0) {
            return Err(self.invalid("timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }

    fn invalid(&self, message: String) -> ReportCardError {
        ReportCardError::Config {
            path: self.source.clone().unwrap_or_default(),
            message,
        }
    }
}

/// Find a default config file in `dir`.
fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}
