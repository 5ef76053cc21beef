//! Project configuration file support.
//!
//! gzbuild reads an optional `gzbuild.toml` from the project root. Every
//! field has a default, so an absent file behaves like an empty one.
//! Command-line flags take precedence over values read here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ops::release::{DEFAULT_CONTENTS, DEFAULT_VCS_MARKER};

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "gzbuild.toml";

/// Error loading the project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// gzbuild configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package metadata
    pub package: PackageConfig,

    /// Capability probe settings
    pub probe: ProbeConfig,

    /// Runtime configuration (`gazeborc`) settings
    pub runtime: RuntimeConfig,

    /// Release packaging settings
    pub release: ReleaseConfig,
}

/// Package metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Release version; defaults to [`crate::VERSION`]
    pub version: Option<String>,
}

/// Settings for the capability probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// C++ compiler driver used for the compile+link check
    pub cxx: Option<PathBuf>,

    /// Extra library search directories
    pub lib_dirs: Vec<PathBuf>,

    /// Extra include directories
    pub include_dirs: Vec<PathBuf>,

    /// Extra compiler flags
    pub cflags: Vec<String>,

    /// Extra linker flags
    pub ldflags: Vec<String>,
}

/// Settings for the runtime configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// pkg-config executable
    pub pkg_config: Option<PathBuf>,

    /// Package whose `plugindir` variable is queried
    pub plugin_package: String,

    /// Fixed plugin directory; skips the pkg-config query when set
    pub ogre_path: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            pkg_config: None,
            plugin_package: "OGRE".to_string(),
            ogre_path: None,
        }
    }
}

/// Settings for release packaging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Top-level paths copied into the release tree
    pub contents: Vec<String>,

    /// Directory name of version-control metadata to prune
    pub vcs_marker: String,

    /// Command run for the Clean step; empty disables it
    pub clean_command: Vec<String>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            contents: DEFAULT_CONTENTS.iter().map(|s| s.to_string()).collect(),
            vcs_marker: DEFAULT_VCS_MARKER.to_string(),
            clean_command: vec!["scons".to_string(), "-c".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration, using defaults if the file doesn't exist.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            tracing::debug!("loading config from {}", path.display());
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Release version, falling back to the built-in identifier.
    pub fn version(&self) -> &str {
        self.package.version.as_deref().unwrap_or(crate::VERSION)
    }
}
