//! Application configuration management.
//!
//! Settings are layered with figment, later layers overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory (or `--config <path>`)
//! 3. Environment variables prefixed with `PHASHDUPE_`
//! 4. Command-line flags (applied by the caller)
//!
//! ```toml
//! jobs = 8
//! extensions = ["jpg", "png"]
//! progress = true
//! ffmpeg = "/usr/local/bin/ffmpeg"
//! cache = "/home/me/.cache/phashdupe.db"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::scanner::video::DEFAULT_FFMPEG;

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "PHASHDUPE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default number of hashing workers when `-j` is not given.
    pub jobs: usize,
    /// Default extension filter for recursive collection when no `-t` is given.
    pub extensions: Vec<String>,
    /// Show a progress bar while fingerprinting.
    pub progress: bool,
    /// `ffmpeg` binary used for video fingerprints.
    pub ffmpeg: PathBuf,
    /// Default fingerprint cache when `-s` is not given.
    pub cache: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jobs: 1,
            extensions: Vec::new(),
            progress: false,
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
            cache: None,
        }
    }
}

impl Config {
    /// Load the configuration, falling back to defaults on any error.
    ///
    /// `path` overrides the platform-specific config file location.
    pub fn load(path: Option<&Path>) -> Self {
        match Self::load_internal(path) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    fn load_internal(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };
        let config = Self::figment(&path).extract()?;
        log::debug!("Configuration: {:?}", config);
        Ok(config)
    }

    /// The layered figment for a given config file.
    ///
    /// A missing file is simply an empty layer.
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Get the default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Fails when no home directory can be determined.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("org", "phashdupe", "phashdupe")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
