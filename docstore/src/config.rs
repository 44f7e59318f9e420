//! # Configuration Management
//!
//! A [`StoreConfig`] is built once at startup and handed to [`crate::DocStore`]
//! behind an `Arc`; nothing in the crate reads configuration from global
//! state.
//!
//! Defaults come from a [`Profile`]: `dev` is writable, `prod` is read-only.
//! A JSON file may override any subset of fields:
//!
//! ```json
//! {
//!   "docfiles_dir": "/srv/docs",
//!   "readonly": false,
//!   "max_content_mb": 25
//! }
//! ```
//!
//! ```rust,no_run
//! use docstore::config::{Profile, StoreConfig};
//!
//! let config = StoreConfig::load_or_default("docstore.json", Profile::Dev)?;
//! assert!(config.max_content_bytes() > 0);
//! # Ok::<(), docstore::StoreError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreResult;

/// Deployment profile selecting default settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Dev,
    Prod,
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Profile::Dev),
            "prod" | "production" => Ok(Profile::Prod),
            other => Err(format!("unknown profile '{other}' (expected dev or prod)")),
        }
    }
}

/// Settings for the documentation store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory holding one subdirectory per project
    pub docfiles_dir: PathBuf,
    /// URL prefix under which the root directory is served
    pub docfiles_link_root: String,
    /// Reject uploads when set
    pub readonly: bool,
    /// Reject version deletion when set
    pub disable_delete: bool,
    /// Maximum accepted archive size in megabytes
    pub max_content_mb: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::for_profile(Profile::default())
    }
}

impl StoreConfig {
    /// Defaults for the given profile.
    pub fn for_profile(profile: Profile) -> Self {
        StoreConfig {
            docfiles_dir: PathBuf::from("./docfiles"),
            docfiles_link_root: "/static/docfiles".to_string(),
            readonly: matches!(profile, Profile::Prod),
            disable_delete: false,
            max_content_mb: 10,
        }
    }

    /// Defaults for `profile` rooted at `docfiles_dir`.
    pub fn with_root(docfiles_dir: impl Into<PathBuf>, profile: Profile) -> Self {
        StoreConfig {
            docfiles_dir: docfiles_dir.into(),
            ..Self::for_profile(profile)
        }
    }

    /// Load configuration from a JSON file; missing fields take `dev` defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let config_str = fs::read_to_string(path)?;
        let config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Load `path` over the defaults of `profile`, or use those defaults when
    /// the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P, profile: Profile) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using profile defaults");
            return Ok(Self::for_profile(profile));
        }

        let overrides: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        let mut merged = serde_json::to_value(Self::for_profile(profile))?;
        if let (Some(base), Some(extra)) = (merged.as_object_mut(), overrides.as_object()) {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
        }
        Ok(serde_json::from_value(merged)?)
    }

    /// Maximum archive size in bytes.
    pub fn max_content_bytes(&self) -> u64 {
        self.max_content_mb.saturating_mul(1024 * 1024)
    }
}
