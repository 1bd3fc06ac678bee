//! Configuration types for the login chain verifier.
//!
//! Configuration is loaded from a single YAML file (usually `loginchain.yaml`):
//!
//! ```yaml
//! authority:
//!   public_key_env: LOGINCHAIN_AUTHORITY_KEY
//!   public_key_file: keys/authority.pub
//! forwarding:
//!   trusted: true
//! limits:
//!   max_segment_len: 3000000
//! ```
//!
//! Every section is optional; an empty file yields the defaults (built-in
//! authority key, forwarding not trusted, 3,000,000 byte segments).

pub mod authority;
pub mod forwarding;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use authority::AuthorityConfig;
pub use forwarding::ForwardingConfig;

/// Largest accepted length for either segment of a login buffer.
pub const DEFAULT_MAX_SEGMENT_LEN: usize = 3_000_000;

/// Complete loginchain configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoginConfig {
    /// Where the chain authority key comes from.
    #[serde(default)]
    pub authority: AuthorityConfig,

    /// Trusted-proxy identity forwarding.
    #[serde(default)]
    pub forwarding: ForwardingConfig,

    /// Input size limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Size limits applied while decoding a login buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum declared length of the chain and skin segments, in bytes.
    #[serde(default = "default_max_segment_len")]
    pub max_segment_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_segment_len: default_max_segment_len(),
        }
    }
}

fn default_max_segment_len() -> usize {
    DEFAULT_MAX_SEGMENT_LEN
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LoginConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration and resolve relative paths against the file's directory.
    pub fn load_with_context(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        if let Some(key_file) = &config.authority.public_key_file {
            if key_file.is_relative() {
                config.authority.public_key_file = Some(base_dir.join(key_file));
            }
        }

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_segment_len == 0 {
            return Err(ConfigError::Config(
                "limits.max_segment_len must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
