//! Chain authority key configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the key that anchors a trusted login chain.
///
/// The key is a base64 encoded X.509 `SubjectPublicKeyInfo` for a P-384
/// public key. When nothing here resolves, the built-in Mojang authority key
/// is used.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthorityConfig {
    /// Inline base64 public key.
    #[serde(default)]
    pub public_key: Option<String>,

    /// Environment variable containing the base64 public key.
    #[serde(default)]
    pub public_key_env: Option<String>,

    /// Path to a file containing the base64 public key.
    #[serde(default)]
    pub public_key_file: Option<PathBuf>,
}

impl AuthorityConfig {
    /// Resolve the public key from environment, file, or inline value.
    pub fn resolve_public_key(&self) -> Result<Option<String>, std::io::Error> {
        // Try environment variable first
        if let Some(env_var) = &self.public_key_env {
            if let Ok(key) = std::env::var(env_var) {
                return Ok(Some(key.trim().to_string()));
            }
        }

        // Try file path
        if let Some(path) = &self.public_key_file {
            if path.exists() {
                let key = std::fs::read_to_string(path)?;
                return Ok(Some(key.trim().to_string()));
            }
        }

        Ok(self.public_key.as_ref().map(|key| key.trim().to_string()))
    }
}
