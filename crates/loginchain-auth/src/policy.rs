//! Resolved login policy.

use loginchain_core::{DEFAULT_MAX_SEGMENT_LEN, LoginConfig};

use crate::chain::ChainVerifier;
use crate::error::KeyError;
use crate::extract::ClaimsExtractor;
use crate::keys::ChainKey;

/// Everything the login decoder needs from process configuration, resolved
/// once at startup and passed to every decode.
#[derive(Debug, Clone)]
pub struct LoginPolicy {
    authority: ChainKey,
    trust_forwarding: bool,
    max_segment_len: usize,
}

impl LoginPolicy {
    /// A policy anchored at `authority` that does not trust forwarded identities.
    pub fn new(authority: ChainKey) -> Self {
        Self {
            authority,
            trust_forwarding: false,
            max_segment_len: DEFAULT_MAX_SEGMENT_LEN,
        }
    }

    /// The default policy, anchored at the Mojang key.
    pub fn mojang() -> Result<Self, KeyError> {
        Ok(Self::new(ChainKey::mojang()?))
    }

    /// Resolve a policy from configuration.
    pub fn from_config(config: &LoginConfig) -> Result<Self, KeyError> {
        let authority = match config.authority.resolve_public_key()? {
            Some(encoded) => ChainKey::from_base64(&encoded)?,
            None => ChainKey::mojang()?,
        };
        Ok(Self::new(authority)
            .with_forwarding(config.forwarding.trusted)
            .with_max_segment_len(config.limits.max_segment_len))
    }

    /// Set whether forwarded proxy identities are trusted.
    pub fn with_forwarding(mut self, trusted: bool) -> Self {
        self.trust_forwarding = trusted;
        self
    }

    /// Set the per-segment size ceiling.
    pub fn with_max_segment_len(mut self, max_segment_len: usize) -> Self {
        self.max_segment_len = max_segment_len;
        self
    }

    pub fn authority(&self) -> &ChainKey {
        &self.authority
    }

    pub fn trusts_forwarding(&self) -> bool {
        self.trust_forwarding
    }

    pub fn max_segment_len(&self) -> usize {
        self.max_segment_len
    }

    pub fn verifier(&self) -> ChainVerifier {
        ChainVerifier::new(self.authority.clone())
    }

    pub fn extractor(&self) -> ClaimsExtractor {
        ClaimsExtractor::new(self.trust_forwarding).with_max_skin_len(self.max_segment_len)
    }
}
