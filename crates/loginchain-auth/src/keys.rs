//! Public keys carried in a login chain.

use p384::PublicKey;
use p384::pkcs8::{DecodePublicKey, EncodePublicKey};
use sha2::{Digest, Sha256};

use crate::error::KeyError;
use crate::token::{STANDARD_LENIENT, decode_base64};
use base64::Engine as _;

/// The Mojang public key that signs the authority link of an Xbox Live
/// authenticated login chain.
pub const MOJANG_PUBLIC_KEY: &str = "MHYwEAYHKoZIzj0CAQYFK4EEACIDYgAECRXueJeTDqNRRgJi/vlRufByu/2G0i2Ebt6YMar5QX/R0DIIyrJMcUpruK4QveTfJSTp3Shlq4Gk34cD/4GUWwkv0DVuzeuB+tXija7HBxii03NHDbPAD0AKnLr2wdAp";

/// A P-384 public key from an `x5u` header or an `identityPublicKey` claim.
///
/// Keys compare equal when they encode the same curve point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainKey {
    inner: PublicKey,
}

impl ChainKey {
    /// Parse a base64 encoded X.509 `SubjectPublicKeyInfo`.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let der = decode_base64(encoded.trim())?;
        Self::from_der(&der)
    }

    /// Parse DER encoded `SubjectPublicKeyInfo` bytes.
    pub fn from_der(der: &[u8]) -> Result<Self, KeyError> {
        let inner = PublicKey::from_public_key_der(der)
            .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// The built-in Mojang authority key.
    pub fn mojang() -> Result<Self, KeyError> {
        Self::from_base64(MOJANG_PUBLIC_KEY)
    }

    /// Get the inner curve point.
    pub fn public_key(&self) -> &PublicKey {
        &self.inner
    }

    /// DER encoded `SubjectPublicKeyInfo`.
    pub fn to_der(&self) -> Result<Vec<u8>, KeyError> {
        self.inner
            .to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))
    }

    /// Standard base64 of the DER encoding, as it appears in `x5u`.
    pub fn to_base64(&self) -> Result<String, KeyError> {
        Ok(STANDARD_LENIENT.encode(self.to_der()?))
    }

    /// Colon-separated SHA-256 fingerprint of the DER encoding.
    pub fn fingerprint(&self) -> Result<String, KeyError> {
        let hash = Sha256::digest(self.to_der()?);
        Ok(hash
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(":"))
    }
}

impl From<PublicKey> for ChainKey {
    fn from(inner: PublicKey) -> Self {
        Self { inner }
    }
}
