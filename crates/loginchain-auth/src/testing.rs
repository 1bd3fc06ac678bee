//! Chain signing helpers for tests.
//!
//! Real clients receive their chain from Xbox Live. These helpers build
//! equivalent chains from locally generated keys so the verifier can be
//! exercised end to end.

use chrono::{Duration, Utc};
use p384::PublicKey;
use p384::ecdsa::signature::Signer;
use p384::ecdsa::{Signature, SigningKey};
use rand::RngCore;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::chain::ChainVerifier;
use crate::error::KeyError;
use crate::frame::LoginFrame;
use crate::keys::ChainKey;
use crate::policy::LoginPolicy;
use crate::token::encode_segment;

/// A P-384 key pair that signs chain links.
#[derive(Clone)]
pub struct LinkKey {
    signing: SigningKey,
}

impl LinkKey {
    /// Generate a new random key pair.
    pub fn generate() -> Result<Self, KeyError> {
        let mut bytes = [0u8; 48];
        rand::rng().fill_bytes(&mut bytes);
        let signing =
            SigningKey::from_slice(&bytes).map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self { signing })
    }

    pub fn chain_key(&self) -> ChainKey {
        ChainKey::from(PublicKey::from(self.signing.verifying_key()))
    }

    /// Base64 `SubjectPublicKeyInfo`, as used in `x5u` and `identityPublicKey`.
    pub fn public_base64(&self) -> String {
        self.chain_key()
            .to_base64()
            .expect("generated key encodes")
    }

    /// Sign an ES384 link whose `x5u` header names `x5u`.
    pub fn sign(&self, x5u: &str, payload: &Value) -> String {
        self.sign_with_header(&json!({"alg": "ES384", "x5u": x5u}), payload)
    }

    /// Sign a link with an arbitrary header.
    pub fn sign_with_header(&self, header: &Value, payload: &Value) -> String {
        let signing_input = format!(
            "{}.{}",
            encode_segment(header.to_string().as_bytes()),
            encode_segment(payload.to_string().as_bytes())
        );
        let signature: Signature = self.signing.sign(signing_input.as_bytes());
        format!("{signing_input}.{}", encode_segment(&signature.to_bytes()))
    }
}

impl std::fmt::Debug for LinkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkKey")
            .field("public", &self.public_base64())
            .finish_non_exhaustive()
    }
}

/// An unsigned token carrying `payload`, like the client data segment.
pub fn unsigned_token(payload: &Value) -> String {
    format!(
        "{}.{}.",
        encode_segment(br#"{"alg":"ES384"}"#),
        encode_segment(payload.to_string().as_bytes())
    )
}

/// The chain segment JSON for `links`.
pub fn chain_json(links: &[String]) -> String {
    json!({ "chain": links }).to_string()
}

/// A complete login buffer for `links` and the client data token `skin`.
pub fn login_buffer(links: &[String], skin: &str) -> Vec<u8> {
    LoginFrame::encode(chain_json(links).as_bytes(), skin.as_bytes())
        .expect("test segments fit in a length prefix")
}

/// A three-link chain shaped like an Xbox Live login:
/// a self-signed client link, the authority link, then the identity link.
#[derive(Debug, Clone)]
pub struct ChainFixture {
    pub client: LinkKey,
    pub authority: LinkKey,
    pub intermediate: LinkKey,
    /// `exp` written into every link.
    pub expires_at: i64,
}

impl ChainFixture {
    pub const DISPLAY_NAME: &'static str = "Steve";
    pub const XUID: &'static str = "2535400000000001";

    pub fn identity() -> Uuid {
        Uuid::from_u128(0x2f2a9f0e_3f5c_4b5e_9a3c_5d6e7f809a1b)
    }

    pub fn new() -> Self {
        Self {
            client: LinkKey::generate().expect("generate client key"),
            authority: LinkKey::generate().expect("generate authority key"),
            intermediate: LinkKey::generate().expect("generate intermediate key"),
            expires_at: (Utc::now() + Duration::days(1)).timestamp(),
        }
    }

    /// Self-signed by the client, handing off to the authority.
    pub fn client_link(&self) -> String {
        self.client.sign(
            &self.client.public_base64(),
            &json!({
                "exp": self.expires_at,
                "certificateAuthority": true,
                "identityPublicKey": self.authority.public_base64(),
            }),
        )
    }

    /// Signed by the authority, handing off to the intermediate key.
    pub fn authority_link(&self) -> String {
        self.authority.sign(
            &self.authority.public_base64(),
            &json!({
                "exp": self.expires_at,
                "certificateAuthority": true,
                "identityPublicKey": self.intermediate.public_base64(),
            }),
        )
    }

    /// The terminal link carrying the player identity.
    pub fn identity_link(&self) -> String {
        self.intermediate.sign(
            &self.intermediate.public_base64(),
            &json!({
                "exp": self.expires_at,
                "extraData": {
                    "displayName": Self::DISPLAY_NAME,
                    "identity": Self::identity().to_string(),
                    "XUID": Self::XUID,
                },
                "identityPublicKey": self.client.public_base64(),
            }),
        )
    }

    pub fn chain(&self) -> Vec<String> {
        vec![self.client_link(), self.authority_link(), self.identity_link()]
    }

    pub fn verifier(&self) -> ChainVerifier {
        ChainVerifier::new(self.authority.chain_key())
    }

    pub fn policy(&self) -> LoginPolicy {
        LoginPolicy::new(self.authority.chain_key())
    }
}

impl Default for ChainFixture {
    fn default() -> Self {
        Self::new()
    }
}
