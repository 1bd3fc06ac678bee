//! The immutable result of decoding one login buffer.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::chain::{Verdict, parse_chain_json};
use crate::claims::{DeviceClaims, IdentityClaims, UiProfile};
use crate::error::LoginError;
use crate::frame::LoginFrame;
use crate::policy::LoginPolicy;

/// Read-only view of the data a client sent at login.
///
/// Display name and client UUID are reported even when the chain did not
/// verify. Only the XUID is withheld. Callers that need a trusted identity
/// must check [`is_authenticated`](Self::is_authenticated) first.
pub trait LoginChainData {
    fn username(&self) -> Option<&str>;
    fn client_uuid(&self) -> Option<Uuid>;
    fn identity_public_key(&self) -> Option<&str>;
    /// Xbox user id: the forwarded one when a trusted proxy supplied it,
    /// otherwise the chain's, and only for a verified chain.
    fn xuid(&self) -> Option<&str>;
    fn is_authenticated(&self) -> bool;

    fn client_id(&self) -> i64;
    fn server_address(&self) -> &str;
    fn device_model(&self) -> &str;
    fn device_os(&self) -> i32;
    fn device_id(&self) -> &str;
    fn game_version(&self) -> &str;
    fn gui_scale(&self) -> i32;
    fn language_code(&self) -> &str;
    fn current_input_mode(&self) -> i32;
    fn default_input_mode(&self) -> i32;
    fn ui_profile(&self) -> UiProfile;
    fn cape_data(&self) -> &str;
    fn waterdog_xuid(&self) -> Option<&str>;
    fn waterdog_ip(&self) -> Option<&str>;

    /// The decoded client data object, for fields not modeled above.
    fn raw_data(&self) -> &Map<String, Value>;
}

/// Claims decoded from one login buffer.
///
/// Two snapshots are equal when they were decoded from the same bytes.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialSnapshot {
    authenticated: bool,
    forwarded: bool,
    #[serde(flatten)]
    identity: IdentityClaims,
    #[serde(flatten)]
    device: DeviceClaims,
    #[serde(skip)]
    verdict: Verdict,
    #[serde(skip)]
    raw_data: Map<String, Value>,
    #[serde(skip)]
    buffer: Vec<u8>,
}

impl CredentialSnapshot {
    /// Decode a login buffer, checking expiry against the current time.
    pub fn from_buffer(buffer: &[u8], policy: &LoginPolicy) -> Result<Self, LoginError> {
        Self::from_buffer_at(buffer, policy, Utc::now())
    }

    /// Decode a login buffer, checking expiry as of `now`.
    pub fn from_buffer_at(
        buffer: &[u8],
        policy: &LoginPolicy,
        now: DateTime<Utc>,
    ) -> Result<Self, LoginError> {
        let frame = LoginFrame::decode(buffer, policy.max_segment_len())?;

        let chain = parse_chain_json(frame.chain)?;
        let verdict = policy.verifier().verify(&chain, now)?;

        let skin = std::str::from_utf8(frame.skin).map_err(|source| LoginError::InvalidUtf8 {
            segment: "skin",
            source,
        })?;
        let extraction = policy
            .extractor()
            .extract(&chain, skin, verdict.is_authenticated())?;

        debug!(
            links = chain.len(),
            authenticated = extraction.authenticated,
            forwarded = extraction.forwarded,
            "decoded login chain data"
        );

        Ok(Self {
            authenticated: extraction.authenticated,
            forwarded: extraction.forwarded,
            identity: extraction.identity,
            device: extraction.device,
            verdict,
            raw_data: extraction.raw_data,
            buffer: buffer.to_vec(),
        })
    }

    /// Outcome of chain verification, independent of proxy forwarding.
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Whether the XUID was supplied by a trusted proxy.
    pub fn is_forwarded(&self) -> bool {
        self.forwarded
    }

    pub fn identity(&self) -> &IdentityClaims {
        &self.identity
    }

    pub fn device(&self) -> &DeviceClaims {
        &self.device
    }

    /// The raw login buffer this snapshot was decoded from.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}

impl PartialEq for CredentialSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.buffer == other.buffer
    }
}

impl Eq for CredentialSnapshot {}

impl Hash for CredentialSnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.buffer.hash(state);
    }
}

impl LoginChainData for CredentialSnapshot {
    fn username(&self) -> Option<&str> {
        self.identity.display_name.as_deref()
    }

    fn client_uuid(&self) -> Option<Uuid> {
        self.identity.identity
    }

    fn identity_public_key(&self) -> Option<&str> {
        self.identity.identity_public_key.as_deref()
    }

    fn xuid(&self) -> Option<&str> {
        self.identity.xuid.as_deref()
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn client_id(&self) -> i64 {
        self.device.client_random_id
    }

    fn server_address(&self) -> &str {
        &self.device.server_address
    }

    fn device_model(&self) -> &str {
        &self.device.device_model
    }

    fn device_os(&self) -> i32 {
        self.device.device_os
    }

    fn device_id(&self) -> &str {
        &self.device.device_id
    }

    fn game_version(&self) -> &str {
        &self.device.game_version
    }

    fn gui_scale(&self) -> i32 {
        self.device.gui_scale
    }

    fn language_code(&self) -> &str {
        &self.device.language_code
    }

    fn current_input_mode(&self) -> i32 {
        self.device.current_input_mode
    }

    fn default_input_mode(&self) -> i32 {
        self.device.default_input_mode
    }

    fn ui_profile(&self) -> UiProfile {
        self.device.profile()
    }

    fn cape_data(&self) -> &str {
        &self.device.cape_data
    }

    fn waterdog_xuid(&self) -> Option<&str> {
        self.device.waterdog_xuid.as_deref()
    }

    fn waterdog_ip(&self) -> Option<&str> {
        self.device.waterdog_ip.as_deref()
    }

    fn raw_data(&self) -> &Map<String, Value> {
        &self.raw_data
    }
}
