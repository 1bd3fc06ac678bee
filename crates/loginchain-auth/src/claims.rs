//! Identity and device claims carried by a login.

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::LoginError;
use crate::field;

/// Identity claims gathered from the login chain.
///
/// Every link may contribute; later links overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentityClaims {
    /// Player display name (`extraData.displayName`).
    pub display_name: Option<String>,

    /// Client identity (`extraData.identity`).
    pub identity: Option<Uuid>,

    /// Xbox user id (`extraData.XUID`).
    pub xuid: Option<String>,

    /// Base64 public key from the last link declaring `identityPublicKey`.
    pub identity_public_key: Option<String>,
}

impl IdentityClaims {
    /// Fold one decoded link payload into the claims.
    pub fn absorb(mut self, payload: &Map<String, Value>) -> Result<Self, LoginError> {
        if let Some(extra) = field::optional::<Map<String, Value>>(payload, "extraData")? {
            if let Some(name) = field::optional(&extra, "displayName")? {
                self.display_name = Some(name);
            }
            if let Some(identity) = field::optional::<String>(&extra, "identity")? {
                let uuid = Uuid::parse_str(&identity).map_err(|source| {
                    LoginError::InvalidIdentity {
                        value: identity.clone(),
                        source,
                    }
                })?;
                self.identity = Some(uuid);
            }
            if let Some(xuid) = field::optional(&extra, "XUID")? {
                self.xuid = Some(xuid);
            }
        }
        if let Some(key) = field::optional(payload, "identityPublicKey")? {
            self.identity_public_key = Some(key);
        }
        Ok(self)
    }

    /// Drop the XUID; used when the chain did not verify.
    pub fn without_xuid(self) -> Self {
        Self { xuid: None, ..self }
    }
}

/// UI layout requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UiProfile {
    Classic,
    Pocket,
    Other(i32),
}

impl UiProfile {
    pub const CLASSIC: i32 = 0;
    pub const POCKET: i32 = 1;
}

impl From<i32> for UiProfile {
    fn from(value: i32) -> Self {
        match value {
            Self::CLASSIC => Self::Classic,
            Self::POCKET => Self::Pocket,
            other => Self::Other(other),
        }
    }
}

/// Client-declared device metadata from the client data token.
///
/// Absent keys leave the zero value; nothing here is verified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceClaims {
    #[serde(rename = "ClientRandomId")]
    pub client_random_id: i64,
    #[serde(rename = "ServerAddress")]
    pub server_address: String,
    #[serde(rename = "DeviceModel")]
    pub device_model: String,
    #[serde(rename = "DeviceOS")]
    pub device_os: i32,
    #[serde(rename = "DeviceId")]
    pub device_id: String,
    #[serde(rename = "GameVersion")]
    pub game_version: String,
    #[serde(rename = "GuiScale")]
    pub gui_scale: i32,
    #[serde(rename = "LanguageCode")]
    pub language_code: String,
    #[serde(rename = "CurrentInputMode")]
    pub current_input_mode: i32,
    #[serde(rename = "DefaultInputMode")]
    pub default_input_mode: i32,
    #[serde(rename = "UIProfile")]
    pub ui_profile: i32,
    #[serde(rename = "CapeData")]
    pub cape_data: String,

    /// XUID asserted by a fronting proxy.
    #[serde(rename = "Waterdog_XUID", skip_serializing_if = "Option::is_none")]
    pub waterdog_xuid: Option<String>,

    /// Client address asserted by a fronting proxy.
    #[serde(rename = "Waterdog_IP", skip_serializing_if = "Option::is_none")]
    pub waterdog_ip: Option<String>,
}

impl DeviceClaims {
    /// Read device claims from a decoded client data payload.
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, LoginError> {
        Ok(Self {
            client_random_id: field::or_default(payload, "ClientRandomId")?,
            server_address: field::or_default(payload, "ServerAddress")?,
            device_model: field::or_default(payload, "DeviceModel")?,
            device_os: field::or_default(payload, "DeviceOS")?,
            device_id: field::or_default(payload, "DeviceId")?,
            game_version: field::or_default(payload, "GameVersion")?,
            gui_scale: field::or_default(payload, "GuiScale")?,
            language_code: field::or_default(payload, "LanguageCode")?,
            current_input_mode: field::or_default(payload, "CurrentInputMode")?,
            default_input_mode: field::or_default(payload, "DefaultInputMode")?,
            ui_profile: field::or_default(payload, "UIProfile")?,
            cape_data: field::or_default(payload, "CapeData")?,
            waterdog_xuid: field::optional(payload, "Waterdog_XUID")?,
            waterdog_ip: field::optional(payload, "Waterdog_IP")?,
        })
    }

    pub fn profile(&self) -> UiProfile {
        UiProfile::from(self.ui_profile)
    }

    /// The proxy-forwarded `(xuid, ip)` pair, when both are present.
    pub fn forwarded_identity(&self) -> Option<(&str, &str)> {
        match (&self.waterdog_xuid, &self.waterdog_ip) {
            (Some(xuid), Some(ip)) => Some((xuid.as_str(), ip.as_str())),
            _ => None,
        }
    }

    /// Whether any proxy forwarding field is present.
    pub fn has_forwarding_fields(&self) -> bool {
        self.waterdog_xuid.is_some() || self.waterdog_ip.is_some()
    }
}
