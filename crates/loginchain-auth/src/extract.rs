//! Claims extraction from a login chain and client data token.

use loginchain_core::DEFAULT_MAX_SEGMENT_LEN;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::claims::{DeviceClaims, IdentityClaims};
use crate::error::LoginError;
use crate::token::decode_payload;

/// Everything extracted from one login.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Chain verified, or a trusted proxy vouched for the player.
    pub authenticated: bool,
    /// A trusted proxy supplied the reported XUID.
    pub forwarded: bool,
    pub identity: IdentityClaims,
    pub device: DeviceClaims,
    /// The decoded client data object, empty when the token had no payload.
    pub raw_data: Map<String, Value>,
}

/// Pulls identity and device claims out of a login.
///
/// Extraction does not depend on the chain verifying: display name and
/// identity are returned either way. The XUID is only kept for a verified
/// chain or a trusted forwarding proxy.
#[derive(Debug, Clone)]
pub struct ClaimsExtractor {
    trust_forwarding: bool,
    max_skin_len: usize,
}

impl ClaimsExtractor {
    pub fn new(trust_forwarding: bool) -> Self {
        Self {
            trust_forwarding,
            max_skin_len: DEFAULT_MAX_SEGMENT_LEN,
        }
    }

    /// Set the largest accepted client data token, in bytes.
    pub fn with_max_skin_len(mut self, max_skin_len: usize) -> Self {
        self.max_skin_len = max_skin_len;
        self
    }

    /// Fold the identity claims of every decodable link, in chain order.
    pub fn identity(&self, chain: &[String], verified: bool) -> Result<IdentityClaims, LoginError> {
        let claims = chain.iter().enumerate().try_fold(
            IdentityClaims::default(),
            |claims, (index, link)| match decode_payload(link)? {
                Some(payload) => claims.absorb(&payload),
                None => {
                    debug!(index, "skipping chain link without a payload segment");
                    Ok(claims)
                }
            },
        )?;

        Ok(if verified { claims } else { claims.without_xuid() })
    }

    /// Decode the client data token into device claims and its raw object.
    pub fn device(&self, skin_token: &str) -> Result<(DeviceClaims, Map<String, Value>), LoginError> {
        if skin_token.len() > self.max_skin_len {
            return Err(LoginError::SegmentTooLarge {
                segment: "skin",
                len: skin_token.len(),
                limit: self.max_skin_len,
            });
        }

        match decode_payload(skin_token)? {
            Some(payload) => Ok((DeviceClaims::from_payload(&payload)?, payload)),
            None => {
                debug!("client data token has no payload segment");
                Ok((DeviceClaims::default(), Map::new()))
            }
        }
    }

    /// Extract identity and device claims and settle the authenticated flag.
    pub fn extract(
        &self,
        chain: &[String],
        skin_token: &str,
        verified: bool,
    ) -> Result<Extraction, LoginError> {
        let mut identity = self.identity(chain, verified)?;
        let (device, raw_data) = self.device(skin_token)?;

        let forwarded_xuid = match device.forwarded_identity() {
            Some((xuid, _)) if self.trust_forwarding => Some(xuid.to_string()),
            Some((_, ip)) => {
                warn!(forwarded_ip = ip, "ignoring forwarded identity from untrusted proxy");
                None
            }
            None => None,
        };

        let forwarded = forwarded_xuid.is_some();
        if let Some(xuid) = forwarded_xuid {
            identity.xuid = Some(xuid);
        }

        Ok(Extraction {
            authenticated: verified || forwarded,
            forwarded,
            identity,
            device,
            raw_data,
        })
    }
}
