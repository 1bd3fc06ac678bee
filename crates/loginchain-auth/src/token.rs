//! Compact token decoding.
//!
//! A compact token is `header.payload.signature`, each segment base64url
//! encoded. Clients are inconsistent about padding and occasionally use the
//! standard alphabet, so segments are decoded leniently.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{DecodeError, Engine as _};
use serde_json::{Map, Value};

use crate::error::LoginError;
use crate::field;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// URL-safe alphabet, padding optional.
pub(crate) const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Standard alphabet, padding optional.
pub(crate) const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode base64 in either alphabet, with or without padding.
pub(crate) fn decode_base64(segment: &str) -> Result<Vec<u8>, DecodeError> {
    if segment.contains(['+', '/']) {
        STANDARD_LENIENT.decode(segment)
    } else {
        URL_SAFE_LENIENT.decode(segment)
    }
}

/// Encode bytes as an unpadded base64url token segment.
pub(crate) fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_LENIENT.encode(bytes)
}

/// Decode a base64 segment holding a JSON object.
fn decode_object(segment: &str) -> Result<Map<String, Value>, LoginError> {
    let bytes = decode_base64(segment)?;
    match serde_json::from_slice(&bytes).map_err(LoginError::PayloadJson)? {
        Value::Object(map) => Ok(map),
        _ => Err(LoginError::PayloadNotObject),
    }
}

/// Decode the payload of a compact token without verifying it.
///
/// Returns `Ok(None)` when the token has fewer than two segments; callers
/// skip such tokens. A payload that is present but undecodable is an error.
pub fn decode_payload(token: &str) -> Result<Option<Map<String, Value>>, LoginError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload)) = (segments.next(), segments.next()) else {
        return Ok(None);
    };
    decode_object(payload).map(Some)
}

/// A compact token split into its three segments, with the header decoded.
///
/// Used by the chain verifier; nothing here checks the signature.
#[derive(Debug, Clone)]
pub struct SignedToken<'a> {
    header: Map<String, Value>,
    payload: &'a str,
    signing_input: &'a str,
    signature: &'a str,
}

impl<'a> SignedToken<'a> {
    /// Split `token` and decode its header.
    pub fn parse(token: &'a str) -> Result<Self, LoginError> {
        let mut segments = token.splitn(4, '.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(LoginError::MalformedToken {
                segments: token.split('.').count(),
            });
        };

        let signing_input = &token[..header.len() + 1 + payload.len()];
        Ok(Self {
            header: decode_object(header)?,
            payload,
            signing_input,
            signature,
        })
    }

    /// The `x5u` header: base64 key of the signer of this link.
    pub fn certificate_url(&self) -> Result<Option<String>, LoginError> {
        field::optional(&self.header, "x5u")
    }

    /// The `alg` header.
    pub fn algorithm(&self) -> Result<Option<String>, LoginError> {
        field::optional(&self.header, "alg")
    }

    /// The `header.payload` bytes covered by the signature.
    pub fn signing_input(&self) -> &[u8] {
        self.signing_input.as_bytes()
    }

    /// Raw signature bytes.
    pub fn signature(&self) -> Result<Vec<u8>, LoginError> {
        Ok(decode_base64(self.signature)?)
    }

    /// Decode the payload object.
    pub fn payload(&self) -> Result<Map<String, Value>, LoginError> {
        decode_object(self.payload)
    }
}
