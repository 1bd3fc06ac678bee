//! Error types for login chain decoding.

use thiserror::Error;

/// Hard failures while decoding a login buffer.
///
/// These indicate a corrupt or hostile buffer and abort the whole decode.
/// A chain that merely fails verification is not an error; it produces an
/// unauthenticated snapshot instead.
#[derive(Debug, Error)]
pub enum LoginError {
    /// A segment declared a length above the configured ceiling.
    #[error("the {segment} data is too big: {len} bytes (limit {limit})")]
    SegmentTooLarge {
        segment: &'static str,
        len: usize,
        limit: usize,
    },

    /// The buffer ended before a segment was complete.
    #[error("the {segment} data is truncated: expected {expected} bytes, {available} available")]
    Truncated {
        segment: &'static str,
        expected: usize,
        available: usize,
    },

    /// A segment is not valid UTF-8.
    #[error("the {segment} data is not valid UTF-8")]
    InvalidUtf8 {
        segment: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },

    /// The chain segment is not the expected JSON document.
    #[error("malformed chain data: {0}")]
    MalformedChain(#[source] serde_json::Error),

    /// A signed token does not have exactly three segments.
    #[error("signed token has {segments} segments, expected 3")]
    MalformedToken { segments: usize },

    /// A token payload segment is not valid base64.
    #[error("token payload is not valid base64: {0}")]
    PayloadEncoding(#[from] base64::DecodeError),

    /// A token payload is not valid JSON.
    #[error("token payload is not valid JSON: {0}")]
    PayloadJson(#[source] serde_json::Error),

    /// A token payload is valid JSON but not an object.
    #[error("token payload is not a JSON object")]
    PayloadNotObject,

    /// A field is present with a shape that cannot be read.
    #[error("field `{field}` has the wrong type (expected {expected})")]
    FieldType {
        field: String,
        expected: &'static str,
    },

    /// The client identity is not a UUID.
    #[error("invalid client identity `{value}`: {source}")]
    InvalidIdentity {
        value: String,
        #[source]
        source: uuid::Error,
    },

    /// A chain link carries no usable `exp` claim.
    #[error("unsupported expiry time format in chain link {index}")]
    UnsupportedExpiry { index: usize },
}

/// Errors while handling public key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The key is not valid base64.
    #[error("public key is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// The key bytes are not a P-384 `SubjectPublicKeyInfo`.
    #[error("failed to parse public key: {0}")]
    InvalidPublicKey(String),

    /// Failed to generate or load a signing key.
    #[error("failed to parse private key: {0}")]
    InvalidPrivateKey(String),

    /// IO error (reading a key file).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
