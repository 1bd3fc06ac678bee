//! Login chain verification.
//!
//! The chain is walked in order. Each link names its signer in the `x5u`
//! header and declares, in `identityPublicKey`, the key that must sign the
//! next link. The first link is trusted on first use. The chain is
//! authenticated only if some link was signed by the authority key, and at
//! most one further link follows that one.

use chrono::{DateTime, Utc};
use p384::ecdsa::signature::Verifier;
use p384::ecdsa::{Signature, VerifyingKey};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::LoginError;
use crate::field;
use crate::keys::ChainKey;
use crate::token::SignedToken;

/// The only signature algorithm accepted on chain links.
pub const CHAIN_ALGORITHM: &str = "ES384";

/// Why a chain was not authenticated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("the chain is empty")]
    EmptyChain,

    #[error("link {index} is malformed: {reason}")]
    MalformedLink { index: usize, reason: String },

    #[error("link {index} has no x5u header")]
    MissingCertificateUrl { index: usize },

    #[error("link {index} uses unsupported algorithm {alg:?}")]
    UnsupportedAlgorithm { index: usize, alg: Option<String> },

    #[error("link {index} is not signed by the key declared by the previous link")]
    KeyDiscontinuity { index: usize },

    #[error("link {index} has an invalid signature")]
    BadSignature { index: usize },

    #[error("link {index} follows the terminal link")]
    TrailingLinks { index: usize },

    #[error("link {index} expired at {expires_at}")]
    Expired { index: usize, expires_at: i64 },

    #[error("link {index} declares no identityPublicKey")]
    MissingIdentityKey { index: usize },

    #[error("no link is signed by the authority key")]
    NoAuthorityAnchor,
}

/// Outcome of verifying a login chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Authenticated,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// The rejection reason, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Authenticated => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}

/// Why the walk stopped early.
enum Halt {
    Reject(Rejection),
    Fail(LoginError),
}

impl From<Rejection> for Halt {
    fn from(rejection: Rejection) -> Self {
        Self::Reject(rejection)
    }
}

fn malformed(index: usize, err: impl std::fmt::Display) -> Halt {
    Halt::Reject(Rejection::MalformedLink {
        index,
        reason: err.to_string(),
    })
}

/// Verifies login chains against a fixed authority key.
#[derive(Debug, Clone)]
pub struct ChainVerifier {
    authority: ChainKey,
}

impl ChainVerifier {
    pub fn new(authority: ChainKey) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> &ChainKey {
        &self.authority
    }

    /// Verify `chain` against the current time.
    pub fn verify_now(&self, chain: &[String]) -> Result<Verdict, LoginError> {
        self.verify(chain, Utc::now())
    }

    /// Verify `chain` as of `now`.
    ///
    /// Signature, key, expiry and shape problems produce
    /// [`Verdict::Rejected`]. Only a link whose `exp` claim is missing or not
    /// an integer is a hard error.
    pub fn verify(&self, chain: &[String], now: DateTime<Utc>) -> Result<Verdict, LoginError> {
        match self.walk(chain, now.timestamp()) {
            Ok(()) => {
                trace!(links = chain.len(), "login chain authenticated");
                Ok(Verdict::Authenticated)
            }
            Err(Halt::Reject(rejection)) => {
                debug!(links = chain.len(), %rejection, "login chain rejected");
                Ok(Verdict::Rejected(rejection))
            }
            Err(Halt::Fail(err)) => Err(err),
        }
    }

    fn walk(&self, chain: &[String], now: i64) -> Result<(), Halt> {
        if chain.is_empty() {
            return Err(Rejection::EmptyChain.into());
        }

        let mut last_key: Option<ChainKey> = None;
        let mut anchored = false;

        for (index, raw) in chain.iter().enumerate() {
            let token = SignedToken::parse(raw).map_err(|e| malformed(index, e))?;

            let x5u = token
                .certificate_url()
                .map_err(|e| malformed(index, e))?
                .ok_or(Rejection::MissingCertificateUrl { index })?;
            let link_key = ChainKey::from_base64(&x5u).map_err(|e| malformed(index, e))?;

            let signer = match last_key.take() {
                // First key is self-signed
                None => link_key,
                Some(expected) if expected == link_key => expected,
                Some(_) => return Err(Rejection::KeyDiscontinuity { index }.into()),
            };

            match token.algorithm().map_err(|e| malformed(index, e))? {
                Some(alg) if alg == CHAIN_ALGORITHM => {}
                alg => return Err(Rejection::UnsupportedAlgorithm { index, alg }.into()),
            }

            if !signature_matches(&signer, &token) {
                return Err(Rejection::BadSignature { index }.into());
            }

            if anchored {
                return if index + 1 == chain.len() {
                    Ok(())
                } else {
                    Err(Rejection::TrailingLinks { index }.into())
                };
            }

            let payload = token.payload().map_err(|e| malformed(index, e))?;

            let expires_at = field::optional::<i64>(&payload, "exp")
                .ok()
                .flatten()
                .ok_or(Halt::Fail(LoginError::UnsupportedExpiry { index }))?;
            if expires_at < now {
                return Err(Rejection::Expired { index, expires_at }.into());
            }

            if signer == self.authority {
                anchored = true;
            }

            let next_key = field::optional::<String>(&payload, "identityPublicKey")
                .ok()
                .flatten()
                .ok_or(Rejection::MissingIdentityKey { index })?;
            last_key = Some(ChainKey::from_base64(&next_key).map_err(|e| malformed(index, e))?);

            trace!(index, anchored, "chain link accepted");
        }

        if anchored {
            Ok(())
        } else {
            Err(Rejection::NoAuthorityAnchor.into())
        }
    }
}

fn signature_matches(key: &ChainKey, token: &SignedToken<'_>) -> bool {
    let Ok(bytes) = token.signature() else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(&bytes) else {
        return false;
    };
    VerifyingKey::from(key.public_key())
        .verify(token.signing_input(), &signature)
        .is_ok()
}

#[derive(Debug, Deserialize)]
struct ChainEnvelope {
    #[serde(default)]
    chain: Option<Vec<String>>,
}

/// Parse the chain segment (`{"chain": [token, ...]}`) into its tokens.
///
/// A blank segment, a missing `chain` key, or `"chain": null` yield an empty
/// chain. Anything that is not JSON of that shape is an error.
pub fn parse_chain_json(bytes: &[u8]) -> Result<Vec<String>, LoginError> {
    let text = std::str::from_utf8(bytes).map_err(|source| LoginError::InvalidUtf8 {
        segment: "chain",
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let envelope: ChainEnvelope = serde_json::from_str(text).map_err(LoginError::MalformedChain)?;
    Ok(envelope.chain.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ChainFixture, LinkKey};
    use chrono::Duration;
    use serde_json::json;

    fn verify(fixture: &ChainFixture, chain: &[String]) -> Verdict {
        fixture.verifier().verify_now(chain).unwrap()
    }

    #[test]
    fn test_full_chain_authenticates() {
        let fixture = ChainFixture::new();
        assert_eq!(verify(&fixture, &fixture.chain()), Verdict::Authenticated);
    }

    #[test]
    fn test_empty_chain_is_rejected() {
        let fixture = ChainFixture::new();
        assert_eq!(
            verify(&fixture, &[]),
            Verdict::Rejected(Rejection::EmptyChain)
        );
    }

    #[test]
    fn test_single_self_signed_link_never_authenticates() {
        let fixture = ChainFixture::new();
        let verdict = verify(&fixture, &[fixture.client_link()]);
        assert_eq!(verdict, Verdict::Rejected(Rejection::NoAuthorityAnchor));
    }

    #[test]
    fn test_single_link_signed_by_authority_authenticates() {
        let fixture = ChainFixture::new();
        let link = fixture.authority.sign(
            &fixture.authority.public_base64(),
            &json!({
                "exp": fixture.expires_at,
                "identityPublicKey": fixture.client.public_base64(),
            }),
        );
        assert_eq!(verify(&fixture, &[link]), Verdict::Authenticated);
    }

    #[test]
    fn test_chain_ending_at_authority_link_authenticates() {
        let fixture = ChainFixture::new();
        let chain = vec![fixture.client_link(), fixture.authority_link()];
        assert_eq!(verify(&fixture, &chain), Verdict::Authenticated);
    }

    #[test]
    fn test_key_discontinuity_fails() {
        let fixture = ChainFixture::new();
        let stranger = LinkKey::generate().unwrap();
        // Link 0 hands off to a key the authority link does not carry.
        let first = fixture.client.sign(
            &fixture.client.public_base64(),
            &json!({
                "exp": fixture.expires_at,
                "identityPublicKey": stranger.public_base64(),
            }),
        );
        let chain = vec![first, fixture.authority_link(), fixture.identity_link()];
        assert_eq!(
            verify(&fixture, &chain),
            Verdict::Rejected(Rejection::KeyDiscontinuity { index: 1 })
        );
    }

    #[test]
    fn test_forged_signature_fails() {
        let fixture = ChainFixture::new();
        let forger = LinkKey::generate().unwrap();
        // Claims the authority key in x5u but is signed by someone else.
        let forged = forger.sign(
            &fixture.authority.public_base64(),
            &json!({
                "exp": fixture.expires_at,
                "identityPublicKey": fixture.intermediate.public_base64(),
            }),
        );
        let chain = vec![fixture.client_link(), forged, fixture.identity_link()];
        assert_eq!(
            verify(&fixture, &chain),
            Verdict::Rejected(Rejection::BadSignature { index: 1 })
        );
    }

    #[test]
    fn test_tampered_payload_fails() {
        let fixture = ChainFixture::new();
        let mut chain = fixture.chain();
        let parts: Vec<&str> = chain[2].split('.').collect();
        let tampered_payload = crate::token::encode_segment(
            json!({"extraData": {"displayName": "Mallory"}, "identityPublicKey": "x"})
                .to_string()
                .as_bytes(),
        );
        chain[2] = format!("{}.{}.{}", parts[0], tampered_payload, parts[2]);
        assert_eq!(
            verify(&fixture, &chain),
            Verdict::Rejected(Rejection::BadSignature { index: 2 })
        );
    }

    #[test]
    fn test_expiry_in_past_fails() {
        let mut fixture = ChainFixture::new();
        fixture.expires_at = (Utc::now() - Duration::hours(1)).timestamp();
        assert_eq!(
            verify(&fixture, &fixture.chain()),
            Verdict::Rejected(Rejection::Expired {
                index: 0,
                expires_at: fixture.expires_at
            })
        );
    }

    #[test]
    fn test_expiry_checked_against_given_clock() {
        let fixture = ChainFixture::new();
        let chain = fixture.chain();
        let verifier = fixture.verifier();

        let before = DateTime::from_timestamp(fixture.expires_at - 1, 0).unwrap();
        let after = DateTime::from_timestamp(fixture.expires_at + 1, 0).unwrap();
        assert!(verifier.verify(&chain, before).unwrap().is_authenticated());
        assert!(!verifier.verify(&chain, after).unwrap().is_authenticated());
    }

    #[test]
    fn test_link_after_terminal_link_fails() {
        let fixture = ChainFixture::new();
        let mut chain = fixture.chain();
        let extra = fixture.client.sign(
            &fixture.client.public_base64(),
            &json!({"exp": fixture.expires_at, "identityPublicKey": fixture.client.public_base64()}),
        );
        chain.push(extra);
        assert_eq!(
            verify(&fixture, &chain),
            Verdict::Rejected(Rejection::TrailingLinks { index: 2 })
        );
    }

    #[test]
    fn test_missing_x5u_fails() {
        let fixture = ChainFixture::new();
        let link = fixture.client.sign_with_header(
            &json!({"alg": "ES384"}),
            &json!({"exp": fixture.expires_at}),
        );
        assert_eq!(
            verify(&fixture, &[link]),
            Verdict::Rejected(Rejection::MissingCertificateUrl { index: 0 })
        );
    }

    #[test]
    fn test_unsupported_algorithm_fails() {
        let fixture = ChainFixture::new();
        let link = fixture.client.sign_with_header(
            &json!({"alg": "ES256", "x5u": fixture.client.public_base64()}),
            &json!({"exp": fixture.expires_at}),
        );
        assert_eq!(
            verify(&fixture, &[link]),
            Verdict::Rejected(Rejection::UnsupportedAlgorithm {
                index: 0,
                alg: Some("ES256".to_string())
            })
        );
    }

    #[test]
    fn test_missing_identity_public_key_fails() {
        let fixture = ChainFixture::new();
        let link = fixture.client.sign(
            &fixture.client.public_base64(),
            &json!({"exp": fixture.expires_at}),
        );
        assert_eq!(
            verify(&fixture, &[link]),
            Verdict::Rejected(Rejection::MissingIdentityKey { index: 0 })
        );
    }

    #[test]
    fn test_unsupported_expiry_is_hard_error() {
        let fixture = ChainFixture::new();
        let link = fixture.client.sign(
            &fixture.client.public_base64(),
            &json!({"exp": "tomorrow", "identityPublicKey": fixture.authority.public_base64()}),
        );
        let err = fixture.verifier().verify_now(&[link]).unwrap_err();
        assert!(matches!(err, LoginError::UnsupportedExpiry { index: 0 }));
    }

    #[test]
    fn test_garbage_link_is_rejected_not_error() {
        let fixture = ChainFixture::new();
        let verdict = verify(&fixture, &["not-a-token".to_string()]);
        assert!(matches!(
            verdict,
            Verdict::Rejected(Rejection::MalformedLink { index: 0, .. })
        ));
    }

    #[test]
    fn test_parse_chain_json() {
        let chain = parse_chain_json(br#"{"chain": ["a.b.c", "d.e.f"]}"#).unwrap();
        assert_eq!(chain, vec!["a.b.c", "d.e.f"]);
        assert!(parse_chain_json(b"{}").unwrap().is_empty());
        assert!(parse_chain_json(br#"{"chain": null}"#).unwrap().is_empty());
        assert!(parse_chain_json(b"  ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_chain_json_rejects_garbage() {
        assert!(matches!(
            parse_chain_json(b"{not json"),
            Err(LoginError::MalformedChain(_))
        ));
        assert!(matches!(
            parse_chain_json(br#"{"chain": "a.b.c"}"#),
            Err(LoginError::MalformedChain(_))
        ));
    }
}
