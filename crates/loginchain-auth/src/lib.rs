//! # loginchain-auth
//!
//! Login chain handling for Bedrock Edition servers.
//!
//! This crate provides functionality for:
//! - Splitting a login buffer into its chain and client data segments
//! - Verifying the ES384 chain against the authority key
//! - Extracting identity and device claims
//! - Honoring identities forwarded by a trusted proxy
//!
//! ## Login Buffer
//!
//! | Segment | Contents | Verified |
//! |---------|----------|----------|
//! | **Chain** | `{"chain": [token, ...]}` | Yes, link by link |
//! | **Client data** | One token with device metadata | No |
//!
//! ## Trust Model
//!
//! The first link is trusted on first use. Each link then names the key
//! that must sign the next one. A chain authenticates only when one link is
//! signed by the authority key (Mojang's by default) and at most one link
//! follows it.
//!
//! Display name and client UUID are reported for every login, verified or
//! not; only the XUID is withheld from an unverified chain. Callers that
//! need a trusted identity must check
//! [`LoginChainData::is_authenticated`] before using either.
//!
//! ## Example
//!
//! ```no_run
//! use loginchain_auth::{CredentialSnapshot, LoginChainData, LoginPolicy};
//!
//! # fn run(buffer: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let policy = LoginPolicy::mojang()?;
//! let snapshot = CredentialSnapshot::from_buffer(buffer, &policy)?;
//! if snapshot.is_authenticated() {
//!     println!("{:?} joined", snapshot.username());
//! }
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod claims;
pub mod error;
pub mod extract;
pub mod field;
pub mod frame;
pub mod keys;
pub mod policy;
pub mod snapshot;
pub mod token;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use chain::{CHAIN_ALGORITHM, ChainVerifier, Rejection, Verdict, parse_chain_json};
pub use claims::{DeviceClaims, IdentityClaims, UiProfile};
pub use error::{KeyError, LoginError};
pub use extract::{ClaimsExtractor, Extraction};
pub use frame::LoginFrame;
pub use keys::{ChainKey, MOJANG_PUBLIC_KEY};
pub use policy::LoginPolicy;
pub use snapshot::{CredentialSnapshot, LoginChainData};
pub use token::decode_payload;
