//! # loginchain-core
//!
//! Configuration shared across the loginchain crates.
//!
//! The login verifier itself is pure and takes everything it needs as
//! explicit arguments. This crate only describes where those values come
//! from: the authority key that anchors a login chain, whether a fronting
//! proxy is allowed to vouch for a player's identity, and the size ceiling
//! applied to each segment of the login buffer.

// Configuration types shared across all loginchain crates
pub mod config;

pub use config::{
    AuthorityConfig, ConfigError, DEFAULT_MAX_SEGMENT_LEN, ForwardingConfig, LimitsConfig,
    LoginConfig,
};
