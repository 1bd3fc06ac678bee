//! CLI command implementations.

pub mod authority;
pub mod inspect;
pub mod pack;
pub mod verify;
