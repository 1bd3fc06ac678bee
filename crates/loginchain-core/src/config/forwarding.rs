//! Trusted-proxy identity forwarding configuration.

use serde::{Deserialize, Serialize};

/// Whether a fronting proxy may vouch for the identity of its players.
///
/// Proxies such as Waterdog authenticate the client themselves and forward
/// the result in the client data token (`Waterdog_XUID`, `Waterdog_IP`).
/// Only enable this when the server is reachable exclusively through such a
/// proxy; otherwise any client can claim any XUID.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ForwardingConfig {
    /// Accept forwarded identities as authenticated.
    #[serde(default)]
    pub trusted: bool,
}
