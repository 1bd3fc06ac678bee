//! `loginchain inspect` - Decode a login buffer and print its credentials.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::Context;
use loginchain_auth::{CredentialSnapshot, LoginChainData, LoginPolicy};

/// Decode the buffer at `path` and print the snapshot.
pub fn run(path: &Path, json: bool, policy: &LoginPolicy) -> anyhow::Result<()> {
    let buffer =
        fs::read(path).with_context(|| format!("Failed to read login buffer: {}", path.display()))?;
    let snapshot = CredentialSnapshot::from_buffer(&buffer, policy)
        .with_context(|| format!("Failed to decode login buffer: {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render(&snapshot));
    }
    Ok(())
}

fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or("(none)")
}

/// Human-readable summary of a snapshot.
pub fn render(snapshot: &CredentialSnapshot) -> String {
    let mut out = String::new();

    if snapshot.is_authenticated() {
        out.push_str("✔ Authenticated\n");
    } else {
        out.push_str("✖ Not authenticated\n");
    }
    if let Some(rejection) = snapshot.verdict().rejection() {
        let _ = writeln!(out, "  Chain: {rejection}");
    }
    if snapshot.is_forwarded() {
        let _ = writeln!(out, "  Forwarded by: {}", or_none(snapshot.waterdog_ip()));
    }

    out.push_str("\nIdentity:\n");
    let _ = writeln!(out, "  Name: {}", or_none(snapshot.username()));
    let _ = writeln!(
        out,
        "  UUID: {}",
        snapshot
            .client_uuid()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    let _ = writeln!(out, "  XUID: {}", or_none(snapshot.xuid()));

    out.push_str("\nDevice:\n");
    let _ = writeln!(out, "  Model: {}", snapshot.device_model());
    let _ = writeln!(out, "  OS: {}", snapshot.device_os());
    let _ = writeln!(out, "  Game version: {}", snapshot.game_version());
    let _ = writeln!(out, "  Language: {}", snapshot.language_code());
    let _ = writeln!(out, "  Server address: {}", snapshot.server_address());
    let _ = writeln!(out, "  UI profile: {:?}", snapshot.ui_profile());
    out
}
