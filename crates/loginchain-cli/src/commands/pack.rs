//! `loginchain pack` - Build a login buffer from its two segments.

use std::fs;
use std::path::Path;

use anyhow::Context;
use loginchain_auth::{LoginFrame, parse_chain_json};

/// Write a login buffer made of the chain JSON at `chain` and the client data
/// token at `skin`.
pub fn run(chain: &Path, skin: &Path, output: &Path) -> anyhow::Result<()> {
    let chain_bytes =
        fs::read(chain).with_context(|| format!("Failed to read chain file: {}", chain.display()))?;
    let links = parse_chain_json(&chain_bytes)
        .with_context(|| format!("Failed to parse chain file: {}", chain.display()))?;

    let skin_token = fs::read_to_string(skin)
        .with_context(|| format!("Failed to read client data token: {}", skin.display()))?;
    let skin_token = skin_token.trim();

    let buffer = LoginFrame::encode(&chain_bytes, skin_token.as_bytes())?;
    fs::write(output, &buffer)
        .with_context(|| format!("Failed to write login buffer: {}", output.display()))?;

    println!("✔ Login buffer written to: {}", output.display());
    println!("  Chain links: {}", links.len());
    println!("  Size: {} bytes", buffer.len());
    Ok(())
}
