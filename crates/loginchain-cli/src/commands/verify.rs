//! `loginchain verify` - Run the chain verifier over a chain JSON file.

use std::fs;
use std::path::Path;

use anyhow::Context;
use loginchain_auth::{LoginPolicy, Verdict, parse_chain_json};

/// Verify the chain at `path`, returning the verdict.
pub fn check(path: &Path, policy: &LoginPolicy) -> anyhow::Result<Verdict> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read chain file: {}", path.display()))?;
    let chain = parse_chain_json(&bytes)
        .with_context(|| format!("Failed to parse chain file: {}", path.display()))?;
    let verdict = policy.verifier().verify_now(&chain)?;
    Ok(verdict)
}

/// Verify and print the outcome. Returns whether the chain authenticated.
pub fn run(path: &Path, policy: &LoginPolicy) -> anyhow::Result<bool> {
    match check(path, policy)? {
        Verdict::Authenticated => {
            println!("✔ Chain is valid");
            Ok(true)
        }
        Verdict::Rejected(rejection) => {
            println!("✖ Chain verification failed: {rejection}");
            Ok(false)
        }
    }
}
