//! `loginchain authority` - Show the authority key chains are checked against.

use loginchain_auth::{ChainKey, LoginPolicy};

/// Print the resolved authority key and its fingerprint.
pub fn run(policy: &LoginPolicy) -> anyhow::Result<()> {
    let key = policy.authority();
    let builtin = ChainKey::mojang()?;

    println!("Authority key:");
    println!("{}", key.to_base64()?);
    println!();
    println!("Fingerprint (SHA-256): {}", key.fingerprint()?);
    if *key == builtin {
        println!("Source: built-in Mojang key");
    } else {
        println!("Source: configuration");
    }
    println!("Trust forwarded identities: {}", policy.trusts_forwarding());
    println!("Max segment size: {} bytes", policy.max_segment_len());
    Ok(())
}
