//! End-to-end login buffer decoding.

use chrono::{Duration, Utc};
use loginchain_auth::testing::{ChainFixture, LinkKey, login_buffer, unsigned_token};
use loginchain_auth::{
    CredentialSnapshot, LoginChainData, LoginError, LoginPolicy, Rejection, UiProfile, Verdict,
};
use serde_json::json;

fn decode(buffer: &[u8], policy: &LoginPolicy) -> CredentialSnapshot {
    CredentialSnapshot::from_buffer(buffer, policy).expect("buffer decodes")
}

fn empty_skin() -> String {
    unsigned_token(&json!({}))
}

#[test]
fn test_self_signed_single_link_is_not_authenticated() {
    let fixture = ChainFixture::new();
    let buffer = login_buffer(&[fixture.client_link()], &empty_skin());

    let snapshot = decode(&buffer, &fixture.policy());
    assert!(!snapshot.is_authenticated());
    assert_eq!(
        snapshot.verdict(),
        &Verdict::Rejected(Rejection::NoAuthorityAnchor)
    );
}

#[test]
fn test_single_link_signed_by_authority_is_authenticated() {
    let fixture = ChainFixture::new();
    let link = fixture.authority.sign(
        &fixture.authority.public_base64(),
        &json!({
            "exp": fixture.expires_at,
            "identityPublicKey": fixture.client.public_base64(),
            "extraData": {"displayName": "Alex", "XUID": "1"},
        }),
    );
    let buffer = login_buffer(&[link], &empty_skin());

    let snapshot = decode(&buffer, &fixture.policy());
    assert!(snapshot.is_authenticated());
    assert_eq!(snapshot.username(), Some("Alex"));
    assert_eq!(snapshot.xuid(), Some("1"));
}

#[test]
fn test_key_continuity() {
    let fixture = ChainFixture::new();
    let stranger = LinkKey::generate().unwrap();

    let broken = fixture.client.sign(
        &fixture.client.public_base64(),
        &json!({
            "exp": fixture.expires_at,
            "identityPublicKey": stranger.public_base64(),
        }),
    );
    let buffer = login_buffer(&[broken, fixture.authority_link()], &empty_skin());
    let snapshot = decode(&buffer, &fixture.policy());
    assert_eq!(
        snapshot.verdict(),
        &Verdict::Rejected(Rejection::KeyDiscontinuity { index: 1 })
    );

    let buffer = login_buffer(
        &[fixture.client_link(), fixture.authority_link()],
        &empty_skin(),
    );
    assert!(decode(&buffer, &fixture.policy()).is_authenticated());
}

#[test]
fn test_expiry_monotonicity() {
    let mut fixture = ChainFixture::new();
    let skin = empty_skin();

    fixture.expires_at = (Utc::now() + Duration::hours(1)).timestamp();
    let fresh = login_buffer(&fixture.chain(), &skin);
    assert!(decode(&fresh, &fixture.policy()).is_authenticated());

    fixture.expires_at = (Utc::now() - Duration::hours(1)).timestamp();
    let stale = login_buffer(&fixture.chain(), &skin);
    let snapshot = decode(&stale, &fixture.policy());
    assert!(!snapshot.is_authenticated());
    assert!(matches!(
        snapshot.verdict(),
        Verdict::Rejected(Rejection::Expired { index: 0, .. })
    ));
}

#[test]
fn test_termination_after_authority_link() {
    let fixture = ChainFixture::new();
    let skin = empty_skin();

    let buffer = login_buffer(&fixture.chain(), &skin);
    assert!(decode(&buffer, &fixture.policy()).is_authenticated());

    let mut chain = fixture.chain();
    chain.push(fixture.identity_link());
    let buffer = login_buffer(&chain, &skin);
    let snapshot = decode(&buffer, &fixture.policy());
    assert!(!snapshot.is_authenticated());
    assert!(matches!(
        snapshot.verdict(),
        Verdict::Rejected(Rejection::TrailingLinks { index: 2 })
    ));
}

#[test]
fn test_tampered_chain_keeps_name_and_uuid_but_not_xuid() {
    let fixture = ChainFixture::new();
    let mut chain = fixture.chain();
    let mut parts: Vec<String> = chain[2].split('.').map(str::to_string).collect();
    parts[2] = "AAAA".to_string();
    chain[2] = parts.join(".");

    let snapshot = decode(&login_buffer(&chain, &empty_skin()), &fixture.policy());
    assert!(!snapshot.is_authenticated());
    assert_eq!(snapshot.username(), Some(ChainFixture::DISPLAY_NAME));
    assert_eq!(snapshot.client_uuid(), Some(ChainFixture::identity()));
    assert!(snapshot.xuid().is_none());
}

#[test]
fn test_size_ceiling_is_enforced_before_reading() {
    let fixture = ChainFixture::new();
    let mut buffer = 0x7fff_ffffu32.to_le_bytes().to_vec();
    buffer.extend_from_slice(b"{\"chain\":[]}");

    let err = CredentialSnapshot::from_buffer(&buffer, &fixture.policy()).unwrap_err();
    assert!(matches!(
        err,
        LoginError::SegmentTooLarge {
            segment: "chain",
            len: 0x7fff_ffff,
            ..
        }
    ));
}

#[test]
fn test_configured_ceiling() {
    let fixture = ChainFixture::new();
    let policy = fixture.policy().with_max_segment_len(64);
    let skin = unsigned_token(&json!({"CapeData": "A".repeat(128)}));

    let err = CredentialSnapshot::from_buffer(&login_buffer(&[], &skin), &policy).unwrap_err();
    assert!(matches!(err, LoginError::SegmentTooLarge { segment: "skin", .. }));
}

#[test]
fn test_empty_chain_with_minimal_skin() {
    let fixture = ChainFixture::new();
    let skin = unsigned_token(&json!({"DeviceOS": 1, "GameVersion": "1.20.10"}));

    let snapshot = decode(&login_buffer(&[], &skin), &fixture.policy());
    assert!(!snapshot.is_authenticated());
    assert!(snapshot.username().is_none());
    assert!(snapshot.client_uuid().is_none());
    assert!(snapshot.xuid().is_none());
    assert_eq!(snapshot.device_os(), 1);
    assert_eq!(snapshot.game_version(), "1.20.10");
    assert_eq!(snapshot.client_id(), 0);
    assert_eq!(snapshot.device_model(), "");
    assert_eq!(snapshot.device_id(), "");
    assert_eq!(snapshot.language_code(), "");
    assert_eq!(snapshot.current_input_mode(), 0);
    assert_eq!(snapshot.default_input_mode(), 0);
    assert_eq!(snapshot.ui_profile(), UiProfile::Classic);
    assert_eq!(snapshot.cape_data(), "");
}

#[test]
fn test_trusted_proxy_override() {
    let fixture = ChainFixture::new();
    let skin = unsigned_token(&json!({
        "Waterdog_XUID": "2535499999999999",
        "Waterdog_IP": "198.51.100.4"
    }));
    let buffer = login_buffer(&[fixture.client_link()], &skin);

    let trusted = decode(&buffer, &fixture.policy().with_forwarding(true));
    assert!(trusted.is_authenticated());
    assert!(trusted.is_forwarded());
    assert_eq!(trusted.xuid(), Some("2535499999999999"));
    assert_eq!(trusted.waterdog_ip(), Some("198.51.100.4"));
    assert!(!trusted.verdict().is_authenticated());

    let untrusted = decode(&buffer, &fixture.policy());
    assert!(!untrusted.is_authenticated());
    assert!(untrusted.xuid().is_none());
}

#[test]
fn test_wrong_field_shape_aborts_decode() {
    let fixture = ChainFixture::new();
    let skin = unsigned_token(&json!({"GuiScale": "large"}));

    let err = CredentialSnapshot::from_buffer(&login_buffer(&[], &skin), &fixture.policy())
        .unwrap_err();
    assert!(matches!(err, LoginError::FieldType { ref field, .. } if field == "GuiScale"));
}
