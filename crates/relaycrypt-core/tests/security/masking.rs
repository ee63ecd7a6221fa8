//! `Debug`/`Display` output of every type holding secrets is masked.

use relaycrypt_core::{
    AsymmetricKey, DhContext, DigestState, SecretBuffer, SecretBytes, SymmetricKey,
};

#[test]
fn secret_containers_are_masked() {
    let buf = SecretBuffer::new(b"onion skin");
    assert_eq!(format!("{buf:?}"), "SecretBuffer(***)");
    assert_eq!(format!("{buf}"), "SecretBuffer(***)");

    let bytes = SecretBytes::new([0x41u8; 16]);
    assert_eq!(format!("{bytes:?}"), "SecretBytes<16>(***)");
    assert!(!format!("{bytes}").contains("65"));
}

#[test]
fn cipher_and_digest_state_are_masked() {
    let key = SymmetricKey::new(&[0x41; 16]).expect("key should be accepted");
    assert_eq!(format!("{key:?}"), "SymmetricKey(***)");

    let mut state = DigestState::new();
    state.update(b"secret prefix");
    assert_eq!(format!("{state:?}"), "DigestState(***)");
}

#[test]
fn dh_context_hides_exponent() {
    let mut ctx = DhContext::new();
    let before = format!("{ctx:?}");
    ctx.generate_key_pair().expect("generate should succeed");
    let after = format!("{ctx:?}");
    assert!(before.contains("has_key_pair: false"));
    assert!(after.contains("has_key_pair: true"));
    assert!(after.len() < 64);
}

#[test]
fn asymmetric_key_debug_has_no_components() {
    let key = AsymmetricKey::generate(512).expect("keygen should succeed");
    let debug = format!("{key:?}");
    assert!(debug.starts_with("AsymmetricKey {"));
    assert!(!debug.contains("BigUint"));
    assert!(debug.len() < 64);
}
