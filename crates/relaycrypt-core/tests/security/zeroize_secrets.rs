//! Fixed-size secrets clear in place, and secret-holding types run drop glue.

use relaycrypt_core::{AsymmetricKey, DhContext, SecretBuffer, SecretBytes, SymmetricKey};
use zeroize::Zeroize;

#[test]
fn secret_bytes_zeroize_clears_contents() {
    let mut key = SecretBytes::new([0xAB; 32]);
    assert!(key.expose().iter().all(|&b| b == 0xAB));
    key.zeroize();
    assert!(key.expose().iter().all(|&b| b == 0));
}

#[test]
fn secret_holders_need_drop() {
    assert!(std::mem::needs_drop::<SecretBuffer>());
    assert!(std::mem::needs_drop::<SecretBytes<16>>());
    assert!(std::mem::needs_drop::<SymmetricKey>());
    assert!(std::mem::needs_drop::<DhContext>());
    assert!(std::mem::needs_drop::<AsymmetricKey>());
}

#[test]
fn consumed_dh_context_still_derives() {
    let mut a = DhContext::new();
    let mut b = DhContext::new();
    let a_pub = a.public_value(128).expect("public value");
    let b_pub = b.public_value(128).expect("public value");
    let sa = a.compute_shared_secret(&b_pub, 32).expect("complete");
    let sb = b.compute_shared_secret(&a_pub, 32).expect("complete");
    assert_eq!(sa.expose(), sb.expose());
    assert!(sa.expose().iter().any(|&x| x != 0));
}
