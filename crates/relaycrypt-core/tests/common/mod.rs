//! Shared fixtures for integration tests.

use relaycrypt_core::{AsymmetricKey, DEFAULT_KEY_BITS};
use std::sync::OnceLock;

/// One 1024-bit identity key per test binary. Key generation dominates test
/// time otherwise.
pub fn identity_key() -> AsymmetricKey {
    static KEY: OnceLock<AsymmetricKey> = OnceLock::new();
    KEY.get_or_init(|| {
        AsymmetricKey::generate(DEFAULT_KEY_BITS).expect("identity key generation should succeed")
    })
    .clone()
}
