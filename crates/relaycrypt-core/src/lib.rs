//! `relaycrypt-core`: Handshake and envelope cryptography for relay channels.
//!
//! Hybrid RSA/AES-CTR envelopes, Diffie-Hellman key agreement with public
//! value validation, counter-mode key expansion, and iterated passphrase
//! stretching, built over RSA, AES-128-CTR, and SHA-1 primitives.
//!
//! No network, no async, no global mutable state beyond the lazily built
//! DH group parameters.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod cipher;
pub mod digest;

pub mod asymmetric;

pub mod kdf;
pub mod s2k;

pub mod dh;

pub mod hybrid;

pub use asymmetric::{
    is_fingerprint_syntax, AsymmetricKey, PaddingMode, DEFAULT_KEY_BITS, FINGERPRINT_LEN,
    HEX_DIGEST_LEN,
};
pub use cipher::{SymmetricKey, CIPHER_IV_LEN, CIPHER_KEY_LEN};
pub use dh::{DhContext, DhParams, DH_BYTES, DH_PRIVATE_KEY_BITS};
pub use digest::{digest, hmac_sha1, DigestState, DIGEST_LEN};
pub use error::CryptoError;
pub use hybrid::{hybrid_decrypt, hybrid_encrypt, Envelope};
pub use kdf::{expand_key_material, MAX_EXPANSION_LEN};
pub use memory::{fill_random, random_below, random_bytes, SecretBuffer, SecretBytes};
pub use rsa::BigUint;
pub use s2k::{secret_to_key, S2kSpecifier, DEFAULT_S2K_COST, S2K_SALT_LEN, S2K_SPECIFIER_LEN};
