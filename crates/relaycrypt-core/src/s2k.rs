//! Iterated and salted passphrase stretching (RFC 2440 style S2K).
//!
//! This module provides:
//! - [`S2kSpecifier`]: salt + cost byte, stored alongside the hashed secret
//! - [`secret_to_key`]: derive up to [`DIGEST_LEN`] key bytes from a passphrase
//!
//! The cost byte `c` decodes to a byte count
//! `(16 + (c & 15)) << ((c >> 4) + 6)`. Exactly that many bytes of the
//! repeating stream `salt || passphrase || salt || passphrase || ...` are
//! fed to SHA-1. The last repetition may stop mid-block.

use crate::digest::{DigestState, DIGEST_LEN};
use crate::error::CryptoError;
use crate::memory::{fill_random, SecretBuffer};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const S2K_SALT_LEN: usize = 8;

/// Serialized specifier length: salt followed by the cost byte.
pub const S2K_SPECIFIER_LEN: usize = S2K_SALT_LEN + 1;

/// Cost byte used for newly hashed passphrases (65 536 bytes hashed).
pub const DEFAULT_S2K_COST: u8 = 0x60;

const EXPBIAS: u32 = 6;

/// Salt and cost parameters for [`secret_to_key`].
///
/// Stored next to the derived key so the derivation can be repeated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct S2kSpecifier {
    /// Random salt.
    pub salt: [u8; S2K_SALT_LEN],
    /// Encoded work factor.
    pub cost: u8,
}

impl S2kSpecifier {
    /// New specifier with a random salt.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Random` if the CSPRNG fails.
    pub fn generate(cost: u8) -> Result<Self, CryptoError> {
        let mut salt = [0u8; S2K_SALT_LEN];
        fill_random(&mut salt)?;
        Ok(Self { salt, cost })
    }

    /// Number of bytes fed into the digest for this cost byte.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn byte_count(&self) -> usize {
        // Largest case is 31 << 21.
        (16 + (self.cost & 0x0F) as usize) << ((self.cost >> 4) as u32 + EXPBIAS)
    }

    /// Wire form: `salt || cost`.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; S2K_SPECIFIER_LEN] {
        let mut out = [0u8; S2K_SPECIFIER_LEN];
        out[..S2K_SALT_LEN].copy_from_slice(&self.salt);
        out[S2K_SALT_LEN] = self.cost;
        out
    }

    /// Parse the wire form.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if `bytes` is not exactly
    /// [`S2K_SPECIFIER_LEN`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let Ok(raw) = <[u8; S2K_SPECIFIER_LEN]>::try_from(bytes) else {
            return Err(CryptoError::InvalidInput(format!(
                "S2K specifier must be {S2K_SPECIFIER_LEN} bytes, got {}",
                bytes.len()
            )));
        };
        let mut salt = [0u8; S2K_SALT_LEN];
        salt.copy_from_slice(&raw[..S2K_SALT_LEN]);
        Ok(Self {
            salt,
            cost: raw[S2K_SALT_LEN],
        })
    }
}

/// Stretch `passphrase` into `key_out_len` bytes using `spec`.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if `key_out_len` exceeds
/// [`DIGEST_LEN`]; this function never expands past one digest block.
pub fn secret_to_key(
    passphrase: &[u8],
    spec: &S2kSpecifier,
    key_out_len: usize,
) -> Result<SecretBuffer, CryptoError> {
    if key_out_len > DIGEST_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "S2K output of {key_out_len} bytes requested (maximum {DIGEST_LEN})"
        )));
    }

    let mut block = Zeroizing::new(Vec::with_capacity(
        S2K_SALT_LEN.saturating_add(passphrase.len()),
    ));
    block.extend_from_slice(&spec.salt);
    block.extend_from_slice(passphrase);

    let mut state = DigestState::new();
    let mut remaining = spec.byte_count();
    while remaining > 0 {
        let take = remaining.min(block.len());
        state.update(&block[..take]);
        remaining = remaining.saturating_sub(take);
    }

    let key = Zeroizing::new(state.peek(key_out_len));
    Ok(SecretBuffer::new(&key))
}
