//! AES-128-CTR stream cipher.
//!
//! This module provides:
//! - [`SymmetricKey`]: a 16-byte key plus its running keystream
//! - [`SymmetricKey::encrypt_with_iv`] / [`SymmetricKey::decrypt_with_iv`]:
//!   random-IV framing (`iv (16 bytes) || ciphertext`)
//!
//! The counter is a 128-bit big-endian block counter. A freshly keyed
//! cipher starts at counter zero. Encryption and decryption are the same
//! keystream XOR, and every call advances the counter by the number of bytes
//! processed, so one key can encrypt a long stream in several calls.

use crate::error::CryptoError;
use crate::memory::{fill_random, SecretBuffer, SecretBytes};
use aes::Aes128;
use ctr::cipher::generic_array::GenericArray;
use ctr::cipher::{KeyIvInit, StreamCipher};
use std::fmt;
use zeroize::Zeroize;

/// AES-128 key length in bytes.
pub const CIPHER_KEY_LEN: usize = 16;

/// Counter-block (IV) length in bytes.
pub const CIPHER_IV_LEN: usize = 16;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// A symmetric key together with its keystream position.
///
/// Owned by whoever created it. The key bytes and the expanded AES schedule
/// are zeroized on drop.
pub struct SymmetricKey {
    key: SecretBytes<CIPHER_KEY_LEN>,
    stream: Aes128Ctr,
}

impl SymmetricKey {
    /// Key a fresh cipher (counter zero) from `key`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if `key` is not exactly 16 bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let mut bytes: [u8; CIPHER_KEY_LEN] = key.try_into().map_err(|_| {
            CryptoError::InvalidInput(format!(
                "invalid symmetric key length: {} bytes (expected {CIPHER_KEY_LEN})",
                key.len()
            ))
        })?;
        let secret = SecretBytes::new(bytes);
        bytes.zeroize();
        Ok(Self::from_secret(secret))
    }

    /// Generate a random single-use key, keyed at counter zero.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Random` if the CSPRNG fails.
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Self::from_secret(SecretBytes::random()?))
    }

    pub(crate) fn from_secret(key: SecretBytes<CIPHER_KEY_LEN>) -> Self {
        let stream = keystream(&key, &[0u8; CIPHER_IV_LEN]);
        Self { key, stream }
    }

    /// The raw key bytes.
    #[must_use]
    pub const fn key(&self) -> &[u8; CIPHER_KEY_LEN] {
        self.key.expose()
    }

    /// Reposition the keystream at the first byte of counter block `iv`.
    pub fn set_iv(&mut self, iv: &[u8; CIPHER_IV_LEN]) {
        self.stream = keystream(&self.key, iv);
    }

    /// XOR the next `buf.len()` keystream bytes into `buf`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Cipher` if the 128-bit counter would wrap.
    pub fn apply_keystream(&mut self, buf: &mut [u8]) -> Result<(), CryptoError> {
        self.stream
            .try_apply_keystream(buf)
            .map_err(|_| CryptoError::Cipher("keystream exhausted".into()))
    }

    /// Encrypt (or decrypt) `input` into a new vector.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Cipher` if the 128-bit counter would wrap.
    pub fn crypt(&mut self, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut out = input.to_vec();
        if let Err(e) = self.apply_keystream(&mut out) {
            out.zeroize();
            return Err(e);
        }
        Ok(out)
    }

    /// Encrypt `plaintext` under a random IV, returning `iv || ciphertext`.
    ///
    /// Leaves the counter immediately after the encrypted data.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if `plaintext` is empty, or
    /// `CryptoError::Random` if IV generation fails.
    pub fn encrypt_with_iv(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if plaintext.is_empty() {
            return Err(CryptoError::InvalidInput(
                "refusing to encrypt an empty message".into(),
            ));
        }
        let mut iv = [0u8; CIPHER_IV_LEN];
        fill_random(&mut iv)?;
        self.set_iv(&iv);

        let mut out = Vec::with_capacity(CIPHER_IV_LEN.saturating_add(plaintext.len()));
        out.extend_from_slice(&iv);
        out.extend_from_slice(plaintext);
        if let Err(e) = self.apply_keystream(&mut out[CIPHER_IV_LEN..]) {
            out.zeroize();
            return Err(e);
        }
        Ok(out)
    }

    /// Decrypt `iv || ciphertext` as produced by [`encrypt_with_iv`](Self::encrypt_with_iv).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if `data` is not longer than the IV.
    pub fn decrypt_with_iv(&mut self, data: &[u8]) -> Result<SecretBuffer, CryptoError> {
        if data.len() <= CIPHER_IV_LEN {
            return Err(CryptoError::InvalidInput(format!(
                "ciphertext too short: {} bytes (minimum {})",
                data.len(),
                CIPHER_IV_LEN.saturating_add(1)
            )));
        }
        let (iv, body) = data.split_at(CIPHER_IV_LEN);
        let mut iv_block = [0u8; CIPHER_IV_LEN];
        iv_block.copy_from_slice(iv);
        self.set_iv(&iv_block);
        Ok(SecretBuffer::from_vec(self.crypt(body)?))
    }
}

fn keystream(key: &SecretBytes<CIPHER_KEY_LEN>, iv: &[u8; CIPHER_IV_LEN]) -> Aes128Ctr {
    Aes128Ctr::new(
        GenericArray::from_slice(key.expose()),
        GenericArray::from_slice(iv),
    )
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(***)")
    }
}
