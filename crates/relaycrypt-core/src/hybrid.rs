//! Hybrid public-key envelope for messages longer than one RSA block.
//!
//! Wire format (no length or mode tag; both ends agree on key and padding):
//!
//! ```text
//! [ key_size bytes: RSA(K || plaintext prefix) ][ AES-CTR_K(rest of plaintext) ]
//! ```
//!
//! Short messages skip the symmetric part entirely and are a single RSA
//! block. The decrypting side tells the two forms apart by length alone.

use crate::asymmetric::{AsymmetricKey, PaddingMode};
use crate::cipher::{SymmetricKey, CIPHER_KEY_LEN};
use crate::error::CryptoError;
use crate::memory::{SecretBuffer, SecretBytes};
use zeroize::Zeroizing;

/// Borrowed view of a ciphertext split at the modulus boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Envelope<'a> {
    /// Asymmetric block (at most `key_size` bytes).
    pub header: &'a [u8],
    /// Stream-cipher body; empty for single-block ciphertexts.
    pub body: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// Split `ciphertext` after its first `key_size` bytes.
    #[must_use]
    pub fn split(ciphertext: &'a [u8], key_size: usize) -> Self {
        let (header, body) = ciphertext.split_at(key_size.min(ciphertext.len()));
        Self { header, body }
    }

    /// Returns `true` if the ciphertext carries a symmetric body.
    #[must_use]
    pub const fn is_hybrid(&self) -> bool {
        !self.body.is_empty()
    }
}

/// Encrypt `plaintext` to `key`, falling back to the hybrid construction
/// when it does not fit one block or when `force_hybrid` is set.
///
/// An empty plaintext always uses the single-block form. When forced, at
/// least one plaintext byte is left for the stream body so the result is
/// recognisably hybrid.
///
/// # Errors
///
/// - `CryptoError::InvalidInput` if `mode` is [`PaddingMode::None`] and the
///   plaintext is shorter than the modulus
/// - `CryptoError::Random` if the session key cannot be generated
/// - `CryptoError::Asymmetric` / `CryptoError::Cipher` from the underlying
///   operations
pub fn hybrid_encrypt(
    key: &AsymmetricKey,
    plaintext: &[u8],
    mode: PaddingMode,
    force_hybrid: bool,
) -> Result<Vec<u8>, CryptoError> {
    let key_size = key.size();
    let overhead = mode.overhead();

    if mode == PaddingMode::None && plaintext.len() < key_size {
        return Err(CryptoError::InvalidInput(format!(
            "unpadded encryption needs at least {key_size} bytes, got {}",
            plaintext.len()
        )));
    }

    let fits = plaintext.len().saturating_add(overhead) <= key_size;
    if plaintext.is_empty() || (fits && !force_hybrid) {
        tracing::debug!(len = plaintext.len(), ?mode, "single-block envelope");
        return key.public_encrypt(plaintext, mode);
    }

    let Some(room) = key_size
        .checked_sub(overhead)
        .and_then(|n| n.checked_sub(CIPHER_KEY_LEN))
    else {
        return Err(CryptoError::InvalidInput(format!(
            "{key_size}-byte key leaves no room for a session key under {mode:?} padding"
        )));
    };
    let prefix_len = if force_hybrid {
        room.min(plaintext.len().saturating_sub(1))
    } else {
        room
    };
    tracing::debug!(len = plaintext.len(), prefix_len, ?mode, "hybrid envelope");

    let mut session = SecretBytes::<CIPHER_KEY_LEN>::random()?;
    if mode == PaddingMode::None {
        // Keeps K || prefix numerically below the modulus.
        session.expose_mut()[0] &= 0x7F;
    }

    let (prefix, rest) = plaintext.split_at(prefix_len);
    let mut header = Zeroizing::new(Vec::with_capacity(CIPHER_KEY_LEN.saturating_add(prefix_len)));
    header.extend_from_slice(session.expose());
    header.extend_from_slice(prefix);

    let mut out = key.public_encrypt(&header, mode)?;
    if out.len() != key_size {
        return Err(CryptoError::Asymmetric(format!(
            "RSA block is {} bytes, expected {key_size}",
            out.len()
        )));
    }

    let mut cipher = SymmetricKey::from_secret(session);
    out.extend_from_slice(rest);
    cipher.apply_keystream(&mut out[key_size..])?;
    Ok(out)
}

/// Reverse [`hybrid_encrypt`].
///
/// # Errors
///
/// - `CryptoError::NotPrivateKey` for a public-only key
/// - `CryptoError::Asymmetric` if the RSA block does not decrypt
/// - `CryptoError::MalformedCiphertext` if the recovered header is too short
///   to hold a session key
pub fn hybrid_decrypt(
    key: &AsymmetricKey,
    ciphertext: &[u8],
    mode: PaddingMode,
) -> Result<SecretBuffer, CryptoError> {
    let envelope = Envelope::split(ciphertext, key.size());
    if !envelope.is_hybrid() {
        return key
            .private_decrypt(envelope.header, mode)
            .map(SecretBuffer::from_vec);
    }

    let header = Zeroizing::new(key.private_decrypt(envelope.header, mode)?);
    if header.len() < CIPHER_KEY_LEN {
        tracing::debug!(len = header.len(), "hybrid header too short for a session key");
        return Err(CryptoError::MalformedCiphertext(format!(
            "decrypted header is {} bytes, need at least {CIPHER_KEY_LEN}",
            header.len()
        )));
    }

    let (session, prefix) = header.split_at(CIPHER_KEY_LEN);
    let mut cipher = SymmetricKey::new(session)?;

    let mut plaintext =
        Zeroizing::new(Vec::with_capacity(prefix.len().saturating_add(envelope.body.len())));
    plaintext.extend_from_slice(prefix);
    let start = plaintext.len();
    plaintext.extend_from_slice(envelope.body);
    cipher.apply_keystream(&mut plaintext[start..])?;
    Ok(SecretBuffer::new(&plaintext))
}
