//! Counter-mode digest key expansion.
//!
//! Turns a short negotiated secret `K` into an arbitrary amount of key
//! material by taking the first `out_len` bytes of
//!
//! ```text
//! H(K || 0x00) || H(K || 0x01) || H(K || 0x02) || ...
//! ```
//!
//! where `H` is SHA-1. The counter is a single byte, so at most 256 blocks
//! ([`MAX_EXPANSION_LEN`] bytes) can be produced before blocks would repeat.
//! Requests beyond that are rejected rather than wrapped.

use crate::digest::{digest, DIGEST_LEN};
use crate::error::CryptoError;
use crate::memory::SecretBuffer;
use zeroize::{Zeroize, Zeroizing};

/// Number of distinct counter values (one byte).
const COUNTER_SPACE: usize = 256;

/// Largest `out_len` accepted by [`expand_key_material`].
pub const MAX_EXPANSION_LEN: usize = DIGEST_LEN * COUNTER_SPACE;

/// Expand `secret` into `out_len` bytes of key material.
///
/// Deterministic: the same `(secret, out_len)` always yields the same bytes,
/// and a shorter request is a prefix of a longer one.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if `out_len` exceeds
/// [`MAX_EXPANSION_LEN`]. No hashing happens in that case.
pub fn expand_key_material(secret: &[u8], out_len: usize) -> Result<SecretBuffer, CryptoError> {
    if out_len > MAX_EXPANSION_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "requested {out_len} bytes of key material (maximum {MAX_EXPANSION_LEN})"
        )));
    }

    // `secret || counter`; the counter byte is rewritten for each block.
    let mut input = Zeroizing::new(Vec::with_capacity(secret.len().saturating_add(1)));
    input.extend_from_slice(secret);
    input.push(0);
    let counter_pos = secret.len();

    let mut out = Zeroizing::new(Vec::with_capacity(out_len));
    for (counter, _) in (0..=u8::MAX).zip((0..out_len).step_by(DIGEST_LEN)) {
        input[counter_pos] = counter;
        let mut block = digest(&input);
        let take = DIGEST_LEN.min(out_len.saturating_sub(out.len()));
        out.extend_from_slice(&block[..take]);
        block.zeroize();
    }

    Ok(SecretBuffer::new(&out))
}
