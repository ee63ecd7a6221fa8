//! SHA-1 digest capability and HMAC-SHA-1.
//!
//! SHA-1 is the protocol's fixed digest: key expansion, passphrase
//! stretching, key fingerprints, and digest signatures are all defined over
//! it. Backed by `ring` (`SHA1_FOR_LEGACY_USE_ONLY`).

use ring::{digest, hmac};
use std::fmt;
use zeroize::Zeroize;

/// SHA-1 output length in bytes.
pub const DIGEST_LEN: usize = 20;

/// Compute the SHA-1 digest of `data`.
#[must_use]
pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    let d = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, data);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(d.as_ref());
    out
}

/// Compute HMAC-SHA-1 of `msg` under `key`.
#[must_use]
pub fn hmac_sha1(key: &[u8], msg: &[u8]) -> [u8; DIGEST_LEN] {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key);
    let tag = hmac::sign(&key, msg);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(tag.as_ref());
    out
}

/// Running SHA-1 computation over a stream of data.
///
/// `Clone` duplicates the running state, so a caller can fork a digest or
/// overwrite one state with another.
#[derive(Clone)]
pub struct DigestState {
    ctx: digest::Context,
}

impl DigestState {
    /// Start a new, empty digest.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ctx: digest::Context::new(&digest::SHA1_FOR_LEGACY_USE_ONLY),
        }
    }

    /// Append `data` to the digested stream.
    pub fn update(&mut self, data: &[u8]) {
        self.ctx.update(data);
    }

    /// Return the first `out_len` bytes of the digest of everything added so
    /// far. The running state is left untouched.
    ///
    /// `out_len` is clamped to [`DIGEST_LEN`].
    #[must_use]
    pub fn peek(&self, out_len: usize) -> Vec<u8> {
        let finished = self.ctx.clone().finish();
        let mut full = [0u8; DIGEST_LEN];
        full.copy_from_slice(finished.as_ref());
        let out = full[..out_len.min(DIGEST_LEN)].to_vec();
        full.zeroize();
        out
    }
}

impl Default for DigestState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DigestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DigestState(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_encoding::HEXLOWER;

    #[test]
    fn digest_matches_fips_180_vector() {
        // FIPS 180-1 Appendix A: SHA1("abc").
        assert_eq!(
            HEXLOWER.encode(&digest(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn incremental_digest_matches_one_shot() {
        let mut state = DigestState::new();
        state.update(b"ab");
        state.update(b"c");
        assert_eq!(state.peek(DIGEST_LEN), digest(b"abc").to_vec());
    }

    #[test]
    fn peek_does_not_consume_state() {
        let mut state = DigestState::new();
        state.update(b"abc");
        let first = state.peek(DIGEST_LEN);
        assert_eq!(first, state.peek(DIGEST_LEN));
        state.update(b"def");
        assert_eq!(state.peek(DIGEST_LEN), digest(b"abcdef").to_vec());
    }

    #[test]
    fn peek_truncates_and_clamps() {
        let mut state = DigestState::new();
        state.update(b"abc");
        assert_eq!(state.peek(4), digest(b"abc")[..4].to_vec());
        assert_eq!(state.peek(64).len(), DIGEST_LEN);
    }

    #[test]
    fn cloned_state_diverges_independently() {
        let mut a = DigestState::new();
        a.update(b"prefix");
        let mut b = a.clone();
        b.update(b"-more");
        assert_eq!(a.peek(DIGEST_LEN), digest(b"prefix").to_vec());
        assert_eq!(b.peek(DIGEST_LEN), digest(b"prefix-more").to_vec());
    }

    #[test]
    fn hmac_sha1_matches_rfc_2202_case_2() {
        assert_eq!(
            HEXLOWER.encode(&hmac_sha1(b"Jefe", b"what do ya want for nothing?")),
            "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        );
    }
}
