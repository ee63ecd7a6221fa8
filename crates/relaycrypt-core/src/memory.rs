//! Zeroizing containers for key material, shared secrets, and plaintext.
//!
//! This module provides:
//! - [`SecretBuffer`]: variable-length secret bytes (zeroized on drop)
//! - [`SecretBytes`]: fixed-size secret bytes (zeroized on drop)
//! - [`random_bytes`]: the secure random-byte source used by every module
//! - [`random_below`]: uniform random integer below a bound
//!
//! Both containers mask their `Debug`/`Display` output so secrets cannot
//! leak through logging.

use crate::error::CryptoError;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// ---------------------------------------------------------------------------
// Random source
// ---------------------------------------------------------------------------

/// Fill `dest` from the operating system CSPRNG.
///
/// # Errors
///
/// Returns `CryptoError::Random` if the CSPRNG fails.
pub fn fill_random(dest: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(dest)
        .map_err(|e| CryptoError::Random(format!("CSPRNG fill failed: {e}")))
}

/// Return `len` bytes from the operating system CSPRNG.
///
/// # Errors
///
/// Returns `CryptoError::Random` if the CSPRNG fails.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut out = vec![0u8; len];
    fill_random(&mut out)?;
    Ok(out)
}

/// Uniform random integer in `[0, max)`.
///
/// # Errors
///
/// Returns `CryptoError::InvalidInput` if `max` is zero.
pub fn random_below(max: u64) -> Result<u64, CryptoError> {
    if max == 0 {
        return Err(CryptoError::InvalidInput(
            "random_below needs a non-zero bound".into(),
        ));
    }
    Ok(OsRng.gen_range(0..max))
}

// ---------------------------------------------------------------------------
// SecretBuffer: variable-length
// ---------------------------------------------------------------------------

/// Variable-length buffer for sensitive data.
///
/// Wraps [`SecretSlice<u8>`], which zeroes its allocation before freeing it.
pub struct SecretBuffer {
    inner: SecretSlice<u8>,
}

impl SecretBuffer {
    /// Copy `data` into a new `SecretBuffer`.
    ///
    /// The caller remains responsible for zeroizing the source.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self {
            inner: data.to_vec().into(),
        }
    }

    /// Take ownership of `data` without copying it.
    ///
    /// Spare capacity beyond `data.len()` is zeroized before the vector is
    /// shrunk into the secret allocation.
    #[must_use]
    pub fn from_vec(mut data: Vec<u8>) -> Self {
        if data.capacity() > data.len() {
            let exact = Self::new(&data);
            data.zeroize();
            return exact;
        }
        Self { inner: data.into() }
    }

    /// Create a `SecretBuffer` filled with `len` cryptographically random bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Random` if the CSPRNG fails.
    pub fn random(len: usize) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(random_bytes(len)?);
        Ok(Self::new(&bytes))
    }

    /// Expose the underlying bytes. Keep the borrow short-lived.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Returns the number of bytes in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expose().len()
    }

    /// Returns `true` if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

// ---------------------------------------------------------------------------
// SecretBytes<N>: fixed-size
// ---------------------------------------------------------------------------

/// Fixed-size secret such as a symmetric key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> SecretBytes<N> {
    /// Wrap a fixed-size array. The array is moved in.
    #[must_use]
    pub const fn new(data: [u8; N]) -> Self {
        Self { bytes: data }
    }

    /// Create `SecretBytes` filled with cryptographically random bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Random` if the CSPRNG fails.
    pub fn random() -> Result<Self, CryptoError> {
        let mut s = Self::new([0u8; N]);
        fill_random(&mut s.bytes)?;
        Ok(s)
    }

    /// Expose the underlying bytes for cryptographic operations.
    #[must_use]
    pub const fn expose(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Mutable access, for in-place adjustments of freshly generated keys.
    pub fn expose_mut(&mut self) -> &mut [u8; N] {
        &mut self.bytes
    }
}

impl<const N: usize> fmt::Debug for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

impl<const N: usize> fmt::Display for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

impl<const N: usize> From<[u8; N]> for SecretBytes<N> {
    fn from(data: [u8; N]) -> Self {
        Self::new(data)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
