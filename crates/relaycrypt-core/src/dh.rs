//! Diffie-Hellman key agreement over the 1024-bit Oakley group.
//!
//! This module provides:
//! - [`DhParams`]: process-wide group parameters, initialized once on first use
//! - [`DhContext`]: one party's half of a single handshake
//!
//! # Handshake lifecycle
//!
//! A [`DhContext`] starts without keys, generates an ephemeral key pair on
//! demand, publishes `g^x`, and is consumed by
//! [`DhContext::compute_shared_secret`]. A context is never reused across
//! handshakes.
//!
//! # Public value validation
//!
//! Every public value, ours or the peer's, must lie in `[2, p-2]`. Values
//! outside that range (`0`, `1`, `p-1`, `>= p`) would confine the shared
//! secret to a tiny subgroup. Peer values failing the check abort the
//! handshake; our own failing values are discarded and regenerated.

use crate::asymmetric::to_fixed_be;
use crate::error::CryptoError;
use crate::kdf::{expand_key_material, MAX_EXPANSION_LEN};
use crate::memory::{fill_random, SecretBuffer};
use rsa::BigUint;
use std::fmt;
use std::sync::OnceLock;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Size of the group modulus and of an encoded public value, in bytes.
pub const DH_BYTES: usize = 128;

/// Bit length of the ephemeral private exponent.
pub const DH_PRIVATE_KEY_BITS: usize = 320;

const DH_PRIVATE_KEY_BYTES: usize = DH_PRIVATE_KEY_BITS / 8;

const DH_GENERATOR: u32 = 2;

/// RFC 2409 §6.2 safe prime: `2^1024 - 2^960 - 1 + 2^64 * { [2^894 pi] + 129093 }`.
const DH_PRIME: [u8; DH_BYTES] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xc9, 0x0f, 0xda, 0xa2, 0x21, 0x68, 0xc2, 0x34,
    0xc4, 0xc6, 0x62, 0x8b, 0x80, 0xdc, 0x1c, 0xd1, 0x29, 0x02, 0x4e, 0x08, 0x8a, 0x67, 0xcc, 0x74,
    0x02, 0x0b, 0xbe, 0xa6, 0x3b, 0x13, 0x9b, 0x22, 0x51, 0x4a, 0x08, 0x79, 0x8e, 0x34, 0x04, 0xdd,
    0xef, 0x95, 0x19, 0xb3, 0xcd, 0x3a, 0x43, 0x1b, 0x30, 0x2b, 0x0a, 0x6d, 0xf2, 0x5f, 0x14, 0x37,
    0x4f, 0xe1, 0x35, 0x6d, 0x6d, 0x51, 0xc2, 0x45, 0xe4, 0x85, 0xb5, 0x76, 0x62, 0x5e, 0x7e, 0xc6,
    0xf4, 0x4c, 0x42, 0xe9, 0xa6, 0x37, 0xed, 0x6b, 0x0b, 0xff, 0x5c, 0xb6, 0xf4, 0x06, 0xb7, 0xed,
    0xee, 0x38, 0x6b, 0xfb, 0x5a, 0x89, 0x9f, 0xa5, 0xae, 0x9f, 0x24, 0x11, 0x7c, 0x4b, 0x1f, 0xe6,
    0x49, 0x28, 0x66, 0x51, 0xec, 0xe6, 0x53, 0x81, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

static PARAMS: OnceLock<DhParams> = OnceLock::new();

// ---------------------------------------------------------------------------
// Group parameters
// ---------------------------------------------------------------------------

/// Shared group parameters `(p, g)`. Immutable once built.
#[derive(Debug)]
pub struct DhParams {
    p: BigUint,
    g: BigUint,
    /// Smallest acceptable public value (2).
    lower: BigUint,
    /// Largest acceptable public value (`p - 2`).
    upper: BigUint,
}

impl DhParams {
    /// The process-wide parameters. The first caller builds them; concurrent
    /// first calls block until that single initialization finishes.
    pub fn global() -> &'static Self {
        PARAMS.get_or_init(Self::oakley_group_2)
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn oakley_group_2() -> Self {
        let p = BigUint::from_bytes_be(&DH_PRIME);
        let two = BigUint::from(2u32);
        let upper = &p - &two;
        Self {
            p,
            g: BigUint::from(DH_GENERATOR),
            lower: two,
            upper,
        }
    }

    /// The prime modulus `p`.
    #[must_use]
    pub const fn prime(&self) -> &BigUint {
        &self.p
    }

    /// The generator `g`.
    #[must_use]
    pub const fn generator(&self) -> &BigUint {
        &self.g
    }

    /// Accept `value` only if `2 <= value <= p - 2`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidDhPublicValue` otherwise.
    pub fn check_public_value(&self, value: &BigUint) -> Result<(), CryptoError> {
        let reason = if value < &self.lower {
            "DH public value must be at least 2"
        } else if value > &self.upper {
            "DH public value must be at most p-2"
        } else {
            return Ok(());
        };
        tracing::warn!(bits = value.bits(), "rejecting insecure DH public value: {reason}");
        Err(CryptoError::InvalidDhPublicValue(reason.into()))
    }

    /// Parse a big-endian public value and apply
    /// [`check_public_value`](Self::check_public_value).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidDhPublicValue` if the value is out of range.
    pub fn validate_public_bytes(&self, bytes: &[u8]) -> Result<BigUint, CryptoError> {
        let value = BigUint::from_bytes_be(bytes);
        self.check_public_value(&value)?;
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Key pair
// ---------------------------------------------------------------------------

#[derive(Zeroize, ZeroizeOnDrop)]
struct DhKeyPair {
    private: BigUint,
    public: BigUint,
}

impl DhKeyPair {
    /// Draw an exponent of exactly [`DH_PRIVATE_KEY_BITS`] bits and compute
    /// `g^x mod p`. The result is not yet validated.
    fn generate(params: &DhParams) -> Result<Self, CryptoError> {
        let mut bytes = Zeroizing::new([0u8; DH_PRIVATE_KEY_BYTES]);
        fill_random(&mut bytes[..])?;
        bytes[0] |= 0x80;
        let private = BigUint::from_bytes_be(&bytes[..]);
        let public = params.g.modpow(&private, &params.p);
        Ok(Self { private, public })
    }
}

// ---------------------------------------------------------------------------
// Handshake context
// ---------------------------------------------------------------------------

/// One side of a Diffie-Hellman handshake.
pub struct DhContext {
    params: &'static DhParams,
    keys: Option<DhKeyPair>,
}

impl DhContext {
    /// New context over the process-wide parameters, with no key pair yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: DhParams::global(),
            keys: None,
        }
    }

    /// Length in bytes of the group modulus.
    #[must_use]
    pub const fn key_len(&self) -> usize {
        DH_BYTES
    }

    /// Returns `true` once an ephemeral key pair exists.
    #[must_use]
    pub const fn has_key_pair(&self) -> bool {
        self.keys.is_some()
    }

    /// Generate a fresh ephemeral key pair, replacing any existing one.
    ///
    /// Candidates whose public value fails validation are discarded and
    /// drawn again until one passes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Random` if the CSPRNG fails.
    pub fn generate_key_pair(&mut self) -> Result<(), CryptoError> {
        let params = self.params;
        self.generate_key_pair_with(|public| params.check_public_value(public))
    }

    /// Key generation loop with the public-value check supplied by the caller.
    pub(crate) fn generate_key_pair_with<F>(&mut self, mut check: F) -> Result<(), CryptoError>
    where
        F: FnMut(&BigUint) -> Result<(), CryptoError>,
    {
        self.keys = None;
        loop {
            let candidate = DhKeyPair::generate(self.params)?;
            if check(&candidate.public).is_ok() {
                self.keys = Some(candidate);
                return Ok(());
            }
            tracing::warn!("own DH public value failed validation; generating a new key pair");
        }
    }

    /// Our public value `g^x`, big-endian, left-zero-padded to `min_len`
    /// bytes. Generates a key pair first if none exists.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if `min_len` is shorter than the
    /// value's natural encoding. The key pair is kept in that case.
    pub fn public_value(&mut self, min_len: usize) -> Result<Vec<u8>, CryptoError> {
        if self.keys.is_none() {
            self.generate_key_pair()?;
        }
        let keys = self
            .keys
            .as_ref()
            .ok_or_else(|| CryptoError::KeyExchange("key pair missing after generation".into()))?;
        to_fixed_be(&keys.public, min_len).inspect_err(|_| {
            tracing::warn!(min_len, "buffer too small for DH public value");
        })
    }

    /// Complete the handshake with the peer's public value and derive
    /// `out_len` bytes of key material from the shared secret.
    ///
    /// Consumes the context; the private exponent is zeroized on return.
    ///
    /// # Errors
    ///
    /// - `CryptoError::KeyDerivation` if `out_len` exceeds
    ///   [`MAX_EXPANSION_LEN`]
    /// - `CryptoError::InvalidInput` if no key pair was generated
    /// - `CryptoError::InvalidDhPublicValue` if the peer value is out of range
    pub fn compute_shared_secret(
        self,
        peer_public: &[u8],
        out_len: usize,
    ) -> Result<SecretBuffer, CryptoError> {
        if out_len > MAX_EXPANSION_LEN {
            return Err(CryptoError::KeyDerivation(format!(
                "requested {out_len} bytes of handshake key material (maximum {MAX_EXPANSION_LEN})"
            )));
        }
        let keys = self.keys.as_ref().ok_or_else(|| {
            CryptoError::InvalidInput("no DH key pair generated before computing secret".into())
        })?;
        let peer = self.params.validate_public_bytes(peer_public).inspect_err(|_| {
            tracing::warn!("rejected invalid peer g^x");
        })?;

        let mut shared = peer.modpow(&keys.private, &self.params.p);
        let raw = Zeroizing::new(shared.to_bytes_be());
        shared.zeroize();
        expand_key_material(&raw, out_len)
    }
}

impl Default for DhContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DhContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhContext")
            .field("has_key_pair", &self.has_key_pair())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
