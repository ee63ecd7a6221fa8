//! RSA identity keys behind a shared, reference-counted handle.
//!
//! This module provides:
//! - [`AsymmetricKey`]: public key or full keypair; cloning shares the key
//! - [`PaddingMode`]: the three supported encryption paddings and their overhead
//! - public-key encryption, private-key decryption, and PKCS#1 v1.5 signatures
//! - PKCS#1 DER/PEM (de)serialization, SHA-1 key digests and fingerprints
//!
//! Every ciphertext and signature produced here is exactly
//! [`AsymmetricKey::size`] bytes, left-zero-padded.

use crate::digest::{digest, DIGEST_LEN};
use crate::error::CryptoError;
use data_encoding::HEXUPPER;
use rand::rngs::OsRng;
use rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding,
};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Oaep, Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use zeroize::{Zeroize, Zeroizing};

/// Default modulus size for generated identity keys, in bits.
pub const DEFAULT_KEY_BITS: usize = 1024;

/// Length of a spaced fingerprint: 40 hex digits plus 9 separators.
pub const FINGERPRINT_LEN: usize = 49;

/// Length of an unspaced fingerprint.
pub const HEX_DIGEST_LEN: usize = 40;

/// Minimum number of `0xFF` bytes in a PKCS#1 v1.5 type-1 block.
const PKCS1_MIN_PAD: usize = 8;

// ---------------------------------------------------------------------------
// Padding
// ---------------------------------------------------------------------------

/// Encryption padding applied around the asymmetric operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaddingMode {
    /// Raw modular exponentiation. Input must fill the whole modulus and be
    /// numerically smaller than it.
    None,
    /// PKCS#1 v1.5 encryption padding.
    Pkcs1,
    /// OAEP with SHA-1 and MGF1-SHA-1.
    Oaep,
}

impl PaddingMode {
    /// Fixed number of bytes the padding consumes inside one modulus block.
    #[must_use]
    pub const fn overhead(self) -> usize {
        match self {
            Self::None => 0,
            Self::Pkcs1 => 11,
            Self::Oaep => 2 * DIGEST_LEN + 2,
        }
    }

    /// Largest plaintext a single asymmetric operation can carry under a
    /// modulus of `key_size` bytes.
    #[must_use]
    pub const fn max_plaintext_len(self, key_size: usize) -> usize {
        key_size.saturating_sub(self.overhead())
    }
}

// ---------------------------------------------------------------------------
// Key handle
// ---------------------------------------------------------------------------

enum KeyMaterial {
    Public(RsaPublicKey),
    Private {
        private: RsaPrivateKey,
        public: RsaPublicKey,
    },
}

impl KeyMaterial {
    fn from_private(private: RsaPrivateKey) -> Self {
        let public = private.to_public_key();
        Self::Private { private, public }
    }

    fn public(&self) -> &RsaPublicKey {
        match self {
            Self::Public(public) | Self::Private { public, .. } => public,
        }
    }

    fn private(&self) -> Option<&RsaPrivateKey> {
        match self {
            Self::Public(_) => None,
            Self::Private { private, .. } => Some(private),
        }
    }
}

/// Shared handle to an RSA public key or public/private keypair.
///
/// `clone()` adds a reference to the same key material; the material is
/// released (and private components zeroized) when the last handle drops.
/// Use [`copy_full`](Self::copy_full) for an independent copy.
///
/// The modulus is fixed for the lifetime of the material. Loading a
/// different key means building a new handle.
#[derive(Clone)]
pub struct AsymmetricKey {
    inner: Arc<KeyMaterial>,
}

impl AsymmetricKey {
    fn from_material(material: KeyMaterial) -> Self {
        Self {
            inner: Arc::new(material),
        }
    }

    /// Generate a fresh keypair with a `bits`-bit modulus and exponent 65537.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Asymmetric` if key generation fails.
    pub fn generate(bits: usize) -> Result<Self, CryptoError> {
        let private = RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| {
            tracing::warn!(bits, error = %e, "RSA key generation failed");
            CryptoError::Asymmetric(format!("key generation failed: {e}"))
        })?;
        Ok(Self::from_material(KeyMaterial::from_private(private)))
    }

    /// Wrap an existing public key.
    #[must_use]
    pub fn from_public(public: RsaPublicKey) -> Self {
        Self::from_material(KeyMaterial::Public(public))
    }

    /// Wrap an existing private key.
    #[must_use]
    pub fn from_private(private: RsaPrivateKey) -> Self {
        Self::from_material(KeyMaterial::from_private(private))
    }

    /// A new handle holding only the public half of this key.
    #[must_use]
    pub fn public_only(&self) -> Self {
        Self::from_public(self.inner.public().clone())
    }

    /// Independent deep copy of the key material.
    #[must_use]
    pub fn copy_full(&self) -> Self {
        match self.inner.as_ref() {
            KeyMaterial::Public(public) => Self::from_public(public.clone()),
            KeyMaterial::Private { private, .. } => Self::from_private(private.clone()),
        }
    }

    /// Number of live handles sharing this key material.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Modulus size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.public().size()
    }

    /// Returns `true` if the handle carries the private exponent.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.inner.private().is_some()
    }

    fn require_private(&self) -> Result<&RsaPrivateKey, CryptoError> {
        self.inner.private().ok_or(CryptoError::NotPrivateKey)
    }

    /// Run the consistency checks on a private key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::NotPrivateKey` for a public-only handle, or
    /// `CryptoError::Asymmetric` if the components are inconsistent.
    pub fn check_key(&self) -> Result<(), CryptoError> {
        self.require_private()?.validate().map_err(|e| {
            tracing::warn!(error = %e, "RSA key failed validation");
            CryptoError::Asymmetric(format!("key validation failed: {e}"))
        })
    }

    /// Order two keys by modulus, then by public exponent.
    #[must_use]
    pub fn compare_public(&self, other: &Self) -> Ordering {
        let (a, b) = (self.inner.public(), other.inner.public());
        a.n().cmp(b.n()).then_with(|| a.e().cmp(b.e()))
    }

    // -----------------------------------------------------------------------
    // Encryption
    // -----------------------------------------------------------------------

    /// Encrypt `data` with the public key under `padding`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if `data` does not fit the padding
    /// (or, unpadded, is not exactly [`size`](Self::size) bytes), and
    /// `CryptoError::Asymmetric` if the RSA operation fails.
    pub fn public_encrypt(&self, data: &[u8], padding: PaddingMode) -> Result<Vec<u8>, CryptoError> {
        let public = self.inner.public();
        let key_size = public.size();
        let fits = match padding {
            PaddingMode::None => data.len() == key_size,
            PaddingMode::Pkcs1 | PaddingMode::Oaep => {
                data.len() <= padding.max_plaintext_len(key_size)
            }
        };
        if !fits {
            return Err(CryptoError::InvalidInput(format!(
                "{} bytes cannot be encrypted under {padding:?} padding with a {key_size}-byte key",
                data.len()
            )));
        }

        let result = match padding {
            PaddingMode::None => raw_public_op(public, data),
            PaddingMode::Pkcs1 => public
                .encrypt(&mut OsRng, Pkcs1v15Encrypt, data)
                .map_err(|e| CryptoError::Asymmetric(format!("RSA encryption failed: {e}"))),
            PaddingMode::Oaep => public
                .encrypt(&mut OsRng, Oaep::new::<sha1::Sha1>(), data)
                .map_err(|e| CryptoError::Asymmetric(format!("RSA encryption failed: {e}"))),
        };
        if let Err(e) = &result {
            tracing::warn!(?padding, error = %e, "RSA public-key encryption failed");
        }
        result
    }

    /// Decrypt `data` with the private key under `padding`.
    ///
    /// The returned vector holds plaintext; callers wrap it in a zeroizing
    /// container.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::NotPrivateKey` for a public-only handle and
    /// `CryptoError::Asymmetric` if decryption or unpadding fails.
    pub fn private_decrypt(&self, data: &[u8], padding: PaddingMode) -> Result<Vec<u8>, CryptoError> {
        let private = self.require_private()?;
        let result = match padding {
            PaddingMode::None => raw_private_op(private, data),
            PaddingMode::Pkcs1 => private
                .decrypt(Pkcs1v15Encrypt, data)
                .map_err(|e| CryptoError::Asymmetric(format!("RSA decryption failed: {e}"))),
            PaddingMode::Oaep => private
                .decrypt(Oaep::new::<sha1::Sha1>(), data)
                .map_err(|e| CryptoError::Asymmetric(format!("RSA decryption failed: {e}"))),
        };
        if let Err(e) = &result {
            tracing::debug!(?padding, error = %e, "RSA private-key decryption failed");
        }
        result
    }

    // -----------------------------------------------------------------------
    // Signatures
    // -----------------------------------------------------------------------

    /// Sign `data` directly with PKCS#1 v1.5 type-1 padding (no DigestInfo).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::NotPrivateKey` for a public-only handle and
    /// `CryptoError::Signature` if `data` is too long for the modulus.
    pub fn private_sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.require_private()?
            .sign(Pkcs1v15Sign::new_unprefixed(), data)
            .map_err(|e| {
                tracing::warn!(error = %e, "RSA signature generation failed");
                CryptoError::Signature(format!("signing failed: {e}"))
            })
    }

    /// Sign the SHA-1 digest of `data`.
    ///
    /// # Errors
    ///
    /// See [`private_sign`](Self::private_sign).
    pub fn private_sign_digest(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut d = digest(data);
        let sig = self.private_sign(&d);
        d.zeroize();
        sig
    }

    /// Recover the data signed by [`private_sign`](Self::private_sign).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Signature` if `sig` is not a well-formed
    /// PKCS#1 v1.5 type-1 block under this key.
    pub fn public_checksig(&self, sig: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let public = self.inner.public();
        if sig.len() != public.size() {
            return Err(CryptoError::Signature(format!(
                "signature length {} does not match key size {}",
                sig.len(),
                public.size()
            )));
        }
        let block = raw_public_op(public, sig)
            .map_err(|e| CryptoError::Signature(format!("signature check failed: {e}")))?;
        strip_pkcs1_type1(&block)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                tracing::warn!("invalid RSA signature padding");
                CryptoError::Signature("invalid signature padding".into())
            })
    }

    /// Verify that `sig` signs the SHA-1 digest of `data`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Signature` on any mismatch.
    pub fn public_checksig_digest(&self, data: &[u8], sig: &[u8]) -> Result<(), CryptoError> {
        let d = digest(data);
        self.inner
            .public()
            .verify(Pkcs1v15Sign::new_unprefixed(), &d, sig)
            .map_err(|_| {
                tracing::warn!("signature mismatched with digest");
                CryptoError::Signature("signature does not match digest".into())
            })
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    /// Decode a PKCS#1 DER `RSAPublicKey`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyEncoding` if the bytes do not parse.
    pub fn from_public_pkcs1_der(der: &[u8]) -> Result<Self, CryptoError> {
        RsaPublicKey::from_pkcs1_der(der)
            .map(Self::from_public)
            .map_err(|e| CryptoError::KeyEncoding(format!("decoding public key: {e}")))
    }

    /// Decode a PEM `RSA PUBLIC KEY`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyEncoding` if the text does not parse.
    pub fn from_public_pkcs1_pem(pem: &str) -> Result<Self, CryptoError> {
        RsaPublicKey::from_pkcs1_pem(pem)
            .map(Self::from_public)
            .map_err(|e| CryptoError::KeyEncoding(format!("reading public key: {e}")))
    }

    /// Decode a PEM `RSA PRIVATE KEY`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyEncoding` if the text does not parse.
    pub fn from_private_pkcs1_pem(pem: &str) -> Result<Self, CryptoError> {
        RsaPrivateKey::from_pkcs1_pem(pem)
            .map(Self::from_private)
            .map_err(|e| CryptoError::KeyEncoding(format!("reading private key: {e}")))
    }

    /// Encode the public key as PKCS#1 DER.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyEncoding` if encoding fails.
    pub fn to_public_pkcs1_der(&self) -> Result<Vec<u8>, CryptoError> {
        self.inner
            .public()
            .to_pkcs1_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| CryptoError::KeyEncoding(format!("encoding public key: {e}")))
    }

    /// Encode the public key as PEM.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyEncoding` if encoding fails.
    pub fn to_public_pkcs1_pem(&self) -> Result<String, CryptoError> {
        self.inner
            .public()
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyEncoding(format!("writing public key: {e}")))
    }

    /// Encode the private key as PEM. The string is zeroized on drop.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::NotPrivateKey` for a public-only handle, or
    /// `CryptoError::KeyEncoding` if encoding fails.
    pub fn to_private_pkcs1_pem(&self) -> Result<Zeroizing<String>, CryptoError> {
        self.require_private()?
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyEncoding(format!("writing private key: {e}")))
    }

    /// SHA-1 digest of the PKCS#1 DER encoding of the public key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyEncoding` if encoding fails.
    pub fn public_digest(&self) -> Result<[u8; DIGEST_LEN], CryptoError> {
        Ok(digest(&self.to_public_pkcs1_der()?))
    }

    /// Uppercase hex of [`public_digest`](Self::public_digest), with a space
    /// after every four digits when `spaced`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyEncoding` if encoding fails.
    pub fn fingerprint(&self, spaced: bool) -> Result<String, CryptoError> {
        let hex = HEXUPPER.encode(&self.public_digest()?);
        if !spaced {
            return Ok(hex);
        }
        let mut out = String::with_capacity(FINGERPRINT_LEN);
        for (i, c) in hex.chars().enumerate() {
            if i > 0 && i % 4 == 0 {
                out.push(' ');
            }
            out.push(c);
        }
        Ok(out)
    }
}

impl fmt::Debug for AsymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsymmetricKey")
            .field("size", &self.size())
            .field("private", &self.is_private())
            .finish_non_exhaustive()
    }
}

/// Returns `true` if `s` is a spaced fingerprint: ten groups of four hex
/// digits separated by single spaces.
#[must_use]
pub fn is_fingerprint_syntax(s: &str) -> bool {
    s.len() == FINGERPRINT_LEN
        && s.bytes().enumerate().all(|(i, b)| {
            if i % 5 == 4 {
                b == b' '
            } else {
                b.is_ascii_hexdigit()
            }
        })
}

// ---------------------------------------------------------------------------
// Raw operations
// ---------------------------------------------------------------------------

/// `data^e mod n`, requiring `data < n`.
fn raw_public_op(public: &RsaPublicKey, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let m = BigUint::from_bytes_be(data);
    if &m >= public.n() {
        return Err(CryptoError::Asymmetric(
            "input is not smaller than the modulus".into(),
        ));
    }
    let c = rsa::hazmat::rsa_encrypt(public, &m)
        .map_err(|e| CryptoError::Asymmetric(format!("raw RSA encryption failed: {e}")))?;
    to_fixed_be(&c, public.size())
}

/// `data^d mod n`, requiring `data < n`. Blinded CRT decryption with a
/// re-encryption check. Output is left-padded to the modulus size so
/// leading zero bytes of the plaintext survive.
fn raw_private_op(private: &RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let key_size = private.size();
    if data.len() > key_size {
        return Err(CryptoError::Asymmetric(format!(
            "ciphertext longer than modulus: {} > {key_size}",
            data.len()
        )));
    }
    let c = BigUint::from_bytes_be(data);
    if &c >= private.n() {
        return Err(CryptoError::Asymmetric(
            "ciphertext is not smaller than the modulus".into(),
        ));
    }
    let mut m = rsa::hazmat::rsa_decrypt_and_check(private, Some(&mut OsRng), &c)
        .map_err(|e| CryptoError::Asymmetric(format!("raw RSA decryption failed: {e}")))?;
    let out = to_fixed_be(&m, key_size);
    m.zeroize();
    out
}

/// Big-endian encoding of `value`, left-padded with zeros to `len` bytes.
pub(crate) fn to_fixed_be(value: &BigUint, len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut bytes = value.to_bytes_be();
    let Some(pad) = len.checked_sub(bytes.len()) else {
        let natural = bytes.len();
        bytes.zeroize();
        return Err(CryptoError::InvalidInput(format!(
            "value needs {natural} bytes, only {len} available"
        )));
    };
    let mut out = vec![0u8; pad];
    out.extend_from_slice(&bytes);
    bytes.zeroize();
    Ok(out)
}

/// Parse `00 01 FF..FF 00 payload`, returning the payload.
fn strip_pkcs1_type1(block: &[u8]) -> Option<&[u8]> {
    let rest = block.strip_prefix(&[0x00, 0x01])?;
    let pad_len = rest.iter().position(|&b| b != 0xFF)?;
    if pad_len < PKCS1_MIN_PAD || rest.get(pad_len) != Some(&0x00) {
        return None;
    }
    rest.get(pad_len.checked_add(1)?..)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
