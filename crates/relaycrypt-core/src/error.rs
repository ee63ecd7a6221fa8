//! Cryptographic error types for `relaycrypt-core`.

use thiserror::Error;

/// Errors produced by handshake and envelope operations.
///
/// Variants fall into three groups: caller-contract violations
/// ([`InvalidInput`](Self::InvalidInput), [`KeyDerivation`](Self::KeyDerivation)),
/// failures reported by an underlying primitive, and malformed input from the
/// other side of the channel ([`MalformedCiphertext`](Self::MalformedCiphertext),
/// [`InvalidDhPublicValue`](Self::InvalidDhPublicValue)).
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Caller supplied an out-of-range length, undersized buffer, or an
    /// input the selected mode cannot carry.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// RSA encryption, decryption, or key validation failed.
    #[error("asymmetric operation failed: {0}")]
    Asymmetric(String),

    /// The key handle holds only a public key.
    #[error("operation requires a private key")]
    NotPrivateKey,

    /// AES-CTR stream cipher failure.
    #[error("stream cipher error: {0}")]
    Cipher(String),

    /// The operating system CSPRNG failed.
    #[error("random number generation failed: {0}")]
    Random(String),

    /// Key expansion or passphrase stretching precondition violated.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// PEM or DER key (de)serialization failure.
    #[error("key encoding error: {0}")]
    KeyEncoding(String),

    /// Signature creation failed or the signature did not verify.
    #[error("signature error: {0}")]
    Signature(String),

    /// A hybrid ciphertext decrypted to a header with no room for the
    /// symmetric key.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// A Diffie-Hellman public value lies outside `[2, p-2]`.
    #[error("invalid DH public value: {0}")]
    InvalidDhPublicValue(String),

    /// Any other Diffie-Hellman handshake failure.
    #[error("key exchange error: {0}")]
    KeyExchange(String),
}
