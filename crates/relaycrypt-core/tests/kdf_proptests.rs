#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for counter-mode key expansion.

use proptest::prelude::*;
use relaycrypt_core::{digest, expand_key_material, DIGEST_LEN, MAX_EXPANSION_LEN};

proptest! {
    /// Output length always equals the requested length.
    #[test]
    fn output_has_requested_length(
        secret in proptest::collection::vec(any::<u8>(), 0..256),
        out_len in 0usize..=MAX_EXPANSION_LEN,
    ) {
        let out = expand_key_material(&secret, out_len).expect("expand should succeed");
        prop_assert_eq!(out.len(), out_len);
    }

    /// Same inputs, same bytes.
    #[test]
    fn expansion_is_deterministic(
        secret in proptest::collection::vec(any::<u8>(), 0..256),
        out_len in 0usize..1024,
    ) {
        let a = expand_key_material(&secret, out_len).expect("expand should succeed");
        let b = expand_key_material(&secret, out_len).expect("expand should succeed");
        prop_assert_eq!(a.expose(), b.expose());
    }

    /// A shorter request is a prefix of a longer one.
    #[test]
    fn shorter_output_is_prefix(
        secret in proptest::collection::vec(any::<u8>(), 1..128),
        short in 0usize..400,
        extra in 0usize..400,
    ) {
        let a = expand_key_material(&secret, short).expect("expand should succeed");
        let b = expand_key_material(&secret, short + extra).expect("expand should succeed");
        prop_assert_eq!(a.expose(), &b.expose()[..short]);
    }

    /// The first block is the digest of the secret followed by a zero byte.
    #[test]
    fn first_block_matches_digest(secret in proptest::collection::vec(any::<u8>(), 0..128)) {
        let out = expand_key_material(&secret, DIGEST_LEN).expect("expand should succeed");
        let mut input = secret.clone();
        input.push(0);
        let expected = digest(&input);
        prop_assert_eq!(out.expose(), expected.as_slice());
    }

    /// Anything past the counter space is refused.
    #[test]
    fn oversized_requests_fail(over in 1usize..10_000) {
        prop_assert!(expand_key_material(b"secret", MAX_EXPANSION_LEN + over).is_err());
    }
}

/// No two blocks of a full-length expansion repeat.
#[test]
fn full_expansion_blocks_are_distinct() {
    let out = expand_key_material(b"handshake secret", MAX_EXPANSION_LEN).expect("expand should succeed");
    let blocks: Vec<&[u8]> = out.expose().chunks(DIGEST_LEN).collect();
    assert_eq!(blocks.len(), 256);
    let unique: std::collections::HashSet<&[u8]> = blocks.iter().copied().collect();
    assert_eq!(unique.len(), blocks.len());
}
