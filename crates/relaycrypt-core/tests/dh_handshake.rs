#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! End-to-end Diffie-Hellman handshakes between two independent contexts.

use relaycrypt_core::{
    expand_key_material, BigUint, CryptoError, DhContext, DhParams, DH_BYTES, MAX_EXPANSION_LEN,
};

fn handshake(out_len: usize) -> (Vec<u8>, Vec<u8>) {
    let mut alice = DhContext::new();
    let mut bob = DhContext::new();
    let alice_pub = alice.public_value(DH_BYTES).expect("alice public value");
    let bob_pub = bob.public_value(DH_BYTES).expect("bob public value");

    let a = alice
        .compute_shared_secret(&bob_pub, out_len)
        .expect("alice should complete");
    let b = bob
        .compute_shared_secret(&alice_pub, out_len)
        .expect("bob should complete");
    (a.expose().to_vec(), b.expose().to_vec())
}

#[test]
fn both_sides_agree_for_every_output_length() {
    for out_len in [0, 1, 20, 72, 100, 1000, MAX_EXPANSION_LEN] {
        let (a, b) = handshake(out_len);
        assert_eq!(a.len(), out_len);
        assert_eq!(a, b, "secrets differ for out_len {out_len}");
    }
}

#[test]
fn separate_handshakes_yield_separate_secrets() {
    let (first, _) = handshake(40);
    let (second, _) = handshake(40);
    assert_ne!(first, second);
}

#[test]
fn outputs_of_one_handshake_share_a_prefix() {
    let params = DhParams::global();
    let mut alice = DhContext::new();
    let mut bob = DhContext::new();
    let alice_pub = alice.public_value(DH_BYTES).expect("alice public value");
    let bob_pub = bob.public_value(DH_BYTES).expect("bob public value");

    // Short outputs are prefixes of longer ones from the same handshake.
    let long = alice
        .compute_shared_secret(&bob_pub, 200)
        .expect("alice should complete");
    let short = bob
        .compute_shared_secret(&alice_pub, 36)
        .expect("bob should complete");
    assert_eq!(short.expose(), &long.expose()[..36]);

    // Zero-padding on the wire does not change the peer value.
    let mut padded = vec![0u8; 8];
    padded.extend_from_slice(&alice_pub);
    let parsed = params.validate_public_bytes(&padded).expect("padded value is valid");
    assert_eq!(parsed, BigUint::from_bytes_be(&alice_pub));
}

#[test]
fn public_values_are_in_range_and_fixed_width() {
    let params = DhParams::global();
    for _ in 0..4 {
        let mut ctx = DhContext::new();
        let public = ctx.public_value(DH_BYTES).expect("public value");
        assert_eq!(public.len(), ctx.key_len());
        params
            .check_public_value(&BigUint::from_bytes_be(&public))
            .expect("own value must validate");
    }
}

#[test]
fn validation_range_boundaries() {
    let params = DhParams::global();
    let p = params.prime().clone();
    let one = BigUint::from(1u32);
    let two = BigUint::from(2u32);

    for bad in [BigUint::from(0u32), one.clone(), &p - &one, p.clone()] {
        assert!(matches!(
            params.check_public_value(&bad),
            Err(CryptoError::InvalidDhPublicValue(_))
        ));
    }
    params.check_public_value(&two).expect("2 is acceptable");
    params.check_public_value(&(&p - &two)).expect("p-2 is acceptable");
}

#[test]
fn handshake_aborts_on_degenerate_peer_values() {
    let p = DhParams::global().prime().clone();
    let p_minus_one = (&p - &BigUint::from(1u32)).to_bytes_be();
    for peer in [vec![0x01], vec![0x00; DH_BYTES], p_minus_one, p.to_bytes_be()] {
        let mut ctx = DhContext::new();
        ctx.generate_key_pair().expect("generate should succeed");
        let err = ctx
            .compute_shared_secret(&peer, 20)
            .expect_err("degenerate peer value must be rejected");
        assert!(matches!(err, CryptoError::InvalidDhPublicValue(_)));
    }
}

#[test]
fn undersized_public_buffer_leaves_context_usable() {
    let mut alice = DhContext::new();
    let mut bob = DhContext::new();
    let before = alice.public_value(DH_BYTES).expect("alice public value");

    assert!(matches!(
        alice.public_value(DH_BYTES / 2),
        Err(CryptoError::InvalidInput(_))
    ));
    assert!(alice.has_key_pair());
    let after = alice.public_value(DH_BYTES).expect("alice public value");
    assert_eq!(before, after);

    let bob_pub = bob.public_value(DH_BYTES).expect("bob public value");
    let a = alice.compute_shared_secret(&bob_pub, 20).expect("alice should complete");
    let b = bob.compute_shared_secret(&after, 20).expect("bob should complete");
    assert_eq!(a.expose(), b.expose());
}

#[test]
fn oversized_key_material_request_fails() {
    let mut alice = DhContext::new();
    let mut bob = DhContext::new();
    let bob_pub = bob.public_value(DH_BYTES).expect("bob public value");
    alice.generate_key_pair().expect("generate should succeed");
    assert!(matches!(
        alice.compute_shared_secret(&bob_pub, MAX_EXPANSION_LEN + 1),
        Err(CryptoError::KeyDerivation(_))
    ));
    assert!(expand_key_material(b"", MAX_EXPANSION_LEN + 1).is_err());
}
