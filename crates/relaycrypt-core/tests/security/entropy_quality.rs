//! Entropy smoke tests for generated session keys, salts, and derived key
//! material. Thresholds sit well below the expected value for each sample
//! size and only catch degenerate output.

use relaycrypt_core::{
    expand_key_material, random_bytes, DhContext, S2kSpecifier, SecretBuffer, SymmetricKey,
    DEFAULT_S2K_COST, DH_BYTES, MAX_EXPANSION_LEN,
};

/// Shannon entropy in bits per byte.
#[allow(clippy::cast_precision_loss)]
fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut freq = [0u64; 256];
    for &b in data {
        freq[b as usize] = freq[b as usize].saturating_add(1);
    }
    let len = data.len() as f64;
    freq.iter()
        .filter(|&&f| f > 0)
        .map(|&f| {
            let p = f as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[test]
fn random_buffer_64kb_entropy() {
    let buf = SecretBuffer::random(65536).expect("CSPRNG should succeed");
    let entropy = shannon_entropy(buf.expose());
    assert!(entropy > 7.99, "entropy too low: {entropy:.4}");
}

#[test]
fn session_keys_are_distinct_and_spread() {
    let mut pool = Vec::with_capacity(64 * 16);
    for _ in 0..64 {
        let key = SymmetricKey::generate().expect("generate should succeed");
        pool.extend_from_slice(key.key());
    }
    let entropy = shannon_entropy(&pool);
    assert!(entropy > 7.5, "session key entropy too low: {entropy:.4}");
}

#[test]
fn expanded_key_material_looks_uniform() {
    let out = expand_key_material(b"", MAX_EXPANSION_LEN).expect("expand should succeed");
    let entropy = shannon_entropy(out.expose());
    assert!(entropy > 7.85, "expansion entropy too low: {entropy:.4}");
}

#[test]
fn dh_public_values_are_spread() {
    let mut pool = Vec::with_capacity(8 * DH_BYTES);
    for _ in 0..8 {
        let mut ctx = DhContext::new();
        pool.extend(ctx.public_value(DH_BYTES).expect("public value"));
    }
    let entropy = shannon_entropy(&pool);
    assert!(entropy > 7.5, "DH public value entropy too low: {entropy:.4}");
}

#[test]
fn salts_and_random_bytes_differ() {
    let a = S2kSpecifier::generate(DEFAULT_S2K_COST).expect("generate should succeed");
    let b = S2kSpecifier::generate(DEFAULT_S2K_COST).expect("generate should succeed");
    assert_ne!(a.salt, b.salt);
    assert_ne!(
        random_bytes(256).expect("CSPRNG should succeed"),
        random_bytes(256).expect("CSPRNG should succeed")
    );
}
