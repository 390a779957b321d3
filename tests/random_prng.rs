//! Cross-module tests for the deterministic PRNG and its skip-ahead seeding.
//!
//! The parallel kernels rely on two properties: a batched draw is identical
//! to the same number of sequential draws, and a skip-ahead seed is identical
//! to the seed reached by stepping the generator one draw at a time. Both are
//! checked bit for bit.

use nasbench::config::{AMULT, SEED};
use nasbench::random::{find_my_seed, randlc, vranlc};

#[test]
fn sequence_is_stable_across_calls() {
    let mut a = SEED;
    let mut b = SEED;
    let first: Vec<f64> = (0..100).map(|_| randlc(&mut a, AMULT)).collect();
    let second: Vec<f64> = (0..100).map(|_| randlc(&mut b, AMULT)).collect();
    assert_eq!(first, second);
}

#[test]
fn vranlc_equals_sequential_randlc() {
    for n in [1, 2, 100, 1021] {
        let mut batch = vec![0.0; n];
        let mut xb = SEED;
        vranlc(n, &mut xb, AMULT, &mut batch);

        let mut xs = SEED;
        for (i, &b) in batch.iter().enumerate() {
            assert_eq!(randlc(&mut xs, AMULT), b, "n={n}, draw {i} differs");
        }
        assert_eq!(xs.to_bits(), xb.to_bits(), "n={n}, final seeds differ");
    }
}

#[test]
fn find_my_seed_equals_sequential_advance() {
    let np = 8;
    let total = 4 * 1024i64;
    for kn in 0..np {
        let fast = find_my_seed(kn, np, total, SEED, AMULT);

        let skip = kn as i64 * (total / np as i64);
        let mut slow = SEED;
        for _ in 0..skip {
            randlc(&mut slow, AMULT);
        }
        assert_eq!(fast.to_bits(), slow.to_bits(), "stream {kn}");
    }
}

#[test]
fn streams_partition_the_sequential_sequence() {
    // Drawing each stream's share from its skip-ahead seed reproduces the
    // one-stream sequence exactly.
    let np = 4;
    let per_stream = 64usize;
    let total = 4 * (np * per_stream) as i64;

    let mut sequential = Vec::new();
    let mut s = SEED;
    for _ in 0..(np * per_stream * 4) {
        sequential.push(randlc(&mut s, AMULT));
    }

    let mut parallel = Vec::new();
    for kn in 0..np {
        let mut s = find_my_seed(kn, np, total, SEED, AMULT);
        for _ in 0..(per_stream * 4) {
            parallel.push(randlc(&mut s, AMULT));
        }
    }

    assert_eq!(sequential, parallel);
}
