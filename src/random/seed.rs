//! Skip-ahead seeding for parallel streams.

use super::lcg::randlc;

/// Seed for stream `kn` of `np`, as if the caller had drawn its share of a
/// logically sequential run of `nn` total samples.
///
/// The stream's starting point is `kn · 4·ceil(nn/4/np)` draws into the
/// sequence; the state after that many steps is computed in O(log skip) by
/// binary exponentiation of the multiplier (square while the remaining count
/// is even, fold one multiplier in while it is odd).
pub fn find_my_seed(kn: usize, np: usize, nn: i64, s: f64, a: f64) -> f64 {
    if kn == 0 {
        return s;
    }

    let mq = (nn / 4 + np as i64 - 1) / np as i64;
    let nq = mq * 4 * kn as i64; // number of draws to skip

    let mut t1 = s;
    let mut t2 = a;
    let mut kk = nq;

    while kk > 1 {
        let ik = kk / 2;
        if 2 * ik == kk {
            let t2_prev = t2;
            randlc(&mut t2, t2_prev);
            kk = ik;
        } else {
            randlc(&mut t1, t2);
            kk -= 1;
        }
    }
    randlc(&mut t1, t2);

    t1
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: f64 = 314159265.0;
    const AMULT: f64 = 1220703125.0;

    #[test]
    fn stream_zero_is_the_original_seed() {
        assert_eq!(find_my_seed(0, 8, 1 << 20, SEED, AMULT), SEED);
    }

    #[test]
    fn skip_ahead_matches_sequential_advance() {
        // 4 streams over 4·256 total samples: stream k starts 4·64·k draws in.
        let np = 4;
        let total = 4 * 256i64;
        for kn in 0..np {
            let fast = find_my_seed(kn, np, total, SEED, AMULT);

            let skip = kn as i64 * (total / np as i64);
            let mut slow = SEED;
            for _ in 0..skip {
                randlc(&mut slow, AMULT);
            }
            assert_eq!(fast, slow, "stream {kn} seed mismatch");
        }
    }

    #[test]
    fn skip_ahead_with_ragged_partition() {
        // np does not divide nn/4; the skip count rounds the chunk up.
        let np = 3;
        let nn = 4 * 100i64;
        for kn in 0..np {
            let fast = find_my_seed(kn, np, nn, SEED, AMULT);

            let chunk = (nn / 4 + np as i64 - 1) / np as i64;
            let mut slow = SEED;
            for _ in 0..(4 * chunk * kn as i64) {
                randlc(&mut slow, AMULT);
            }
            assert_eq!(fast, slow, "stream {kn} seed mismatch");
        }
    }
}
