//! The `randlc` recurrence x_{k+1} = a·x_k mod 2^46.
//!
//! Both state and multiplier are 46-bit integers carried in f64 mantissas.
//! Every multiply is decomposed into 23-bit halves so that no intermediate
//! product exceeds 46 bits; the splits keep the arithmetic exact under IEEE
//! doubles and therefore identical on every conforming platform.

/// 2^-23, 2^-46, 2^23, 2^46 as exact doubles.
const R23: f64 = 1.1920928955078125e-7;
const R46: f64 = R23 * R23;
const T23: f64 = 8_388_608.0;
const T46: f64 = T23 * T23;

/// Advance the state once and return a uniform deviate in (0, 1).
///
/// `x` holds the 46-bit state, `a` the 46-bit multiplier.
pub fn randlc(x: &mut f64, a: f64) -> f64 {
    // Split a and x into 23-bit halves: a = 2^23·a1 + a2, x = 2^23·x1 + x2.
    let t1 = R23 * a;
    let a1 = t1.trunc();
    let a2 = a - T23 * a1;

    let t1 = R23 * *x;
    let x1 = t1.trunc();
    let x2 = *x - T23 * x1;

    // z = a1·x2 + a2·x1 (mod 2^23), then a·x = 2^23·z + a2·x2 (mod 2^46).
    let t1 = a1 * x2 + a2 * x1;
    let t2 = (R23 * t1).trunc();
    let z = t1 - T23 * t2;
    let t3 = T23 * z + a2 * x2;
    let t4 = (R46 * t3).trunc();
    *x = t3 - T46 * t4;

    R46 * *x
}

/// Fill `y` with `n` consecutive deviates, advancing the seed once per draw.
///
/// Equivalent to `n` calls of [`randlc`] with the same seed, batched so the
/// multiplier split is hoisted out of the loop.
pub fn vranlc(n: usize, x_seed: &mut f64, a: f64, y: &mut [f64]) {
    let mut x = *x_seed;

    let t1 = R23 * a;
    let a1 = t1.trunc();
    let a2 = a - T23 * a1;

    for yi in y.iter_mut().take(n) {
        let t1 = R23 * x;
        let x1 = t1.trunc();
        let x2 = x - T23 * x1;

        let t1 = a1 * x2 + a2 * x1;
        let t2 = (R23 * t1).trunc();
        let z = t1 - T23 * t2;
        let t3 = T23 * z + a2 * x2;
        let t4 = (R46 * t3).trunc();
        x = t3 - T46 * t4;
        *yi = R46 * x;
    }

    *x_seed = x;
}
