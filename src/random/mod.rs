//! Deterministic linear-congruential pseudo-random numbers.
//!
//! The generator produces the 2^46-period sequence used by every kernel in
//! this crate. Reproducibility is bit-exact: the per-class verification
//! constants are only reachable if each draw matches the reference recurrence
//! down to the last ulp, so the arithmetic below must not be reordered or
//! replaced with an integer generator.

pub mod lcg;
pub use lcg::{randlc, vranlc};

pub mod seed;
pub use seed::find_my_seed;
