//! Integer-sort kernel.

pub mod is;
pub use is::{IsBenchmark, IsOutcome, Key};
