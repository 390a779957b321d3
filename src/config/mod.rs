//! Problem-class configuration tables.
//!
//! Each kernel's dimensions, iteration counts, and verification constants are
//! fixed by a named problem class. The tables are transcriptions of the
//! reference constants; none of the values are derivable and none may be
//! recomputed.

/// Initial PRNG state and multiplier shared by the kernels.
pub const SEED: f64 = 314159265.0;
pub const AMULT: f64 = 1220703125.0;

pub mod class;
pub use class::Class;

pub mod cg;
pub use cg::CgParams;

pub mod is;
pub use is::IsParams;
