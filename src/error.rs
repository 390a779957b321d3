use thiserror::Error;

use crate::config::Class;

// Unified error type for nasbench

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("space for matrix elements exceeded in sparse: nza={nza}, nzmax={nzmax}")]
    MatrixCapacity { nza: usize, nzmax: usize },
    #[error("internal error in sparse assembly: row {0} has no free or matching slot")]
    MatrixAssembly(usize),
    #[error("class {class} is not defined for the {kernel} kernel")]
    UnsupportedClass { kernel: &'static str, class: Class },
    #[error("worker pool construction failed: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
