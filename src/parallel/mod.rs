//! Fixed-size fork-join worker pool with deterministic reductions.
//!
//! Every parallel phase in the kernels is a fan-out over contiguous index
//! chunks followed by a barrier. Floating-point reductions collect one partial
//! per worker and fold them in worker-index order: summation order is part of
//! the verification contract, not a scheduling detail.

use std::ops::Range;

use num_traits::Zero;
use rayon::prelude::*;

use crate::error::BenchError;

/// Environment variable overriding the worker count.
pub const THREADS_ENV: &str = "NASBENCH_THREADS";

/// A dedicated rayon pool driving a fixed number of workers.
///
/// The worker count is fixed at construction and determines the chunk
/// partition of every phase, so two runs with the same count produce
/// bit-identical reductions.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, BenchError> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;
        log::debug!("worker pool sized to {workers} threads");
        Ok(Self { pool, workers })
    }

    /// Pool sized from `NASBENCH_THREADS`, falling back to hardware
    /// concurrency clamped to `cap` when the variable is unset or invalid.
    pub fn from_env(cap: Option<usize>) -> Result<Self, BenchError> {
        let workers = match std::env::var(THREADS_ENV).ok().and_then(|v| v.parse().ok()) {
            Some(n) if n > 0 => n,
            _ => {
                let hw = num_cpus::get();
                cap.map_or(hw, |c| hw.min(c))
            }
        };
        Self::new(workers)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Chunk length that tiles `len` across the pool, last chunk ragged.
    pub fn chunk_len(&self, len: usize) -> usize {
        len.div_ceil(self.workers).max(1)
    }

    /// Run `op` inside the pool so nested rayon iterators use these workers.
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }

    /// Fan out `f` over the chunk partition of `[0, len)` and collect the
    /// per-worker results in worker-index order (the fan-in barrier).
    pub fn run<T, F>(&self, len: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize, Range<usize>) -> T + Send + Sync,
    {
        let ranges = chunk_ranges(len, self.workers);
        self.pool
            .install(|| ranges.into_par_iter().enumerate().map(|(w, r)| f(w, r)).collect())
    }

    /// Ordered reduction: partial results summed in worker-index order.
    pub fn sum<T, F>(&self, len: usize, f: F) -> T
    where
        T: Zero + Send,
        F: Fn(Range<usize>) -> T + Send + Sync,
    {
        self.run(len, |_, r| f(r))
            .into_iter()
            .fold(T::zero(), |acc, part| acc + part)
    }
}

/// Contiguous ceil-div chunk ranges; trailing ranges may be empty so worker
/// indices always align with chunk indices.
pub fn chunk_ranges(len: usize, parts: usize) -> Vec<Range<usize>> {
    let chunk = len.div_ceil(parts).max(1);
    (0..parts)
        .map(|w| {
            let start = (w * chunk).min(len);
            let end = ((w + 1) * chunk).min(len);
            start..end
        })
        .collect()
}

/// Split `buf` into the consecutive extents ending at each of `bounds`
/// (cumulative end offsets). The extents are disjoint, so each may be handed
/// to a different worker.
pub fn split_extents<'a, T>(buf: &'a mut [T], bounds: &[usize]) -> Vec<&'a mut [T]> {
    let mut out = Vec::with_capacity(bounds.len());
    let mut rest = buf;
    let mut prev = 0;
    for &b in bounds {
        let (seg, tail) = std::mem::take(&mut rest).split_at_mut(b - prev);
        out.push(seg);
        rest = tail;
        prev = b;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_ranges_cover_exactly() {
        for (len, parts) in [(10, 3), (7, 7), (5, 8), (0, 4), (64, 1)] {
            let ranges = chunk_ranges(len, parts);
            assert_eq!(ranges.len(), parts);
            let total: usize = ranges.iter().map(|r| r.len()).sum();
            assert_eq!(total, len, "len={len} parts={parts}");
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
    }

    #[test]
    fn run_returns_results_in_worker_order() {
        let pool = WorkerPool::new(4).unwrap();
        let ids = pool.run(100, |w, _| w);
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn ordered_sum_is_deterministic() {
        let pool = WorkerPool::new(3).unwrap();
        let data: Vec<f64> = (0..1000).map(|i| 1.0 / (i as f64 + 1.0)).collect();
        let once = pool.sum(data.len(), |r| r.map(|i| data[i]).sum::<f64>());
        for _ in 0..10 {
            let again = pool.sum(data.len(), |r| r.map(|i| data[i]).sum::<f64>());
            assert_eq!(once.to_bits(), again.to_bits());
        }
    }

    #[test]
    fn split_extents_partitions_buffer() {
        let mut buf = [0u8; 10];
        let segs = split_extents(&mut buf, &[3, 3, 7, 10]);
        let lens: Vec<usize> = segs.iter().map(|s| s.len()).collect();
        assert_eq!(lens, vec![3, 0, 4, 3]);
    }
}
