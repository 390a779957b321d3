//! Parallel bucket ranking of pseudo-random integer keys.
//!
//! Each ranking iteration histograms the key array into radix buckets
//! (per-worker private counts), prefix-sums the counts into global bucket
//! pointers, scatters the keys bucket-sorted, and turns per-bucket value
//! histograms into cumulative ranks. Five probed positions are checked
//! against per-class reference ranks every iteration; after the last
//! iteration the rank array drives a counting-sort unscramble whose output
//! must be non-decreasing end to end.

use rayon::prelude::*;

use crate::config::is::{IsParams, MAX_ITERATIONS, TEST_ARRAY_SIZE};
use crate::config::{AMULT, Class, SEED};
use crate::error::BenchError;
use crate::parallel::{WorkerPool, split_extents};
use crate::random::{find_my_seed, randlc};
use crate::report::Timer;

/// Key and rank value type. Wide enough for the class-D key count, which
/// overflows `i32` by one.
pub type Key = i64;

/// Timer ids used by [`IsBenchmark::run`].
pub const T_BENCHMARKING: usize = 0;
pub const T_INITIALIZATION: usize = 1;
pub const T_SORTING: usize = 2;
pub const T_TOTAL_EXECUTION: usize = 3;

/// Outcome of one full IS benchmark run.
#[derive(Debug, Clone)]
pub struct IsOutcome {
    /// Partial checks passed plus one for full verification; zeroed when any
    /// check failed.
    pub passed_verification: i64,
    pub verified: bool,
    pub seconds: f64,
    pub mops: f64,
}

/// The IS benchmark: key arrays, bucket state, and worker pool.
///
/// All state the reference kept in package-level globals lives here. The
/// bucket state is rebuilt on every ranking iteration.
pub struct IsBenchmark {
    params: IsParams,
    pool: WorkerPool,
    key_array: Vec<Key>,
    /// Rank workspace, one slot per possible key value.
    key_buff1: Vec<Key>,
    /// Bucket-sorted copy of the key array.
    key_buff2: Vec<Key>,
    /// Per-worker bucket histograms, rebuilt each iteration.
    bucket_size: Vec<Vec<usize>>,
    /// Cumulative key count per bucket after the prefix-sum pass.
    bucket_ptrs: Vec<usize>,
    partial_verify_vals: [Key; TEST_ARRAY_SIZE],
    /// Rank snapshot taken on the final iteration for full verification.
    key_buff_ptr_global: Vec<Key>,
    passed_verification: i64,
}

impl IsBenchmark {
    pub fn new(class: Class, pool: WorkerPool) -> Result<Self, BenchError> {
        let params = IsParams::for_class(class)?;
        let total = params.total_keys();
        let max_key = params.max_key();
        Ok(Self {
            params,
            pool,
            key_array: vec![0; total],
            key_buff1: vec![0; max_key],
            key_buff2: vec![0; total],
            bucket_size: Vec::new(),
            bucket_ptrs: Vec::new(),
            partial_verify_vals: [0; TEST_ARRAY_SIZE],
            key_buff_ptr_global: vec![0; max_key],
            passed_verification: 0,
        })
    }

    pub fn params(&self) -> &IsParams {
        &self.params
    }

    pub fn passed_verification(&self) -> i64 {
        self.passed_verification
    }

    /// Current bucket pointers (cumulative sizes), for inspection.
    pub fn bucket_ptrs(&self) -> &[usize] {
        &self.bucket_ptrs
    }

    /// Rank array as of the last ranking pass.
    pub fn ranks(&self) -> &[Key] {
        &self.key_buff1
    }

    pub fn keys(&self) -> &[Key] {
        &self.key_array
    }

    /// Fill the key array with pseudo-random keys in `[0, max_key)`.
    ///
    /// Worker `w` seeds its chunk by skip-ahead and combines four chained
    /// deviates per key; the result is bit-identical to a sequential pass
    /// over the whole logical stream.
    pub fn create_seq(&mut self) {
        let total = self.params.total_keys();
        let workers = self.pool.workers();
        let k = (self.params.max_key() / 4) as f64;
        let chunk = self.pool.chunk_len(total);

        let key_array = &mut self.key_array;
        self.pool.install(|| {
            key_array
                .par_chunks_mut(chunk)
                .enumerate()
                .for_each(|(w, keys)| {
                    let mut s = find_my_seed(w, workers, (4 * total) as i64, SEED, AMULT);
                    for key in keys.iter_mut() {
                        let mut x = randlc(&mut s, AMULT);
                        x += randlc(&mut s, AMULT);
                        x += randlc(&mut s, AMULT);
                        x += randlc(&mut s, AMULT);
                        *key = (k * x) as Key;
                    }
                });
        });
    }

    /// One ranking iteration over the whole key array.
    pub fn rank(&mut self, iteration: i64) {
        let total = self.params.total_keys();
        let num_buckets = self.params.num_buckets();
        let shift = self.params.bucket_shift();
        let num_bucket_keys = 1usize << shift;
        let chunk = self.pool.chunk_len(total);

        // plant the two iteration sentinels
        self.key_array[iteration as usize] = iteration;
        self.key_array[(iteration + MAX_ITERATIONS) as usize] =
            self.params.max_key() as Key - iteration;

        // snapshot the probed positions before ranking disturbs them
        for i in 0..TEST_ARRAY_SIZE {
            self.partial_verify_vals[i] = self.key_array[self.params.test_index[i]];
        }

        // per-worker bucket histograms
        let key_array = &self.key_array;
        self.bucket_size = self.pool.install(|| {
            key_array
                .par_chunks(chunk)
                .map(|keys| {
                    let mut sizes = vec![0usize; num_buckets];
                    for &key in keys {
                        sizes[(key >> shift) as usize] += 1;
                    }
                    sizes
                })
                .collect()
        });

        // stable partition of each worker's chunk into per-bucket runs
        let bucket_size = &self.bucket_size;
        let grouped: Vec<Vec<Vec<Key>>> = self.pool.install(|| {
            key_array
                .par_chunks(chunk)
                .enumerate()
                .map(|(w, keys)| {
                    let mut runs: Vec<Vec<Key>> = bucket_size[w]
                        .iter()
                        .map(|&s| Vec::with_capacity(s))
                        .collect();
                    for &key in keys {
                        runs[(key >> shift) as usize].push(key);
                    }
                    runs
                })
                .collect()
        });

        // accumulative bucket sizes are the bucket pointers
        let mut bucket_ptrs = Vec::with_capacity(num_buckets);
        let mut acc = 0usize;
        for b in 0..num_buckets {
            acc += self.bucket_size.iter().map(|sizes| sizes[b]).sum::<usize>();
            bucket_ptrs.push(acc);
        }
        self.bucket_ptrs = bucket_ptrs;

        // scatter: bucket extents are disjoint; each receives its workers'
        // runs in worker order, preserving chunk order within a run
        {
            let extents = split_extents(&mut self.key_buff2, &self.bucket_ptrs);
            self.pool.install(|| {
                extents.into_par_iter().enumerate().for_each(|(b, extent)| {
                    let mut at = 0;
                    for runs in &grouped {
                        let run = &runs[b];
                        extent[at..at + run.len()].copy_from_slice(run);
                        at += run.len();
                    }
                });
            });
        }

        // within-bucket ranking: each bucket owns its slice of the rank
        // array, so the histogram and prefix sum run bucket-parallel
        let key_buff1 = &mut self.key_buff1;
        let key_buff2 = &self.key_buff2;
        let bucket_ptrs = &self.bucket_ptrs;
        self.pool.install(|| {
            key_buff1
                .par_chunks_mut(num_bucket_keys)
                .enumerate()
                .for_each(|(b, ranks)| {
                    ranks.fill(0);
                    let k1 = b * num_bucket_keys;
                    let m = if b > 0 { bucket_ptrs[b - 1] } else { 0 };
                    for &key in &key_buff2[m..bucket_ptrs[b]] {
                        ranks[key as usize - k1] += 1;
                    }
                    // cumulative ranks, floored by the lesser-bucket total
                    ranks[0] += m as Key;
                    for i in 1..ranks.len() {
                        ranks[i] += ranks[i - 1];
                    }
                });
        });

        self.partial_verify(iteration);

        if iteration == MAX_ITERATIONS {
            self.key_buff_ptr_global.copy_from_slice(&self.key_buff1);
        }
    }

    /// Check the five probed positions against the class reference table.
    fn partial_verify(&mut self, iteration: i64) {
        let total = self.params.total_keys() as Key;
        for i in 0..TEST_ARRAY_SIZE {
            let k = self.partial_verify_vals[i];
            if 0 < k && k <= total - 1 {
                let key_rank = self.key_buff1[k as usize - 1];
                if key_rank == self.params.expected_rank(i, iteration) {
                    self.passed_verification += 1;
                } else {
                    println!("Failed partial verification: iteration {iteration}, test key {i}");
                }
            }
        }
    }

    /// Unscramble every key back into sorted position via the saved rank
    /// array, then count adjacent out-of-order pairs.
    ///
    /// Rank-array ownership is partitioned by bucket key-range and the
    /// destination array by bucket extent, so the decrement-and-place loop
    /// runs bucket-parallel without locks.
    pub fn full_verify(&mut self) {
        let num_bucket_keys = 1usize << self.params.bucket_shift();

        {
            let ranks_all = &mut self.key_buff_ptr_global;
            let dests = split_extents(&mut self.key_array, &self.bucket_ptrs);
            let key_buff2 = &self.key_buff2;
            let bucket_ptrs = &self.bucket_ptrs;
            self.pool.install(|| {
                ranks_all
                    .par_chunks_mut(num_bucket_keys)
                    .zip(dests.into_par_iter())
                    .enumerate()
                    .for_each(|(b, (ranks, dest))| {
                        let k1 = b * num_bucket_keys;
                        let m = if b > 0 { bucket_ptrs[b - 1] } else { 0 };
                        for &key in &key_buff2[m..bucket_ptrs[b]] {
                            let idx = key as usize - k1;
                            ranks[idx] -= 1;
                            let pos = ranks[idx] as usize;
                            dest[pos - m] = key;
                        }
                    });
            });
        }

        let key_array = &self.key_array;
        let out_of_order = self
            .pool
            .install(|| key_array.par_windows(2).filter(|w| w[0] > w[1]).count());

        if out_of_order != 0 {
            println!("Full_verify: number of keys out of sort: {out_of_order}");
        } else {
            self.passed_verification += 1;
        }
    }

    /// Run the benchmark: key generation, one untimed ranking iteration,
    /// the timed iteration loop, and full verification.
    pub fn run(&mut self, timer: &mut Timer, timers_on: bool) -> IsOutcome {
        timer.clear(T_BENCHMARKING);
        if timers_on {
            timer.clear(T_INITIALIZATION);
            timer.clear(T_SORTING);
            timer.clear(T_TOTAL_EXECUTION);
            timer.start(T_TOTAL_EXECUTION);
            timer.start(T_INITIALIZATION);
        }

        self.create_seq();

        if timers_on {
            timer.stop(T_INITIALIZATION);
        }

        // one iteration for free to settle allocation and page tables
        self.rank(1);
        self.passed_verification = 0;

        if self.params.class != Class::S {
            println!("\n   iteration");
        }

        timer.start(T_BENCHMARKING);
        for iteration in 1..=MAX_ITERATIONS {
            if self.params.class != Class::S {
                println!("        {iteration}");
            }
            self.rank(iteration);
        }
        timer.stop(T_BENCHMARKING);
        let seconds = timer.read(T_BENCHMARKING);

        if timers_on {
            timer.start(T_SORTING);
        }
        self.full_verify();
        if timers_on {
            timer.stop(T_SORTING);
            timer.stop(T_TOTAL_EXECUTION);
        }

        if self.passed_verification != TEST_ARRAY_SIZE as i64 * MAX_ITERATIONS + 1 {
            log::warn!(
                "verification incomplete: {} of {} checks passed",
                self.passed_verification,
                TEST_ARRAY_SIZE as i64 * MAX_ITERATIONS + 1
            );
            self.passed_verification = 0;
        }

        IsOutcome {
            passed_verification: self.passed_verification,
            verified: self.passed_verification > 0,
            seconds,
            mops: self.params.mops(seconds),
        }
    }
}
