//! Conjugate Gradient (unpreconditioned) per Saad §6.1, fixed iteration count.
//!
//! Each call runs exactly `CGITMAX` inner iterations and then reports the
//! explicit residual ‖x − A·z‖ from one extra mat-vec, independent of the
//! internally tracked rho. The outer driver accumulates the zeta statistic
//! across repeated calls; zeta is path-dependent on the iteration sequence,
//! so neither the iteration count nor the update order may change.

use std::time::Instant;

use rayon::prelude::*;

use crate::config::Class;
use crate::config::cg::{CGITMAX, CgParams};
use crate::error::BenchError;
use crate::matrix::{CsrMatrix, MatVec, make_matrix};
use crate::parallel::WorkerPool;

/// Dot product with worker-index ordered partial sums.
pub fn dot(pool: &WorkerPool, a: &[f64], b: &[f64]) -> f64 {
    pool.sum(a.len(), |range| range.map(|j| a[j] * b[j]).sum::<f64>())
}

/// One conjugate-gradient call: z ← approximate solution of A·z = x.
///
/// Returns the explicit residual norm ‖x − A·z‖. The degenerate-iteration
/// guards (`d == 0 → alpha = 0`, `rho == 0 → beta = 0`) keep a zero residual
/// from poisoning later iterations with NaN.
pub fn conj_grad<M: MatVec>(
    pool: &WorkerPool,
    a: &M,
    x: &[f64],
    z: &mut [f64],
    p: &mut [f64],
    q: &mut [f64],
    r: &mut [f64],
) -> f64 {
    let n = a.nrows();
    let chunk = pool.chunk_len(n);

    // q = z = 0, r = p = x
    pool.install(|| {
        q.par_chunks_mut(chunk)
            .zip(z.par_chunks_mut(chunk))
            .zip(r.par_chunks_mut(chunk))
            .zip(p.par_chunks_mut(chunk))
            .zip(x.par_chunks(chunk))
            .for_each(|((((qc, zc), rc), pc), xc)| {
                for i in 0..xc.len() {
                    qc[i] = 0.0;
                    zc[i] = 0.0;
                    rc[i] = xc[i];
                    pc[i] = xc[i];
                }
            });
    });

    let mut rho = dot(pool, r, r);

    for _ in 0..CGITMAX {
        a.spmv(pool, p, q);

        let d = dot(pool, p, q);
        let rho0 = rho;
        let alpha = if d == 0.0 { 0.0 } else { rho0 / d };

        // z += alpha·p and r -= alpha·q, accumulating rho = r·r in the same
        // sweep; partials are folded in worker-index order.
        let partials: Vec<f64> = pool.install(|| {
            z.par_chunks_mut(chunk)
                .zip(r.par_chunks_mut(chunk))
                .zip(p.par_chunks(chunk))
                .zip(q.par_chunks(chunk))
                .map(|(((zc, rc), pc), qc)| {
                    let mut local = 0.0;
                    for i in 0..zc.len() {
                        zc[i] += alpha * pc[i];
                        rc[i] -= alpha * qc[i];
                        local += rc[i] * rc[i];
                    }
                    local
                })
                .collect()
        });
        rho = partials.into_iter().sum();

        let beta = if rho0 == 0.0 { 0.0 } else { rho / rho0 };

        pool.install(|| {
            p.par_chunks_mut(chunk)
                .zip(r.par_chunks(chunk))
                .for_each(|(pc, rc)| {
                    for i in 0..pc.len() {
                        pc[i] = rc[i] + beta * pc[i];
                    }
                });
        });
    }

    // explicit residual: r = A·z, then ‖x − r‖
    a.spmv(pool, z, r);
    let r_ro: &[f64] = r;
    let sum = pool.sum(n, |range| {
        range
            .map(|j| {
                let d = x[j] - r_ro[j];
                d * d
            })
            .sum::<f64>()
    });
    sum.sqrt()
}

/// Outcome of one full CG benchmark run.
#[derive(Debug, Clone)]
pub struct CgOutcome {
    pub zeta: f64,
    /// Residual norm of the final timed iteration.
    pub rnorm: f64,
    pub verified: bool,
    pub seconds: f64,
    pub mops: f64,
}

/// The CG benchmark: generated matrix, working vectors, and worker pool.
///
/// All state the reference kept in package-level globals lives here.
pub struct CgBenchmark {
    params: CgParams,
    pool: WorkerPool,
    a: CsrMatrix,
    x: Vec<f64>,
    z: Vec<f64>,
    p: Vec<f64>,
    q: Vec<f64>,
    r: Vec<f64>,
}

impl CgBenchmark {
    /// Generate the class matrix and size the working vectors.
    pub fn new(class: Class, pool: WorkerPool) -> Result<Self, BenchError> {
        let params = CgParams::for_class(class);
        let a = make_matrix(&params)?;
        let n = params.na;
        Ok(Self {
            params,
            pool,
            a,
            x: vec![1.0; n],
            z: vec![0.0; n],
            p: vec![0.0; n],
            q: vec![0.0; n],
            r: vec![0.0; n],
        })
    }

    pub fn params(&self) -> &CgParams {
        &self.params
    }

    /// One outer step: solve, then compute (rnorm, x·z) and normalize
    /// x ← z/‖z‖.
    fn outer_step(&mut self) -> (f64, f64) {
        let rnorm = conj_grad(
            &self.pool,
            &self.a,
            &self.x,
            &mut self.z,
            &mut self.p,
            &mut self.q,
            &mut self.r,
        );

        let norm_temp1 = dot(&self.pool, &self.x, &self.z);
        let norm_temp2 = 1.0 / dot(&self.pool, &self.z, &self.z).sqrt();

        let chunk = self.pool.chunk_len(self.params.na);
        let z = &self.z;
        self.pool.install(|| {
            self.x
                .par_chunks_mut(chunk)
                .zip(z.par_chunks(chunk))
                .for_each(|(xc, zc)| {
                    for i in 0..xc.len() {
                        xc[i] = norm_temp2 * zc[i];
                    }
                });
        });

        (rnorm, norm_temp1)
    }

    /// Run the benchmark: one untimed warm-up call, then `niter` timed calls
    /// accumulating zeta.
    pub fn run(&mut self) -> CgOutcome {
        let shift = self.params.shift;
        let niter = self.params.niter;

        // warm-up call touches every page; its zeta is discarded
        self.x.fill(1.0);
        self.outer_step();

        self.x.fill(1.0);
        let mut zeta = 0.0;
        let mut rnorm = 0.0;

        let started = Instant::now();
        for it in 1..=niter {
            let (rn, norm_temp1) = self.outer_step();
            rnorm = rn;
            zeta = shift + 1.0 / norm_temp1;
            if it == 1 {
                println!("\n   iteration           ||r||                 zeta");
            }
            println!("    {it:5}       {rnorm:20.14e}{zeta:20.13e}");
        }
        let seconds = started.elapsed().as_secs_f64();

        let verified = (zeta - self.params.zeta_verify).abs() < 1.0e-10;
        if !verified {
            log::warn!(
                "zeta {zeta:.13e} differs from reference {:.13e}",
                self.params.zeta_verify
            );
        }

        CgOutcome {
            zeta,
            rnorm,
            verified,
            seconds,
            mops: self.params.mops(seconds),
        }
    }
}
