// Compressed sparse row storage.

use rayon::prelude::*;

use super::MatVec;
use crate::parallel::WorkerPool;

/// A square sparse matrix in CSR form.
///
/// `row_ptr` is non-decreasing with `row_ptr[0] == 0`; within each row the
/// column indices are strictly increasing (assembly sums duplicates rather
/// than keeping them).
pub struct CsrMatrix {
    n: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Build a CSR from raw row-ptr, col-idx, and values.
    pub fn from_parts(n: usize, row_ptr: Vec<usize>, col_idx: Vec<usize>, values: Vec<f64>) -> Self {
        debug_assert_eq!(row_ptr.len(), n + 1);
        debug_assert_eq!(row_ptr[0], 0);
        debug_assert_eq!(*row_ptr.last().unwrap(), col_idx.len());
        debug_assert_eq!(col_idx.len(), values.len());
        Self {
            n,
            row_ptr,
            col_idx,
            values,
        }
    }

    pub fn nrows(&self) -> usize {
        self.n
    }

    pub fn ncols(&self) -> usize {
        self.n
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Column indices and values of row `i`.
    pub fn row(&self, i: usize) -> (&[usize], &[f64]) {
        let span = self.row_ptr[i]..self.row_ptr[i + 1];
        (&self.col_idx[span.clone()], &self.values[span])
    }
}

impl MatVec for CsrMatrix {
    fn nrows(&self) -> usize {
        self.n
    }

    /// Row-parallel product over contiguous row chunks. Each row's dot runs
    /// sequentially in column order, so the result does not depend on how the
    /// chunks are scheduled.
    fn spmv(&self, pool: &WorkerPool, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.n);
        let chunk = pool.chunk_len(self.n);
        pool.install(|| {
            y.par_chunks_mut(chunk).enumerate().for_each(|(c, rows)| {
                let base = c * chunk;
                for (i, yi) in rows.iter_mut().enumerate() {
                    let j = base + i;
                    let mut sum = 0.0;
                    for k in self.row_ptr[j]..self.row_ptr[j + 1] {
                        sum += self.values[k] * x[self.col_idx[k]];
                    }
                    *yi = sum;
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> WorkerPool {
        WorkerPool::new(2).unwrap()
    }

    #[test]
    fn identity_spmv() {
        // 3×3 identity in CSR: row_ptr=[0,1,2,3], col_idx=[0,1,2], vals=[1,1,1]
        let m = CsrMatrix::from_parts(3, vec![0, 1, 2, 3], vec![0, 1, 2], vec![1.0, 1.0, 1.0]);
        let x = vec![2.0, 3.0, 5.0];
        let mut y = vec![0.0; 3];
        m.spmv(&pool(), &x, &mut y);
        assert_eq!(y, x);
    }

    #[test]
    fn simple_pattern() {
        // [[1,2,0],[0,3,4],[0,0,5]]
        let m = CsrMatrix::from_parts(
            3,
            vec![0, 2, 4, 5],
            vec![0, 1, 1, 2, 2],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
        );
        let x = vec![1.0, 1.0, 1.0];
        let mut y = vec![0.0; 3];
        m.spmv(&pool(), &x, &mut y);
        assert_eq!(y, vec![3.0, 7.0, 5.0]);
    }

    #[test]
    fn row_accessor_matches_layout() {
        let m = CsrMatrix::from_parts(
            2,
            vec![0, 2, 3],
            vec![0, 1, 1],
            vec![4.0, 1.0, 3.0],
        );
        let (cols, vals) = m.row(0);
        assert_eq!(cols, &[0, 1]);
        assert_eq!(vals, &[4.0, 1.0]);
        assert_eq!(m.nnz(), 3);
    }
}
