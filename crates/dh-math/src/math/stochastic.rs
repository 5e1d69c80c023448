//! Row-stochastic matrix operations.

use crate::math::matrix::Matrix;
use rand::Rng;

/// Row-vector by matrix product: `result[i] = Σ_j v[j] · m[j][i]`.
///
/// `v.len()` must equal `m.rows()`; shorter vectors silently drop the
/// remaining rows, which is as unpredictable as it sounds.
pub fn vector_by_matrix(v: &[f64], m: &Matrix) -> Vec<f64> {
    let mut result = vec![0.0; m.cols()];
    for (i, out) in result.iter_mut().enumerate() {
        for (j, &vj) in v.iter().enumerate() {
            *out += vj * m.get(j, i);
        }
    }
    result
}

/// Generate a random row-stochastic matrix.
///
/// Entries are drawn uniformly and shifted by 9.5 before normalization, so
/// every row starts close to uniform with a small random jitter. Useful as a
/// learning starting point that breaks symmetry without committing to any
/// structure.
pub fn random_row_stochastic<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
    let mut m = Matrix::zeros(rows, cols);
    for r in 0..rows {
        let mut sum = 0.0;
        for c in 0..cols {
            let value = rng.random::<f64>() + 9.5;
            m.set(r, c, value);
            sum += value;
        }
        for c in 0..cols {
            m.set(r, c, m.get(r, c) / sum);
        }
    }
    m
}
