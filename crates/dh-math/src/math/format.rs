//! Fixed-precision text encoding for vectors and matrices.
//!
//! The wire form is `rows cols v_1 v_2 …` in row-major order, values printed
//! with two decimals. Vectors are encoded as a single-row matrix.

use crate::math::matrix::Matrix;
use std::fmt::Write as _;

/// Encode a vector as `1 len v_1 … v_len` with two-decimal values.
pub fn format_vector(v: &[f64]) -> String {
    let mut out = format!("1 {}", v.len());
    for value in v {
        let _ = write!(out, " {value:.2}");
    }
    out
}

/// Encode a matrix as `rows cols v_11 … v_rc` with two-decimal values.
pub fn format_matrix(m: &Matrix) -> String {
    let mut out = format!("{} {}", m.rows(), m.cols());
    for value in m.data() {
        let _ = write!(out, " {value:.2}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_header_and_precision() {
        assert_eq!(format_vector(&[0.5, 0.25, 0.125]), "1 3 0.50 0.25 0.12");
    }

    #[test]
    fn matrix_header_and_row_major_order() {
        let m = Matrix::from_rows(vec![vec![0.7, 0.3], vec![0.4, 0.6]]);
        assert_eq!(format_matrix(&m), "2 2 0.70 0.30 0.40 0.60");
    }

    #[test]
    fn empty_vector_still_carries_header() {
        assert_eq!(format_vector(&[]), "1 0");
    }
}
