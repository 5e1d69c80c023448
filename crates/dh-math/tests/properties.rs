//! Property-based tests for dh-math stochastic primitives.
//!
//! Uses proptest to verify algebraic properties hold across many random
//! inputs.

use dh_math::{random_row_stochastic, vector_by_matrix, Matrix};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const TOL: f64 = 1e-9;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Strategy for a probability vector of the given length.
fn prob_vector(len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(0.01..1.0f64, len).prop_map(|raw| {
        let sum: f64 = raw.iter().sum();
        raw.into_iter().map(|v| v / sum).collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Random row-stochastic matrices have rows that sum to 1.
    #[test]
    fn random_row_stochastic_rows_sum_to_one(seed in any::<u64>(), rows in 1usize..6, cols in 1usize..10) {
        let mut rng = StdRng::seed_from_u64(seed);
        let m = random_row_stochastic(rows, cols, &mut rng);
        for r in 0..rows {
            let sum: f64 = m.row(r).iter().sum();
            prop_assert!(approx_eq(sum, 1.0, TOL), "row {} sums to {}", r, sum);
        }
    }

    /// A stochastic vector times a row-stochastic matrix is stochastic.
    #[test]
    fn stochastic_product_stays_stochastic(seed in any::<u64>(), v in prob_vector(4), cols in 1usize..8) {
        let mut rng = StdRng::seed_from_u64(seed);
        let m = random_row_stochastic(v.len(), cols, &mut rng);
        let out = vector_by_matrix(&v, &m);
        let sum: f64 = out.iter().sum();
        prop_assert!(approx_eq(sum, 1.0, TOL), "product sums to {}", sum);
        for &p in &out {
            prop_assert!(p >= 0.0);
        }
    }

    /// Multiplying by the identity matrix returns the input vector.
    #[test]
    fn identity_matrix_is_neutral(v in prob_vector(5)) {
        let mut eye = Matrix::zeros(5, 5);
        for i in 0..5 {
            eye.set(i, i, 1.0);
        }
        let out = vector_by_matrix(&v, &eye);
        for (a, b) in v.iter().zip(out.iter()) {
            prop_assert!(approx_eq(*a, *b, TOL));
        }
    }

    /// The product is linear in the vector argument.
    #[test]
    fn product_is_linear(seed in any::<u64>(), a in prob_vector(3), b in prob_vector(3), scale in 0.1..2.0f64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let m = random_row_stochastic(3, 4, &mut rng);
        let combined: Vec<f64> = a.iter().zip(b.iter()).map(|(x, y)| x + scale * y).collect();
        let lhs = vector_by_matrix(&combined, &m);
        let va = vector_by_matrix(&a, &m);
        let vb = vector_by_matrix(&b, &m);
        for i in 0..lhs.len() {
            prop_assert!(approx_eq(lhs[i], va[i] + scale * vb[i], TOL));
        }
    }
}

#[test]
fn formatting_matches_wire_shape() {
    let m = Matrix::from_rows(vec![vec![0.9, 0.1], vec![0.2, 0.8]]);
    assert_eq!(dh_math::format_matrix(&m), "2 2 0.90 0.10 0.20 0.80");
    assert_eq!(dh_math::format_vector(&[1.0 / 3.0; 3]), "1 3 0.33 0.33 0.33");
}
