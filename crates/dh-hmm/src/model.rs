//! The HMM model type and its numerical algorithms.
//!
//! # Model
//!
//! - `N` hidden states, `K` observable symbols
//! - `pi[i]`: initial state distribution (length N)
//! - `A[i][j]`: state transition matrix (N×N, rows sum to 1)
//! - `B[i][k]`: emission matrix (N×K, rows sum to 1)
//!
//! The forward/backward recursions are scaled per time step: each raw alpha
//! row sum is inverted into a scale factor `c[t]`, and the sequence
//! log-likelihood is `-Σ_t ln c[t]`.
//!
//! # Numerical contract
//!
//! No validation is performed anywhere in this module. Observation sequences
//! must be non-empty with every symbol in `[0, K)`, and parameter rows must
//! be probability distributions; violations produce unspecified numeric
//! results (NaN/infinity propagation) rather than errors. Re-estimation on a
//! sequence that starves a state of occupancy divides by zero and writes the
//! resulting NaN back into the model uncorrected. Callers that want a
//! well-formed model keep their inputs well-formed.

use dh_math::{random_row_stochastic, vector_by_matrix, Matrix};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A discrete hidden Markov model.
///
/// Immutable during evaluation and prediction; mutated only by
/// [`learn`](Hmm::learn).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hmm {
    n: usize,
    k: usize,
    pi: Vec<f64>,
    a: Matrix,
    b: Matrix,
}

impl Hmm {
    /// Construct a model from explicit parameters.
    ///
    /// `pi.len()` determines the state count and `b.cols()` the symbol count.
    pub fn from_parts(pi: Vec<f64>, a: Matrix, b: Matrix) -> Self {
        let n = pi.len();
        let k = b.cols();
        Self { n, k, pi, a, b }
    }

    /// Construct a model with randomized row-stochastic parameters, the
    /// usual starting point for [`learn`](Hmm::learn).
    pub fn randomized<R: Rng + ?Sized>(n: usize, k: usize, rng: &mut R) -> Self {
        let a = random_row_stochastic(n, n, rng);
        let b = random_row_stochastic(n, k, rng);
        let pi = random_row_stochastic(1, n, rng).row(0).to_vec();
        Self { n, k, pi, a, b }
    }

    /// Number of hidden states.
    pub fn n_states(&self) -> usize {
        self.n
    }

    /// Number of observable symbols.
    pub fn n_symbols(&self) -> usize {
        self.k
    }

    /// Initial state distribution.
    pub fn initial(&self) -> &[f64] {
        &self.pi
    }

    /// State transition matrix.
    pub fn transition(&self) -> &Matrix {
        &self.a
    }

    /// Emission matrix.
    pub fn emission(&self) -> &Matrix {
        &self.b
    }

    /// Log-probability of the observation sequence under this model.
    ///
    /// Runs the scaled forward pass and returns `-Σ_t ln c[t]`. A degenerate
    /// pass (zero-probability sequence) accumulates a non-finite value, which
    /// collapses to `f64::NEG_INFINITY` instead of surfacing as infinity.
    pub fn evaluate(&self, observations: &[usize]) -> f64 {
        let t_len = observations.len();
        let mut alpha = vec![vec![0.0; self.n]; t_len];
        let mut c = vec![0.0; t_len];
        self.forward(observations, &mut alpha, &mut c);

        let log_prob = -c.iter().map(|ct| ct.ln()).sum::<f64>();
        if log_prob.is_finite() {
            log_prob
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Symbol distribution for the first observation, from the prior alone:
    /// `pi · A · B`.
    pub fn next_distribution(&self) -> Vec<f64> {
        vector_by_matrix(&vector_by_matrix(&self.pi, &self.a), &self.b)
    }

    /// Symbol distribution for the step after the given sequence,
    /// `P(O_{T+1} | O_{1:T})`, computed from the final scaled forward row.
    pub fn next_distribution_after(&self, observations: &[usize]) -> Vec<f64> {
        let t_len = observations.len();
        let mut alpha = vec![vec![0.0; self.n]; t_len];
        let mut c = vec![0.0; t_len];
        self.forward(observations, &mut alpha, &mut c);

        let last = &alpha[t_len - 1];
        let mut dist = vec![0.0; self.k];
        for (sym, out) in dist.iter_mut().enumerate() {
            for i in 0..self.n {
                let mut mass = 0.0;
                for (j, &aj) in last.iter().enumerate() {
                    mass += self.a.get(j, i) * aj;
                }
                *out += mass * self.b.get(i, sym);
            }
        }
        dist
    }

    /// Most likely hidden state sequence for the observations (Viterbi, log
    /// domain). Returns one state index per time step.
    ///
    /// Ties are broken by strict `>` comparison, so the lowest-index
    /// competitor wins, both for per-step backpointers and for the terminal
    /// state.
    pub fn decode(&self, observations: &[usize]) -> Vec<usize> {
        let t_len = observations.len();
        let mut delta = vec![vec![0.0f64; self.n]; t_len];
        let mut back = vec![vec![0usize; self.n]; t_len];

        for i in 0..self.n {
            delta[0][i] = self.pi[i].ln() + self.b.get(i, observations[0]).ln();
        }

        for t in 1..t_len {
            for i in 0..self.n {
                let mut best = delta[t - 1][0] + self.a.get(0, i).ln();
                let mut arg = 0;
                for j in 1..self.n {
                    let candidate = delta[t - 1][j] + self.a.get(j, i).ln();
                    if candidate > best {
                        best = candidate;
                        arg = j;
                    }
                }
                delta[t][i] = best + self.b.get(i, observations[t]).ln();
                back[t][i] = arg;
            }
        }

        let mut path = vec![0usize; t_len];
        let mut last = 0;
        for i in 1..self.n {
            if delta[t_len - 1][i] > delta[t_len - 1][last] {
                last = i;
            }
        }
        path[t_len - 1] = last;
        for t in (0..t_len - 1).rev() {
            path[t] = back[t + 1][path[t + 1]];
        }
        path
    }

    /// Re-estimate the model parameters from one observation sequence with
    /// Baum-Welch, running at most `max_iters` iterations.
    ///
    /// The stopping test is strict improvement: the loop ends as soon as an
    /// iteration's log-likelihood fails to exceed the previous one's (this
    /// also catches NaN), or when the iteration budget runs out. No smoothing
    /// is applied to the re-estimated rows.
    pub fn learn(&mut self, observations: &[usize], max_iters: usize) {
        let t_len = observations.len();
        let n = self.n;
        let mut alpha = vec![vec![0.0; n]; t_len];
        let mut beta = vec![vec![0.0; n]; t_len];
        let mut gamma = vec![vec![0.0; n]; t_len];
        let mut digamma = vec![vec![vec![0.0; n]; n]; t_len];

        let mut c = vec![0.0; t_len];
        let mut log_prob = f64::NEG_INFINITY;
        let mut iters = 0;

        loop {
            let old_log_prob = log_prob;

            self.forward(observations, &mut alpha, &mut c);
            self.backward(observations, &mut beta, &c);

            // Joint responsibilities for t < T-1; the final step has no
            // transition beyond the sequence end.
            for t in 0..t_len - 1 {
                let next_sym = observations[t + 1];
                for i in 0..n {
                    gamma[t][i] = 0.0;
                    for j in 0..n {
                        digamma[t][i][j] = alpha[t][i]
                            * self.a.get(i, j)
                            * self.b.get(j, next_sym)
                            * beta[t + 1][j];
                        gamma[t][i] += digamma[t][i][j];
                    }
                }
            }
            for i in 0..n {
                gamma[t_len - 1][i] = alpha[t_len - 1][i];
            }

            // Re-estimate pi.
            for i in 0..n {
                self.pi[i] = gamma[0][i];
            }

            // Re-estimate A.
            for i in 0..n {
                let mut denom = 0.0;
                for row in gamma.iter().take(t_len - 1) {
                    denom += row[i];
                }
                for j in 0..n {
                    let mut numer = 0.0;
                    for step in digamma.iter().take(t_len - 1) {
                        numer += step[i][j];
                    }
                    self.a.set(i, j, numer / denom);
                }
            }

            // Re-estimate B.
            for i in 0..n {
                let mut denom = 0.0;
                for row in gamma.iter() {
                    denom += row[i];
                }
                for sym in 0..self.k {
                    let mut numer = 0.0;
                    for (t, row) in gamma.iter().enumerate() {
                        if observations[t] == sym {
                            numer += row[i];
                        }
                    }
                    self.b.set(i, sym, numer / denom);
                }
            }

            log_prob = -c.iter().map(|ct| ct.ln()).sum::<f64>();
            iters += 1;
            if iters >= max_iters || !(log_prob > old_log_prob) {
                break;
            }
        }

        debug!(iters, log_prob, "baum-welch finished");
        if self.pi.iter().any(|v| !v.is_finite())
            || self.a.data().iter().any(|v| !v.is_finite())
            || self.b.data().iter().any(|v| !v.is_finite())
        {
            warn!("re-estimation wrote non-finite parameters (zero-occupancy state)");
        }
    }

    /// Scaled forward pass. Fills `alpha` with the per-step scaled state
    /// probabilities and `c` with the scale factors. A raw row sum of exactly
    /// zero leaves `c[t]` at zero rather than dividing.
    fn forward(&self, observations: &[usize], alpha: &mut [Vec<f64>], c: &mut [f64]) {
        let t_len = observations.len();

        c[0] = 0.0;
        for i in 0..self.n {
            alpha[0][i] = self.pi[i] * self.b.get(i, observations[0]);
            c[0] += alpha[0][i];
        }
        if c[0] != 0.0 {
            c[0] = 1.0 / c[0];
        }
        for i in 0..self.n {
            alpha[0][i] *= c[0];
        }

        for t in 1..t_len {
            c[t] = 0.0;
            for i in 0..self.n {
                let mut sum = 0.0;
                for j in 0..self.n {
                    sum += alpha[t - 1][j] * self.a.get(j, i);
                }
                alpha[t][i] = sum * self.b.get(i, observations[t]);
                c[t] += alpha[t][i];
            }
            if c[t] != 0.0 {
                c[t] = 1.0 / c[t];
            }
            for i in 0..self.n {
                alpha[t][i] *= c[t];
            }
        }
    }

    /// Backward pass using the scale factors from [`forward`](Hmm::forward):
    /// `beta[T-1][i] = c[T-1]`, then the scaled reverse recursion.
    fn backward(&self, observations: &[usize], beta: &mut [Vec<f64>], c: &[f64]) {
        let t_len = observations.len();

        for i in 0..self.n {
            beta[t_len - 1][i] = c[t_len - 1];
        }

        for t in (0..t_len - 1).rev() {
            let next_sym = observations[t + 1];
            for i in 0..self.n {
                let mut sum = 0.0;
                for j in 0..self.n {
                    sum += self.a.get(i, j) * self.b.get(j, next_sym) * beta[t + 1][j];
                }
                beta[t][i] = sum * c[t];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    /// The two-state model used throughout: state 0 favors symbol 0, state 1
    /// favors symbol 1.
    fn reference_model() -> Hmm {
        Hmm::from_parts(
            vec![0.5, 0.5],
            Matrix::from_rows(vec![vec![0.7, 0.3], vec![0.4, 0.6]]),
            Matrix::from_rows(vec![vec![0.9, 0.1], vec![0.2, 0.8]]),
        )
    }

    #[test]
    fn evaluate_matches_hand_computed_likelihood() {
        // alpha_0 = [0.45, 0.10], c_0 = 1/0.55
        // alpha_1 raw = [0.064545, 0.283636], c_1 = 1/0.348182
        // ll = ln(0.55) + ln(0.348182) ≈ -1.653
        let model = reference_model();
        let ll = model.evaluate(&[0, 1]);
        assert!(approx_eq(ll, -1.653, 1e-3), "got {ll}");
    }

    #[test]
    fn evaluate_is_neg_infinity_for_impossible_sequence() {
        // No state can emit symbol 1 first: the scale factor stays zero and
        // the non-finite guard kicks in.
        let model = Hmm::from_parts(
            vec![0.5, 0.5],
            Matrix::from_rows(vec![vec![0.5, 0.5], vec![0.5, 0.5]]),
            Matrix::from_rows(vec![vec![1.0, 0.0], vec![1.0, 0.0]]),
        );
        assert_eq!(model.evaluate(&[1, 0]), f64::NEG_INFINITY);
    }

    #[test]
    fn decode_matches_hand_computed_path() {
        let model = reference_model();
        assert_eq!(model.decode(&[0, 1]), vec![0, 1]);
    }

    #[test]
    fn decode_path_length_and_range() {
        let model = reference_model();
        let obs = [0, 1, 0, 0, 1, 1, 0, 1];
        let path = model.decode(&obs);
        assert_eq!(path.len(), obs.len());
        for &s in &path {
            assert!(s < model.n_states());
        }
    }

    #[test]
    fn decode_ties_fall_to_lowest_state_index() {
        // Fully symmetric model: every candidate ties, so strict > keeps
        // state 0 everywhere.
        let model = Hmm::from_parts(
            vec![0.5, 0.5],
            Matrix::from_rows(vec![vec![0.5, 0.5], vec![0.5, 0.5]]),
            Matrix::from_rows(vec![vec![0.5, 0.5], vec![0.5, 0.5]]),
        );
        assert_eq!(model.decode(&[0, 1, 0]), vec![0, 0, 0]);
    }

    #[test]
    fn next_distribution_is_pi_a_b() {
        let model = reference_model();
        let dist = model.next_distribution();
        // pi·A = [0.55, 0.45]; ·B = [0.585, 0.415]
        assert!(approx_eq(dist[0], 0.585, 1e-12));
        assert!(approx_eq(dist[1], 0.415, 1e-12));

        let chained = vector_by_matrix(
            &vector_by_matrix(model.initial(), model.transition()),
            model.emission(),
        );
        for (a, b) in dist.iter().zip(chained.iter()) {
            assert!(approx_eq(*a, *b, 1e-15));
        }
    }

    #[test]
    fn next_distribution_after_is_a_distribution() {
        let model = reference_model();
        let dist = model.next_distribution_after(&[0, 1, 1, 0]);
        let sum: f64 = dist.iter().sum();
        assert!(approx_eq(sum, 1.0, 1e-9), "sums to {sum}");
        for &p in &dist {
            assert!(p >= 0.0);
        }
    }

    #[test]
    fn learn_keeps_rows_stochastic() {
        let mut model = reference_model();
        let obs = [0, 0, 1, 0, 1, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0];
        model.learn(&obs, 30);

        let pi_sum: f64 = model.initial().iter().sum();
        assert!(approx_eq(pi_sum, 1.0, 1e-6));
        for i in 0..model.n_states() {
            let a_sum: f64 = model.transition().row(i).iter().sum();
            let b_sum: f64 = model.emission().row(i).iter().sum();
            assert!(approx_eq(a_sum, 1.0, 1e-6), "A row {i} sums to {a_sum}");
            assert!(approx_eq(b_sum, 1.0, 1e-6), "B row {i} sums to {b_sum}");
        }
    }

    #[test]
    fn learn_improves_likelihood_monotonically() {
        let mut model = Hmm::from_parts(
            vec![0.6, 0.4],
            Matrix::from_rows(vec![vec![0.7, 0.3], vec![0.4, 0.6]]),
            Matrix::from_rows(vec![vec![0.6, 0.4], vec![0.3, 0.7]]),
        );
        let obs = [0, 0, 1, 0, 1, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0];

        let mut previous = model.evaluate(&obs);
        for _ in 0..10 {
            model.learn(&obs, 1);
            let current = model.evaluate(&obs);
            assert!(
                current >= previous - 1e-10,
                "likelihood decreased: {previous} -> {current}"
            );
            previous = current;
        }
    }

    #[test]
    fn learn_from_random_start_fits_the_sequence() {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut model = Hmm::randomized(2, 2, &mut rng);
        let obs: Vec<usize> = (0..40).map(|t| usize::from(t % 4 == 3)).collect();

        let before = model.evaluate(&obs);
        model.learn(&obs, 100);
        let after = model.evaluate(&obs);
        assert!(after >= before, "learning lost likelihood: {before} -> {after}");
        assert!(after.is_finite());
    }

    #[test]
    fn randomized_init_is_row_stochastic() {
        let mut rng = StdRng::seed_from_u64(99);
        let model = Hmm::randomized(3, 9, &mut rng);
        assert_eq!(model.n_states(), 3);
        assert_eq!(model.n_symbols(), 9);

        let pi_sum: f64 = model.initial().iter().sum();
        assert!(approx_eq(pi_sum, 1.0, 1e-12));
        for i in 0..3 {
            let a_sum: f64 = model.transition().row(i).iter().sum();
            let b_sum: f64 = model.emission().row(i).iter().sum();
            assert!(approx_eq(a_sum, 1.0, 1e-12));
            assert!(approx_eq(b_sum, 1.0, 1e-12));
        }
    }
}
