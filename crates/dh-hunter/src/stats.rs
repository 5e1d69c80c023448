//! Running match statistics.

use serde::Serialize;

/// Counters accumulated over a match, reported through the log stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    /// Birds actually hit.
    pub hits: usize,
    /// Shots taken.
    pub shots: usize,
    /// Species guesses that matched the revealed truth.
    pub correct_guesses: usize,
    /// Species guesses submitted.
    pub guesses: usize,
}

impl MatchStats {
    /// Fraction of shots that hit, or 0 before the first shot.
    pub fn hit_rate(&self) -> f64 {
        if self.shots == 0 {
            0.0
        } else {
            self.hits as f64 / self.shots as f64
        }
    }

    /// Fraction of guesses that were right, or 0 before the first guess.
    pub fn guess_accuracy(&self) -> f64 {
        if self.guesses == 0 {
            0.0
        } else {
            self.correct_guesses as f64 / self.guesses as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_are_zero_before_any_activity() {
        let stats = MatchStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.guess_accuracy(), 0.0);
    }

    #[test]
    fn rates_divide_counters() {
        let stats = MatchStats {
            hits: 3,
            shots: 4,
            correct_guesses: 5,
            guesses: 10,
        };
        assert!((stats.hit_rate() - 0.75).abs() < 1e-12);
        assert!((stats.guess_accuracy() - 0.5).abs() < 1e-12);
    }
}
