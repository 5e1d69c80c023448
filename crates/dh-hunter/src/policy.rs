//! The per-turn shooting and guessing policy.
//!
//! # Round lifecycle
//!
//! Each time step the harness calls [`Hunter::shoot`], which either passes or
//! commits to a single `(bird, predicted move)` shot. At the end of a round
//! [`Hunter::guess`] submits one species guess per bird, and once the true
//! labels come back [`Hunter::reveal`] trains one model per revealed bird and
//! grows the registry, the sole path by which the classifier learns.
//!
//! # Shot selection
//!
//! A shot needs three things: enough of the round observed to train on,
//! a species classification that is neither unknown nor protected, and a
//! predicted next-move probability above the confidence threshold. The
//! threshold trades abstaining on good opportunities against shooting at a
//! protected or mis-modeled bird; protected-species avoidance is a hard skip
//! on top of it, never a soft penalty.

use crate::registry::SpeciesRegistry;
use crate::species::{Move, Species};
use crate::state::{Action, Deadline, GameState};
use crate::stats::MatchStats;
use dh_hmm::Hmm;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Baum-Welch needs at least two observations before the first re-estimation
/// makes sense.
const MIN_OBSERVATIONS: usize = 2;

/// Tunable knobs for the hunter, collapsing the historical policy variants
/// into one parameterized component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Time steps per round.
    pub turns_per_round: usize,
    /// Fraction of the round's step budget to spend observing before any
    /// shot is considered.
    pub observation_window: f64,
    /// Minimum predicted next-move probability for a shot.
    pub confidence_threshold: f64,
    /// Baum-Welch iteration cap for the per-bird ad-hoc model.
    pub shoot_max_iters: usize,
    /// Baum-Welch iteration cap for reveal-time ensemble models.
    pub guess_max_iters: usize,
    /// State count for the ad-hoc model trained on a single bird. Kept small:
    /// one bird's partial history is little data.
    pub adhoc_state_count: usize,
    /// State count for models registered into the species ensembles.
    pub ensemble_state_count: usize,
    /// Score next moves with the species ensemble pooled alongside the
    /// ad-hoc model, instead of the ad-hoc model alone.
    pub pool_species_models: bool,
    /// Species guessed for every bird in the first round, when no trained
    /// models exist anywhere and a wrong guess still buys labeled data.
    pub default_guess: Species,
    /// Protected species: birds classified as this are never shot at.
    pub protected: Species,
}

impl PolicyConfig {
    /// Score each bird with its ad-hoc model alone, using a larger state
    /// count and a deep iteration budget.
    pub fn lone_model() -> Self {
        Self {
            turns_per_round: 100,
            observation_window: 1.0,
            confidence_threshold: 0.75,
            shoot_max_iters: 7000,
            guess_max_iters: 7000,
            adhoc_state_count: 5,
            ensemble_state_count: 1,
            pool_species_models: false,
            default_guess: Species::Pigeon,
            protected: Species::BlackStork,
        }
    }

    /// Pool the species ensemble with the ad-hoc model and demand higher
    /// confidence before shooting.
    pub fn pooled_ensemble() -> Self {
        Self {
            turns_per_round: 100,
            observation_window: 1.0,
            confidence_threshold: 0.82,
            shoot_max_iters: 1000,
            guess_max_iters: 1000,
            adhoc_state_count: 2,
            ensemble_state_count: 2,
            pool_species_models: true,
            default_guess: Species::Pigeon,
            protected: Species::BlackStork,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::pooled_ensemble()
    }
}

/// The decision policy for one match. Owns the registry, the round/time-step
/// counters, the last-guess cache, and the statistics for its whole lifetime.
#[derive(Debug)]
pub struct Hunter {
    config: PolicyConfig,
    registry: SpeciesRegistry,
    round: Option<usize>,
    time_step: usize,
    last_guess: Vec<Option<Species>>,
    stats: MatchStats,
    rng: StdRng,
}

impl Hunter {
    pub fn new(config: PolicyConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Construct with an explicit RNG for reproducible behavior.
    pub fn with_rng(config: PolicyConfig, rng: StdRng) -> Self {
        Self {
            config,
            registry: SpeciesRegistry::new(),
            round: None,
            time_step: 0,
            last_guess: Vec::new(),
            stats: MatchStats::default(),
            rng,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn registry(&self) -> &SpeciesRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    /// Earliest time step at which shooting is allowed, derived from the
    /// round's step budget, the bird count, and the player count: the more
    /// contested the round, the earlier the policy must commit.
    fn observation_gate(&self, num_birds: usize, num_players: usize) -> usize {
        let budget =
            (self.config.turns_per_round as f64 * self.config.observation_window).round() as usize;
        budget.saturating_sub(num_players * num_birds)
    }

    /// Decide this step's action: a single shot at the most predictable bird,
    /// or a pass.
    pub fn shoot(&mut self, state: &GameState, _deadline: Deadline) -> Action {
        if self.round != Some(state.round()) {
            self.round = Some(state.round());
            self.time_step = 0;
        }
        self.time_step += 1;

        if self.time_step < MIN_OBSERVATIONS
            || self.time_step < self.observation_gate(state.num_birds(), state.num_players())
        {
            return Action::Pass;
        }

        let mut action = Action::Pass;
        let mut confidence = f64::NEG_INFINITY;

        for (b, bird) in state.birds().enumerate() {
            // Dead birds cannot be shot down again.
            if bird.is_dead() {
                continue;
            }

            let seq = bird.observation_sequence();
            if seq.len() < MIN_OBSERVATIONS {
                continue;
            }

            // A bird we cannot place, or one that might be protected, is not
            // worth the risk.
            let species = match self.registry.classify(&seq) {
                None => continue,
                Some(s) if s == self.config.protected => continue,
                Some(s) => s,
            };

            let mut adhoc = Hmm::randomized(self.config.adhoc_state_count, Move::COUNT, &mut self.rng);
            adhoc.learn(&seq, self.config.shoot_max_iters);

            let ensemble: &[Hmm] = if self.config.pool_species_models {
                self.registry.models(species)
            } else {
                &[]
            };
            for model in ensemble.iter().chain(std::iter::once(&adhoc)) {
                let next_move = model.next_distribution_after(&seq);
                for (movement, &p) in Move::ALL.iter().zip(next_move.iter()) {
                    if p > confidence && p > self.config.confidence_threshold {
                        action = Action::Shoot {
                            bird: b,
                            movement: *movement,
                        };
                        confidence = p;
                    }
                }
            }
        }

        if let Action::Shoot { bird, movement } = action {
            self.stats.shots += 1;
            debug!(bird, %movement, confidence, "taking the shot");
        }
        action
    }

    /// Submit one species guess per bird at the end of the round.
    ///
    /// The first round has no trained models anywhere, so every bird gets the
    /// fixed default guess; afterwards the classifier decides, with a
    /// uniformly random species standing in whenever it comes back empty,
    /// since a wrong guess is still worth a revealed label.
    pub fn guess(&mut self, state: &GameState, _deadline: Deadline) -> Vec<Option<Species>> {
        let mut guesses = Vec::with_capacity(state.num_birds());
        for bird in state.birds() {
            let guess = if state.round() == 0 {
                Some(self.config.default_guess)
            } else {
                let seq = bird.observation_sequence();
                let classified = if seq.is_empty() {
                    None
                } else {
                    self.registry.classify(&seq)
                };
                classified
                    .or_else(|| Species::from_index(self.rng.random_range(0..Species::COUNT)))
            };
            if guess.is_some() {
                self.stats.guesses += 1;
            }
            guesses.push(guess);
        }

        self.last_guess = guesses.clone();
        guesses
    }

    /// Notification that a shot connected.
    pub fn hit(&mut self, _state: &GameState, bird: usize, _deadline: Deadline) {
        self.stats.hits += 1;
        info!(bird, "bird hit");
    }

    /// Learn from the revealed true species: one freshly trained model per
    /// revealed bird, registered under its true label. This is the only way
    /// the registry grows.
    pub fn reveal(&mut self, state: &GameState, species: &[Option<Species>], _deadline: Deadline) {
        for (b, revealed) in species.iter().enumerate() {
            let Some(true_species) = revealed else {
                continue;
            };

            let seq = state.bird(b).observation_sequence();
            // A bird downed on its first move leaves nothing to train on.
            if seq.len() < MIN_OBSERVATIONS {
                continue;
            }

            let mut model =
                Hmm::randomized(self.config.ensemble_state_count, Move::COUNT, &mut self.rng);
            model.learn(&seq, self.config.guess_max_iters);
            self.registry.register(*true_species, model);

            if self.last_guess.get(b).copied().flatten() == Some(*true_species) {
                self.stats.correct_guesses += 1;
            }
        }

        info!(
            hits = self.stats.hits,
            shots = self.stats.shots,
            correct_guesses = self.stats.correct_guesses,
            guesses = self.stats.guesses,
            registered = self.registry.total(),
            "round revealed"
        );
    }
}
