//! Discrete hidden Markov model engine.
//!
//! [`Hmm`] owns one model's parameters and implements the scaled
//! forward/backward passes, sequence log-likelihood, next-symbol prediction,
//! Viterbi decoding, and Baum-Welch re-estimation. The [`codec`] module
//! provides the whitespace-separated text encoding used by the standalone
//! drivers.

pub mod codec;
pub mod model;

pub use codec::{encode_model, parse_model, parse_model_then_sequence, parse_sequence, CodecError};
pub use model::Hmm;
