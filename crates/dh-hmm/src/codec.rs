//! Text encoding for models and observation sequences.
//!
//! A model is three whitespace-separated blocks, each `rows cols v_1 … v_rc`
//! in row-major order: the transition matrix `A`, the emission matrix `B`,
//! then the initial distribution as `1 N pi_1 … pi_N`. An observation
//! sequence is `length o_1 … o_length`.
//!
//! This is the one place where malformed input is reported instead of left
//! to propagate: truncated blocks, non-numeric tokens, and shape mismatches
//! between the three blocks all surface as [`CodecError`].

use crate::model::Hmm;
use dh_math::{format_matrix, format_vector, Matrix};
use std::str::SplitAsciiWhitespace;
use thiserror::Error;

/// Errors from parsing the text protocol.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unexpected end of input while reading {0}")]
    Truncated(&'static str),

    #[error("invalid {what} token {token:?}")]
    BadToken { what: &'static str, token: String },

    #[error("{0} dimensions do not agree with the transition matrix")]
    ShapeMismatch(&'static str),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

struct Tokens<'a> {
    iter: SplitAsciiWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            iter: input.split_ascii_whitespace(),
        }
    }

    fn next(&mut self, what: &'static str) -> Result<&'a str> {
        self.iter.next().ok_or(CodecError::Truncated(what))
    }

    fn usize(&mut self, what: &'static str) -> Result<usize> {
        let token = self.next(what)?;
        token.parse().map_err(|_| CodecError::BadToken {
            what,
            token: token.to_string(),
        })
    }

    fn f64(&mut self, what: &'static str) -> Result<f64> {
        let token = self.next(what)?;
        token.parse().map_err(|_| CodecError::BadToken {
            what,
            token: token.to_string(),
        })
    }
}

fn read_block(tokens: &mut Tokens<'_>, what: &'static str) -> Result<Matrix> {
    let rows = tokens.usize(what)?;
    let cols = tokens.usize(what)?;
    let mut data = Vec::with_capacity(rows * cols);
    for _ in 0..rows * cols {
        data.push(tokens.f64(what)?);
    }
    Ok(Matrix::from_raw(rows, cols, data))
}

fn read_model(tokens: &mut Tokens<'_>) -> Result<Hmm> {
    let a = read_block(tokens, "transition matrix")?;
    let b = read_block(tokens, "emission matrix")?;
    let pi = read_block(tokens, "initial distribution")?;

    if a.cols() != a.rows() || b.rows() != a.rows() {
        return Err(CodecError::ShapeMismatch("emission matrix"));
    }
    if pi.rows() != 1 || pi.cols() != a.rows() {
        return Err(CodecError::ShapeMismatch("initial distribution"));
    }
    Ok(Hmm::from_parts(pi.row(0).to_vec(), a, b))
}

fn read_sequence(tokens: &mut Tokens<'_>) -> Result<Vec<usize>> {
    let len = tokens.usize("sequence length")?;
    let mut seq = Vec::with_capacity(len);
    for _ in 0..len {
        seq.push(tokens.usize("observation symbol")?);
    }
    Ok(seq)
}

/// Parse a model from its three-block encoding.
pub fn parse_model(input: &str) -> Result<Hmm> {
    read_model(&mut Tokens::new(input))
}

/// Parse a model followed by an observation sequence from the same stream.
pub fn parse_model_then_sequence(input: &str) -> Result<(Hmm, Vec<usize>)> {
    let mut tokens = Tokens::new(input);
    let model = read_model(&mut tokens)?;
    let seq = read_sequence(&mut tokens)?;
    Ok((model, seq))
}

/// Parse a standalone observation sequence.
pub fn parse_sequence(input: &str) -> Result<Vec<usize>> {
    read_sequence(&mut Tokens::new(input))
}

/// Encode a model as its three blocks (A, B, pi) on separate lines, values
/// printed with two decimals.
pub fn encode_model(model: &Hmm) -> String {
    format!(
        "{}\n{}\n{}",
        format_matrix(model.transition()),
        format_matrix(model.emission()),
        format_vector(model.initial()),
    )
}
