//! Species labels and observable movement symbols.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The bird species a hunter can encounter.
///
/// The black stork is protected: shooting one is never acceptable, so the
/// policy hard-skips any bird classified as one. "Unknown" is represented as
/// `Option<Species>::None` by the classification and guessing APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Pigeon,
    Raven,
    Skylark,
    Swallow,
    Snipe,
    BlackStork,
}

impl Species {
    /// Number of species.
    pub const COUNT: usize = 6;

    /// All species in classification scan order.
    pub const ALL: [Species; 6] = [
        Species::Pigeon,
        Species::Raven,
        Species::Skylark,
        Species::Swallow,
        Species::Snipe,
        Species::BlackStork,
    ];

    /// Index of this species (for registry storage).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Create a species from an index.
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Species::Pigeon => "pigeon",
            Species::Raven => "raven",
            Species::Skylark => "skylark",
            Species::Swallow => "swallow",
            Species::Snipe => "snipe",
            Species::BlackStork => "black_stork",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One observable flight action per time step: the eight compass directions
/// plus hovering in place. These are the HMM's emission symbols, so the
/// engine's symbol count `K` is [`Move::COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    UpLeft,
    Up,
    UpRight,
    Left,
    Stopped,
    Right,
    DownLeft,
    Down,
    DownRight,
}

impl Move {
    /// Number of movement symbols.
    pub const COUNT: usize = 9;

    /// All moves in symbol order.
    pub const ALL: [Move; 9] = [
        Move::UpLeft,
        Move::Up,
        Move::UpRight,
        Move::Left,
        Move::Stopped,
        Move::Right,
        Move::DownLeft,
        Move::Down,
        Move::DownRight,
    ];

    /// Symbol index of this move.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Create a move from a symbol index.
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Move::UpLeft => "up_left",
            Move::Up => "up",
            Move::UpRight => "up_right",
            Move::Left => "left",
            Move::Stopped => "stopped",
            Move::Right => "right",
            Move::DownLeft => "down_left",
            Move::Down => "down",
            Move::DownRight => "down_right",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
