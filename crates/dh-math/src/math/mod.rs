//! Core math modules.

pub mod format;
pub mod matrix;
pub mod stochastic;
