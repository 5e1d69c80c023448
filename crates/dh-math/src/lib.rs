//! Duck Hunt math utilities.

pub mod math;

pub use math::format::{format_matrix, format_vector};
pub use math::matrix::Matrix;
pub use math::stochastic::{random_row_stochastic, vector_by_matrix};
