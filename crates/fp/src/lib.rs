//! Scalar and sparse linear-algebra primitives over GF(p).

pub mod matrix;
pub mod prime;
pub mod scalar;
pub mod vector;

pub use matrix::SparseMatrix;
pub use prime::{ValidPrime, PRIME_BOUND};
pub use scalar::{InverseTable, Scalar};
pub use vector::{SparseRow, SparseVec};
