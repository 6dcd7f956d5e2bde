//! The engine's own error type, for conditions the caller is expected to
//! branch on (cancellation, resource exhaustion) rather than just print.
//! Context-only failures (bad file paths, REPL plumbing) stay as
//! `anyhow::Error` at the call sites, matching how the Steenrod-algebra
//! tooling this crate is styled after layers `anyhow::Context` over a
//! smaller set of true domain errors.

use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// A `Vec::try_reserve` (or similar) allocation failed while growing an
    /// equation list or column map.
    OutOfMemory,
    /// The build was cancelled via the cooperative cancellation flag.
    Interrupted,
    /// A command's argument failed validation (bad identity syntax, unknown
    /// generator, out-of-range degree, ...).
    InvalidInput(String),
    /// An internal consistency check failed (a basis index repeated, a
    /// reduced matrix left a pivot row with more than one nonzero entry).
    /// This should never happen in a correct build; seeing it means a bug,
    /// not a user-input problem.
    InvariantViolation(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::OutOfMemory => write!(f, "out of memory"),
            EngineError::Interrupted => write!(f, "build interrupted"),
            EngineError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            EngineError::InvariantViolation(msg) => write!(f, "internal invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_each_variant() {
        assert_eq!(EngineError::OutOfMemory.to_string(), "out of memory");
        assert_eq!(EngineError::Interrupted.to_string(), "build interrupted");
        assert!(EngineError::InvalidInput("bad".into()).to_string().contains("bad"));
    }
}
