use crate::types::PairKey;
use std::fmt;
use thiserror::Error;

/// Which reference table a composite failed to resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Target,
    Disease,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target => f.write_str("target"),
            Self::Disease => f.write_str("disease"),
        }
    }
}

/// Failures raised by the scoring core. These are deterministic data errors:
/// retrying with the same input always fails the same way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Composite {composite} references unknown {kind} '{id}'.")]
    MissingReference {
        kind: ReferenceKind,
        id: String,
        composite: PairKey,
    },

    #[error("The computation was cancelled before it completed.")]
    Cancelled,
}
