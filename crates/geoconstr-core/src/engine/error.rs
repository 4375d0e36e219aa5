use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstraintError {
    #[error("Error on line {line_number} ('{line}'): {kind}")]
    Line {
        line_number: usize,
        line: String,
        kind: LineErrorKind,
    },

    #[error("Scan endpoints must have the same length (initial: {initial}, final: {final_len})")]
    DimensionMismatch { initial: usize, final_len: usize },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LineErrorKind {
    #[error("Mode ($freeze, $set, $scan) must be set before specifying any constraints")]
    ModeNotSet,

    #[error("Unknown mode '${0}'. Expected $freeze, $set or $scan")]
    UnknownMode(String),

    #[error("Unknown constraint keyword '{0}'")]
    UnknownKeyword(String),

    #[error("Expected {expected} tokens but got {actual}")]
    TokenCount { expected: usize, actual: usize },

    #[error("Atom numbers must start from 1 (got '{0}')")]
    InvalidAtomIndex(String),

    #[error("Constraints refer to atom {index} but the structure only has {atom_count} atoms")]
    AtomIndexOutOfRange { index: i64, atom_count: usize },

    #[error("Invalid atom specification '{0}'")]
    InvalidAtomSpec(String),

    #[error("Atom specification '{0}' does not select any atoms")]
    EmptySelection(String),

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    #[error("Invalid number of scan steps '{0}'; must be a positive integer")]
    InvalidStepCount(String),

    #[error("Rotation axis must not be the zero vector")]
    ZeroRotationAxis,

    #[error("Scan endpoints must have the same length (initial: {initial}, final: {final_len})")]
    DimensionMismatch { initial: usize, final_len: usize },
}

/// Coarse classification of compile errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Mode not set, unknown mode, unknown keyword.
    Grammar,
    /// Wrong number of fields on a line.
    TokenCount,
    /// Atom index below 1, beyond the structure, malformed, or empty selection.
    AtomIndex,
    /// A numeric field that cannot be used as written.
    Value,
    /// Scan endpoints of unequal length.
    DimensionMismatch,
    /// A defect in the compiler itself.
    Internal,
}

impl LineErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LineErrorKind::ModeNotSet
            | LineErrorKind::UnknownMode(_)
            | LineErrorKind::UnknownKeyword(_) => ErrorCategory::Grammar,
            LineErrorKind::TokenCount { .. } => ErrorCategory::TokenCount,
            LineErrorKind::InvalidAtomIndex(_)
            | LineErrorKind::AtomIndexOutOfRange { .. }
            | LineErrorKind::InvalidAtomSpec(_)
            | LineErrorKind::EmptySelection(_) => ErrorCategory::AtomIndex,
            LineErrorKind::InvalidNumber(_)
            | LineErrorKind::InvalidStepCount(_)
            | LineErrorKind::ZeroRotationAxis => ErrorCategory::Value,
            LineErrorKind::DimensionMismatch { .. } => ErrorCategory::DimensionMismatch,
        }
    }
}

impl ConstraintError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConstraintError::Line { kind, .. } => kind.category(),
            ConstraintError::DimensionMismatch { .. } => ErrorCategory::DimensionMismatch,
            ConstraintError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// The line-level error kind, if this error is tied to an input line.
    pub fn kind(&self) -> Option<&LineErrorKind> {
        match self {
            ConstraintError::Line { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub(crate) fn at_line(line_number: usize, line: &str, kind: LineErrorKind) -> Self {
        ConstraintError::Line {
            line_number,
            line: line.to_string(),
            kind,
        }
    }
}
