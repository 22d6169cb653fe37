use thiserror::Error;

use crate::types::Position;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Malformed assignment at line {line}, column {column}: {reason}")]
    MalformedAssignment {
        line: usize,
        column: usize,
        reason: &'static str,
    },

    #[error("Unterminated {token} starting at line {line}, column {column}")]
    UnterminatedToken {
        token: &'static str,
        line: usize,
        column: usize,
    },

    #[error("Bad substitution, variable {name} is not set.")]
    UndefinedVariable { name: String },

    #[error("{message}")]
    RequiredVariableMissing { name: String, message: String },

    #[error("Malformed embedded {kind} block at line {line}, column {column}: {reason}")]
    MalformedEmbeddedBlock {
        kind: &'static str,
        line: usize,
        column: usize,
        reason: &'static str,
    },

    #[error("Bad substitution, invalid expression '{expression}' at line {line}, column {column}")]
    BadSubstitution {
        expression: String,
        line: usize,
        column: usize,
    },

    #[error("Invalid UTF-8 at byte {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("IO Error: {0}")]
    Io(String),
}

impl Error {
    pub(crate) fn malformed(at: Position, reason: &'static str) -> Self {
        Error::MalformedAssignment { line: at.line, column: at.col, reason }
    }

    pub(crate) fn unterminated(at: Position, token: &'static str) -> Self {
        Error::UnterminatedToken { token, line: at.line, column: at.col }
    }

    pub(crate) fn embedded(at: Position, kind: &'static str, reason: &'static str) -> Self {
        Error::MalformedEmbeddedBlock { kind, line: at.line, column: at.col, reason }
    }

    /// Line and column of the failure, when the error is tied to a location in the input.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::MalformedAssignment { line, column, .. }
            | Error::UnterminatedToken { line, column, .. }
            | Error::MalformedEmbeddedBlock { line, column, .. }
            | Error::BadSubstitution { line, column, .. } => Some(Position::new(*line, *column)),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
