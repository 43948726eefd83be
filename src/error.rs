use thiserror::Error;

use crate::parse::ParseError;
use crate::{CompileError, ErrorKind};

/// Error returned by the front-end entry points such as
/// [`Frontend::parse`](crate::Frontend::parse): the input either failed to
/// parse or failed to compile into an operator tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl RuleError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuleError::Parse(err) => err.kind(),
            RuleError::Compile(err) => err.kind(),
        }
    }

    /// Byte offset into the input, for syntax errors that know it.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            RuleError::Parse(err) => err.position(),
            _ => None,
        }
    }
}
