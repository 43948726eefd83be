use thiserror::Error;

use super::operator::{Arity, OperatorKind};

/// Error categories surfaced by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input could not be tokenized or parsed.
    Syntax,
    /// The input parsed, but names an operator or function outside the
    /// catalog, or carries a pattern that is not a valid regular expression.
    Semantic,
    /// An operator node has the wrong shape.
    Structural,
    /// A value cannot be rendered or a numeric operation is undefined.
    Type,
}

/// An operator node with an operand count its kind does not accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operator} requires {expected}, got {actual}")]
pub struct StructuralError {
    pub operator: OperatorKind,
    pub expected: Arity,
    pub actual: usize,
}

/// Errors raised while compiling a front-end AST into an operator tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("Unknown DSL operator: {token}")]
    UnknownOperator { token: String },

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },

    #[error("Unsupported operator: {token}")]
    UnsupportedOperator { token: String, fields: Vec<String> },

    #[error("{message}")]
    InvalidDocument { message: String, fields: Vec<String> },

    #[error("Invalid regular expression '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

impl CompileError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::UnknownOperator { .. }
            | CompileError::UnknownFunction { .. }
            | CompileError::UnsupportedOperator { .. }
            | CompileError::InvalidPattern { .. } => ErrorKind::Semantic,
            CompileError::InvalidDocument { .. } | CompileError::Structural(_) => {
                ErrorKind::Structural
            }
        }
    }

    /// Keys of the offending document node, when the error came from one.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        match self {
            CompileError::UnsupportedOperator { fields, .. }
            | CompileError::InvalidDocument { fields, .. } => fields,
            _ => &[],
        }
    }
}

/// Errors raised while evaluating an operator tree against a context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("modulo by zero")]
    ModuloByZero,

    #[error("{operator} expects {expected}, got {actual}")]
    TypeMismatch {
        operator: OperatorKind,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{operator} expects a list on the right-hand side, got {actual}")]
    NotAList {
        operator: OperatorKind,
        actual: &'static str,
    },

    #[error("invalid regular expression '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

impl EvalError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::Structural(_) => ErrorKind::Structural,
            _ => ErrorKind::Type,
        }
    }
}
