use std::fmt;

use serde::Serialize;

use super::error::ErrorKind;

/// One validation failure, safe to display as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub message: String,
    /// A window of the offending input, or a listing of the offending node's fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Byte offset of the failure in the input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl ValidationError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
            position: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(position) = self.position {
            write!(f, " (at position {position})")?;
        }
        Ok(())
    }
}

/// Outcome of validating an input. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A failed result. A failure always carries at least one error, so an
    /// empty list is replaced by a generic entry.
    pub fn failure(mut errors: Vec<ValidationError>) -> Self {
        if errors.is_empty() {
            errors.push(ValidationError::new(ErrorKind::Syntax, "validation failed"));
        }
        Self {
            valid: false,
            errors,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    #[must_use]
    pub fn first_error(&self) -> Option<&ValidationError> {
        self.errors.first()
    }
}
