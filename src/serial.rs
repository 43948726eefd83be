//! Serialization of operator trees back into expression-language text.
//!
//! ## Canonical form
//!
//! Infix operators are separated by single spaces, function arguments by
//! `", "`. A child is parenthesized only when it binds more weakly than its
//! parent requires, or binds equally on the non-associative side. Logical
//! `and`/`or`/`xor` chains print flat, and a different logical operator
//! nested inside one is always parenthesized. Floats always carry a decimal
//! point, so `parse(serialize(t))` reproduces the literal types of `t`.
//!
//! Serializing canonical text again after a parse yields the same text.

use thiserror::Error;

use crate::parse::syntax::{strength, syntax, Assoc, Syntax};
use crate::types::format_float;
use crate::{ErrorKind, Operand, Operator, OperatorKind, StructuralError, Value};

/// Errors raised while rendering an operator tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializeError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("cannot serialize value of type {type_name}")]
    UnsupportedValue { type_name: &'static str },

    #[error("field path '{path}' cannot be written in {syntax}")]
    InvalidField { path: String, syntax: &'static str },

    #[error("{operator} has no {syntax} form")]
    Unrepresentable {
        operator: OperatorKind,
        syntax: &'static str,
    },
}

impl SerializeError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SerializeError::Structural(_) => ErrorKind::Structural,
            _ => ErrorKind::Type,
        }
    }
}

const WORDS: &[&str] = &[
    "and", "or", "xor", "not", "in", "contains", "startsWith", "endsWith", "matches", "true",
    "false", "null",
];

/// Whether `path` lexes back as a single identifier token that is not a keyword.
pub(crate) fn is_plain_path(path: &str, reserved: &[&str]) -> bool {
    let mut segments = path.split('.');
    let head_ok = segments.next().is_some_and(|head| {
        head.chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && head.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
    head_ok
        && segments.all(|s| {
            !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
        && !reserved.iter().any(|w| w.eq_ignore_ascii_case(path))
}

/// Quote a string, escaping the quote character, backslashes and control
/// characters.
pub(crate) fn quote(s: &str, quote: char) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Render a scalar or list literal with the given string quoting.
pub(crate) fn literal(value: &Value, quote_char: char) -> Result<String, SerializeError> {
    match value {
        Value::Null => Ok("null".to_owned()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) if f.is_finite() => Ok(format_float(*f)),
        Value::Float(_) => Err(SerializeError::UnsupportedValue {
            type_name: "non-finite float",
        }),
        Value::String(s) => Ok(quote(s, quote_char)),
        Value::Array(items) => {
            let items = items
                .iter()
                .map(|item| literal(item, quote_char))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("[{}]", items.join(", ")))
        }
        other => Err(SerializeError::UnsupportedValue {
            type_name: other.type_name(),
        }),
    }
}

struct Rendered {
    text: String,
    strength: u8,
    kind: Option<OperatorKind>,
}

impl Rendered {
    fn atom(text: String) -> Self {
        Self {
            text,
            strength: strength::ATOM,
            kind: None,
        }
    }

    fn wrapped(self, wrap: bool) -> String {
        if wrap {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

fn is_flat_logical(kind: OperatorKind) -> bool {
    matches!(kind, OperatorKind::And | OperatorKind::Or | OperatorKind::Xor)
}

/// Render an operand tree as canonical expression text.
///
/// # Errors
///
/// Returns [`SerializeError`] for malformed nodes, values with no literal
/// form, and field paths that would not read back as one identifier.
pub fn to_expression(root: &Operand) -> Result<String, SerializeError> {
    render(root).map(|r| r.text)
}

fn render(operand: &Operand) -> Result<Rendered, SerializeError> {
    match operand {
        Operand::Literal(value) => literal(value, '"').map(Rendered::atom),
        Operand::Field(reference) => {
            let path = reference.path();
            if is_plain_path(&path, WORDS) {
                Ok(Rendered::atom(path))
            } else {
                Err(SerializeError::InvalidField {
                    path,
                    syntax: "the expression language",
                })
            }
        }
        Operand::Operator(op) => render_operator(op),
    }
}

fn render_operator(op: &Operator) -> Result<Rendered, SerializeError> {
    op.check()?;
    let kind = op.kind();
    let operands = op.operands();

    match syntax(kind) {
        Syntax::Infix {
            token,
            strength,
            assoc,
        } => {
            if let [only] = operands {
                return render(only);
            }
            let last = operands.len() - 1;
            let mut parts = Vec::with_capacity(operands.len());
            for (i, child) in operands.iter().enumerate() {
                let rendered = render(child)?;
                let wrap = if is_flat_logical(kind) {
                    match rendered.kind {
                        Some(k) if k == kind => false,
                        Some(k) if is_flat_logical(k) => true,
                        _ => rendered.strength < strength,
                    }
                } else if rendered.strength == strength {
                    match assoc {
                        Assoc::Left => i > 0,
                        Assoc::Right => i < last,
                    }
                } else {
                    rendered.strength < strength
                };
                parts.push(rendered.wrapped(wrap));
            }
            Ok(Rendered {
                text: parts.join(&format!(" {token} ")),
                strength,
                kind: Some(kind),
            })
        }
        Syntax::Prefix(token) => {
            let child = render(&operands[0])?;
            let wrap = child.strength < strength::UNARY;
            let inner = child.wrapped(wrap);
            let text = if token == "-" {
                format!("-{inner}")
            } else {
                format!("{token} {inner}")
            };
            Ok(Rendered {
                text,
                strength: strength::UNARY,
                kind: Some(kind),
            })
        }
        Syntax::Function(name) => {
            let args = operands
                .iter()
                .map(|arg| render(arg).map(|r| r.text))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Rendered {
                text: format!("{name}({})", args.join(", ")),
                strength: strength::ATOM,
                kind: Some(kind),
            })
        }
    }
}
