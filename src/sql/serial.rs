use crate::serial::{is_plain_path, SerializeError};
use crate::types::format_float;
use crate::{Operand, Operator, OperatorKind, Value};

use super::compile::as_between;
use super::grammar::KEYWORDS;

const OR: u8 = 1;
const AND: u8 = 2;
const NOT: u8 = 3;
const PREDICATE: u8 = 4;
const ADDITIVE: u8 = 5;
const MULTIPLICATIVE: u8 = 6;
const UNARY: u8 = 7;
const ATOM: u8 = 8;

const SYNTAX: &str = "SQL";

struct Rendered {
    text: String,
    strength: u8,
    kind: Option<OperatorKind>,
}

impl Rendered {
    fn new(text: String, strength: u8) -> Self {
        Self {
            text,
            strength,
            kind: None,
        }
    }

    /// Parenthesize when binding more weakly than `min`.
    fn at_least(self, min: u8) -> String {
        if self.strength < min {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

fn unrepresentable(kind: OperatorKind) -> SerializeError {
    SerializeError::Unrepresentable {
        operator: kind,
        syntax: SYNTAX,
    }
}

fn sql_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''"))
}

fn sql_literal(value: &Value) -> Result<String, SerializeError> {
    match value {
        Value::Null => Ok("NULL".to_owned()),
        Value::Bool(true) => Ok("TRUE".to_owned()),
        Value::Bool(false) => Ok("FALSE".to_owned()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) if f.is_finite() => Ok(format_float(*f)),
        Value::Float(_) => Err(SerializeError::UnsupportedValue {
            type_name: "non-finite float",
        }),
        Value::String(s) => Ok(sql_string(s)),
        other => Err(SerializeError::UnsupportedValue {
            type_name: other.type_name(),
        }),
    }
}

/// Recover the `LIKE` pattern from a regex built by `like_to_regex`.
fn regex_to_like(regex: &str) -> Option<String> {
    let body = regex.strip_prefix("(?s)^")?.strip_suffix('$')?;
    let mut like = String::new();
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '.' if chars.peek() == Some(&'*') => {
                chars.next();
                like.push('%');
            }
            '.' => like.push('_'),
            '\\' => match chars.next()? {
                '%' | '_' => return None,
                escaped => like.push(escaped),
            },
            '%' | '_' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' => {
                return None
            }
            plain => like.push(plain),
        }
    }
    Some(like)
}

fn like_pattern(pattern: &Operand) -> Option<String> {
    match pattern.as_literal()? {
        Value::String(regex) => regex_to_like(regex),
        _ => None,
    }
}

fn is_null_check(op: &Operator) -> bool {
    op.kind() == OperatorKind::EqualTo
        && matches!(op.operands(), [_, Operand::Literal(Value::Null)])
}

fn list(values: &Operand, kind: OperatorKind) -> Result<String, SerializeError> {
    let Some(Value::Array(items)) = values.as_literal() else {
        return Err(unrepresentable(kind));
    };
    let items = items
        .iter()
        .map(sql_literal)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", items.join(", ")))
}

/// Render an operand tree as a canonical `WHERE` clause.
pub(crate) fn to_sql(root: &Operand) -> Result<String, SerializeError> {
    render(root).map(|r| r.text)
}

fn render(operand: &Operand) -> Result<Rendered, SerializeError> {
    match operand {
        Operand::Literal(value) => Ok(Rendered::new(sql_literal(value)?, ATOM)),
        Operand::Field(reference) => {
            let path = reference.path();
            if is_plain_path(&path, KEYWORDS) {
                Ok(Rendered::new(path, ATOM))
            } else {
                Err(SerializeError::InvalidField {
                    path,
                    syntax: SYNTAX,
                })
            }
        }
        Operand::Operator(op) => render_operator(op),
    }
}

fn operand_text(operand: &Operand) -> Result<String, SerializeError> {
    Ok(render(operand)?.at_least(ADDITIVE))
}

/// `subject KEYWORD rest` predicates such as `IN`, `LIKE` and `BETWEEN`,
/// with `NOT` placed before the keyword when negated.
fn predicate(subject: &Operand, negated: bool, rest: &str) -> Result<Rendered, SerializeError> {
    let not = if negated { "NOT " } else { "" };
    Ok(Rendered::new(
        format!("{} {not}{rest}", operand_text(subject)?),
        PREDICATE,
    ))
}

fn between(op: &Operator, negated: bool) -> Result<Option<Rendered>, SerializeError> {
    let Some((subject, low, high)) = as_between(op) else {
        return Ok(None);
    };
    let rest = format!("BETWEEN {} AND {}", operand_text(low)?, operand_text(high)?);
    predicate(subject, negated, &rest).map(Some)
}

fn render_operator(op: &Operator) -> Result<Rendered, SerializeError> {
    use OperatorKind as K;

    op.check()?;
    let kind = op.kind();
    let operands = op.operands();

    let rendered = match kind {
        K::And | K::Or => {
            if let Some(range) = between(op, false)? {
                return Ok(range);
            }
            if let [only] = operands {
                return render(only);
            }
            let (keyword, strength) = if kind == K::And { ("AND", AND) } else { ("OR", OR) };
            let mut parts = Vec::with_capacity(operands.len());
            for child in operands {
                let child = render(child)?;
                let wrap = match child.kind {
                    Some(k) if k == kind => false,
                    Some(K::And | K::Or) => true,
                    _ => child.strength < strength,
                };
                parts.push(if wrap {
                    format!("({})", child.text)
                } else {
                    child.text
                });
            }
            Rendered::new(parts.join(&format!(" {keyword} ")), strength)
        }
        K::Not => {
            let child = &operands[0];
            if let Some(inner) = child.as_operator() {
                inner.check()?;
            }
            match child.as_operator() {
                Some(inner) if is_null_check(inner) => {
                    predicate(&inner.operands()[0], false, "IS NOT NULL")?
                }
                Some(inner) if inner.kind() == K::Matches => {
                    match like_pattern(&inner.operands()[1]) {
                        Some(pattern) => predicate(
                            &inner.operands()[0],
                            true,
                            &format!("LIKE {}", sql_string(&pattern)),
                        )?,
                        None => return Err(unrepresentable(K::Matches)),
                    }
                }
                Some(inner) => match between(inner, true)? {
                    Some(range) => range,
                    None => Rendered::new(format!("NOT {}", render(child)?.at_least(NOT)), NOT),
                },
                None => Rendered::new(format!("NOT {}", render(child)?.at_least(NOT)), NOT),
            }
        }
        K::EqualTo if is_null_check(op) => predicate(&operands[0], false, "IS NULL")?,
        K::Identical
        | K::NotIdentical
        | K::LessThan
        | K::LessThanOrEqualTo
        | K::GreaterThan
        | K::GreaterThanOrEqualTo => {
            let token = match kind {
                K::Identical => "=",
                K::NotIdentical => "<>",
                K::LessThan => "<",
                K::LessThanOrEqualTo => "<=",
                K::GreaterThan => ">",
                _ => ">=",
            };
            Rendered::new(
                format!(
                    "{} {token} {}",
                    operand_text(&operands[0])?,
                    operand_text(&operands[1])?
                ),
                PREDICATE,
            )
        }
        K::In | K::NotIn => {
            let rest = format!("IN {}", list(&operands[1], kind)?);
            predicate(&operands[0], kind == K::NotIn, &rest)?
        }
        K::Matches => match like_pattern(&operands[1]) {
            Some(pattern) => {
                predicate(&operands[0], false, &format!("LIKE {}", sql_string(&pattern)))?
            }
            None => return Err(unrepresentable(kind)),
        },
        K::Addition | K::Subtraction | K::Multiplication | K::Division | K::Modulo => {
            let (token, strength) = match kind {
                K::Addition => ("+", ADDITIVE),
                K::Subtraction => ("-", ADDITIVE),
                K::Multiplication => ("*", MULTIPLICATIVE),
                K::Division => ("/", MULTIPLICATIVE),
                _ => ("%", MULTIPLICATIVE),
            };
            let left = render(&operands[0])?.at_least(strength);
            let right = render(&operands[1])?.at_least(strength + 1);
            Rendered::new(format!("{left} {token} {right}"), strength)
        }
        K::Negation => {
            let child = render(&operands[0])?;
            let inner = if child.text.starts_with('-') {
                format!("({})", child.text)
            } else {
                child.at_least(UNARY)
            };
            Rendered::new(format!("-{inner}"), UNARY)
        }
        _ => return Err(unrepresentable(kind)),
    };
    Ok(Rendered {
        kind: Some(kind),
        ..rendered
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{and, apply, field, lit, or};

    fn sql(operand: &Operand) -> String {
        to_sql(operand).unwrap()
    }

    #[test]
    fn comparisons_use_sql_tokens() {
        assert_eq!(sql(&field("a").identical(lit(1_i64))), "a = 1");
        assert_eq!(sql(&field("a").not_identical(lit("x"))), "a <> 'x'");
        assert_eq!(sql(&field("a").lte(lit(2.5))), "a <= 2.5");
    }

    #[test]
    fn strings_double_quotes() {
        assert_eq!(sql(&field("n").identical(lit("O'Brien"))), "n = 'O''Brien'");
    }

    #[test]
    fn resugars_desugared_shapes() {
        let is_null = field("x").equals(lit(Value::Null));
        assert_eq!(sql(&is_null), "x IS NULL");
        assert_eq!(sql(&!is_null), "x IS NOT NULL");

        let range = and([field("age").gte(lit(18_i64)), field("age").lte(lit(65_i64))]);
        assert_eq!(sql(&range), "age BETWEEN 18 AND 65");
        assert_eq!(sql(&!range), "age NOT BETWEEN 18 AND 65");

        let like = field("name").matches(lit("(?s)^J.*n.$"));
        assert_eq!(sql(&like), "name LIKE 'J%n_'");
        assert_eq!(sql(&!like), "name NOT LIKE 'J%n_'");

        let not_in = apply(OperatorKind::NotIn, vec![field("s"), lit(vec!["a", "b"])]);
        assert_eq!(sql(&not_in), "s NOT IN ('a', 'b')");
    }

    #[test]
    fn logical_parenthesization() {
        let expr = or([
            field("a").identical(lit(1_i64)),
            and([field("b").identical(lit(2_i64)), field("c").identical(lit(3_i64))]),
        ]);
        assert_eq!(sql(&expr), "a = 1 OR (b = 2 AND c = 3)");
        let expr = !or([field("a"), field("b")]);
        assert_eq!(sql(&expr), "NOT (a OR b)");
        assert_eq!(sql(&!field("a").identical(lit(1_i64))), "NOT a = 1");
    }

    #[test]
    fn arithmetic() {
        let expr = ((field("a") + field("b")) * lit(2_i64)).gt(lit(10_i64));
        assert_eq!(sql(&expr), "(a + b) * 2 > 10");
        assert_eq!(sql(&-lit(-5_i64)), "-(-5)");
    }

    #[test]
    fn unrepresentable_operators() {
        let loose = field("a").equals(lit(1_i64));
        assert!(matches!(
            to_sql(&loose),
            Err(SerializeError::Unrepresentable {
                operator: OperatorKind::EqualTo,
                ..
            })
        ));
        let regex = field("a").matches(lit("^[a-z]+$"));
        assert!(to_sql(&regex).is_err());
        let date = apply(OperatorKind::IsWeekend, vec![field("d")]);
        assert_eq!(
            to_sql(&date).unwrap_err().to_string(),
            "IsWeekend has no SQL form"
        );
    }

    #[test]
    fn like_regex_inverse() {
        assert_eq!(regex_to_like("(?s)^a\\.b%$"), None);
        assert_eq!(regex_to_like("(?s)^a\\.b.*$"), Some("a.b%".to_owned()));
        assert_eq!(regex_to_like("^a$"), None);
    }
}
