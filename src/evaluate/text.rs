use regex::Regex;

use crate::{EvalError, OperatorKind, Value};

fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// Binary string predicates. `Contains` on a list tests membership; every
/// other combination works on the operands' string forms and is false when
/// either side has none (for example a missing field).
pub(super) fn predicate(
    kind: OperatorKind,
    haystack: &Value,
    needle: &Value,
) -> Result<bool, EvalError> {
    use OperatorKind as K;

    if let (K::Contains | K::ContainsInsensitive, Value::Array(items)) = (kind, haystack) {
        return Ok(items.iter().any(|item| match kind {
            K::ContainsInsensitive => match (item.to_text(), needle.to_text()) {
                (Some(a), Some(b)) => fold(&a) == fold(&b),
                _ => item.loose_eq(needle),
            },
            _ => item.loose_eq(needle),
        }));
    }

    let (Some(a), Some(b)) = (haystack.to_text(), needle.to_text()) else {
        return Ok(false);
    };
    Ok(match kind {
        K::Contains => a.contains(b.as_ref()),
        K::ContainsInsensitive => fold(&a).contains(&fold(&b)),
        K::StartsWith => a.starts_with(b.as_ref()),
        K::StartsWithInsensitive => fold(&a).starts_with(&fold(&b)),
        K::EndsWith => a.ends_with(b.as_ref()),
        K::EndsWithInsensitive => fold(&a).ends_with(&fold(&b)),
        K::EqualsInsensitive => fold(&a) == fold(&b),
        _ => false,
    })
}

pub(super) fn is_match(regex: &Regex, subject: &Value) -> bool {
    subject.to_text().is_some_and(|s| regex.is_match(&s))
}

/// Match against a pattern only known at evaluation time, such as one read
/// from a field.
pub(super) fn matches(subject: &Value, pattern: &Value) -> Result<bool, EvalError> {
    let Some(pattern) = pattern.to_text() else {
        return Err(EvalError::TypeMismatch {
            operator: OperatorKind::Matches,
            expected: "string pattern",
            actual: pattern.type_name(),
        });
    };
    let regex = Regex::new(&pattern).map_err(|err| EvalError::InvalidPattern {
        pattern: pattern.clone().into_owned(),
        message: err.to_string(),
    })?;
    Ok(is_match(&regex, subject))
}

fn text(kind: OperatorKind, value: &Value) -> Result<String, EvalError> {
    match value {
        Value::Null => Ok(String::new()),
        other => other
            .to_text()
            .map(std::borrow::Cow::into_owned)
            .ok_or(EvalError::TypeMismatch {
                operator: kind,
                expected: "string",
                actual: other.type_name(),
            }),
    }
}

/// Unary string transforms. `null` passes through the case and trim
/// transforms unchanged; `Length` counts characters, list elements or map keys.
pub(super) fn transform(kind: OperatorKind, value: &Value) -> Result<Value, EvalError> {
    use OperatorKind as K;

    if kind == K::Length {
        let len = match value {
            Value::Array(items) => items.len(),
            Value::Map(map) => map.len(),
            other => text(kind, other)?.chars().count(),
        };
        return Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)));
    }
    if value.is_null() {
        return Ok(Value::Null);
    }
    let s = text(kind, value)?;
    Ok(Value::String(match kind {
        K::Lowercase => s.to_lowercase(),
        K::Uppercase => s.to_uppercase(),
        _ => s.trim().to_owned(),
    }))
}

/// Join the string forms of every operand. `null` contributes nothing.
pub(super) fn concatenate(kind: OperatorKind, values: &[Value]) -> Result<Value, EvalError> {
    let mut out = String::new();
    for value in values {
        out.push_str(&text(kind, value)?);
    }
    Ok(Value::String(out))
}
