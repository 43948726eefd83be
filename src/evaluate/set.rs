use crate::{EvalError, OperatorKind, Value};

/// A list operand. A missing value reads as the empty list.
fn list<'a>(kind: OperatorKind, value: &'a Value) -> Result<&'a [Value], EvalError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(&[]),
        other => Err(EvalError::NotAList {
            operator: kind,
            actual: other.type_name(),
        }),
    }
}

fn member(items: &[Value], needle: &Value) -> bool {
    items.iter().any(|item| item.loose_eq(needle))
}

fn dedup(items: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !member(&out, &item) {
            out.push(item);
        }
    }
    out
}

/// Membership and set algebra. Membership uses loose equality, and the
/// value-producing operations keep first-seen order without duplicates.
pub(super) fn apply(kind: OperatorKind, left: &Value, right: &Value) -> Result<Value, EvalError> {
    use OperatorKind as K;

    if let K::In | K::NotIn = kind {
        let found = member(list(kind, right)?, left);
        return Ok(Value::Bool(found == (kind == K::In)));
    }

    let (a, b) = (list(kind, left)?, list(kind, right)?);
    Ok(match kind {
        K::ContainsAll => Value::Bool(b.iter().all(|x| member(a, x))),
        K::ContainsAny => Value::Bool(b.iter().any(|x| member(a, x))),
        K::Subset => Value::Bool(a.iter().all(|x| member(b, x))),
        K::Superset => Value::Bool(b.iter().all(|x| member(a, x))),
        K::Union => Value::Array(dedup(a.iter().chain(b).cloned())),
        K::Intersection => Value::Array(dedup(a.iter().filter(|x| member(b, x)).cloned())),
        K::Difference => Value::Array(dedup(a.iter().filter(|x| !member(b, x)).cloned())),
        _ => Value::Bool(false),
    })
}
