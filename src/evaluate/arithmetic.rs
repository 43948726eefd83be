use crate::types::Number;
use crate::{EvalError, OperatorKind, Value};

fn number(kind: OperatorKind, value: &Value) -> Result<Number, EvalError> {
    value.as_number().ok_or(EvalError::TypeMismatch {
        operator: kind,
        expected: "number",
        actual: value.type_name(),
    })
}

#[allow(clippy::float_cmp)]
fn is_zero(n: Number) -> bool {
    match n {
        Number::Int(i) => i == 0,
        Number::Float(f) => f == 0.0,
    }
}

/// Integer arithmetic stays integral until it overflows, then promotes to float.
fn int_or_float(
    a: Number,
    b: Number,
    int: impl FnOnce(i64, i64) -> Option<i64>,
    float: impl FnOnce(f64, f64) -> f64,
) -> Value {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            int(x, y).map_or_else(|| Value::Float(float(a.as_f64(), b.as_f64())), Value::Int)
        }
        _ => Value::Float(float(a.as_f64(), b.as_f64())),
    }
}

pub(super) fn binary(kind: OperatorKind, a: &Value, b: &Value) -> Result<Value, EvalError> {
    let (a, b) = (number(kind, a)?, number(kind, b)?);
    Ok(match kind {
        OperatorKind::Addition => int_or_float(a, b, i64::checked_add, |x, y| x + y),
        OperatorKind::Subtraction => int_or_float(a, b, i64::checked_sub, |x, y| x - y),
        OperatorKind::Multiplication => int_or_float(a, b, i64::checked_mul, |x, y| x * y),
        OperatorKind::Division => {
            if is_zero(b) {
                return Err(EvalError::DivisionByZero);
            }
            Value::Float(a.as_f64() / b.as_f64())
        }
        OperatorKind::Modulo => {
            if is_zero(b) {
                return Err(EvalError::ModuloByZero);
            }
            int_or_float(a, b, |x, y| Some(x.checked_rem(y).unwrap_or(0)), |x, y| x % y)
        }
        OperatorKind::Exponentiation => int_or_float(
            a,
            b,
            |x, y| u32::try_from(y).ok().and_then(|y| x.checked_pow(y)),
            f64::powf,
        ),
        _ => {
            return Err(EvalError::TypeMismatch {
                operator: kind,
                expected: "binary arithmetic operator",
                actual: "other",
            })
        }
    })
}

#[allow(clippy::cast_possible_truncation)]
pub(super) fn unary(kind: OperatorKind, value: &Value) -> Result<Value, EvalError> {
    let n = number(kind, value)?;
    Ok(match (kind, n) {
        (OperatorKind::Negation, Number::Int(i)) => {
            i.checked_neg().map_or(Value::Float(-n.as_f64()), Value::Int)
        }
        (OperatorKind::Negation, Number::Float(f)) => Value::Float(-f),
        (OperatorKind::Absolute, Number::Int(i)) => {
            i.checked_abs().map_or(Value::Float(n.as_f64().abs()), Value::Int)
        }
        (OperatorKind::Absolute, Number::Float(f)) => Value::Float(f.abs()),
        (OperatorKind::Ceil | OperatorKind::Floor | OperatorKind::Round, Number::Int(i)) => {
            Value::Int(i)
        }
        (OperatorKind::Ceil, Number::Float(f)) => Value::Float(f.ceil()),
        (OperatorKind::Floor, Number::Float(f)) => Value::Float(f.floor()),
        (OperatorKind::Round, Number::Float(f)) => Value::Float(f.round()),
        _ => {
            return Err(EvalError::TypeMismatch {
                operator: kind,
                expected: "unary arithmetic operator",
                actual: "other",
            })
        }
    })
}

/// `min`/`max` over the operands, or over the elements of a single list operand.
/// An empty list yields `null`.
pub(super) fn extremum(kind: OperatorKind, values: &[Value]) -> Result<Value, EvalError> {
    let items = match values {
        [Value::Array(items)] => items.as_slice(),
        _ => values,
    };
    let mut best: Option<Number> = None;
    for item in items {
        let n = number(kind, item)?;
        best = Some(match best {
            None => n,
            Some(current) => {
                let replace = if kind == OperatorKind::Min {
                    n.as_f64() < current.as_f64()
                } else {
                    n.as_f64() > current.as_f64()
                };
                if replace {
                    n
                } else {
                    current
                }
            }
        });
    }
    Ok(best.map_or(Value::Null, Value::from))
}
