//! Evaluation of operator trees against a [`Context`].
//!
//! Logical `And`/`Or` short-circuit left to right. `Xor`, `Nand` and `Nor`
//! always evaluate every operand. Every node's arity is re-checked before it
//! runs, so hand-built trees fail with a structural error instead of
//! misbehaving.

mod arithmetic;
mod date;
mod set;
mod text;

use std::cmp::Ordering;

use crate::{Context, EvalError, Operand, Operator, OperatorKind, StructuralError, Value};

/// Evaluate an operand to a value.
pub(crate) fn evaluate(operand: &Operand, ctx: &Context) -> Result<Value, EvalError> {
    match operand {
        Operand::Literal(value) => Ok(value.clone()),
        Operand::Field(reference) => Ok(reference.resolve(ctx)),
        Operand::Operator(op) => eval_operator(op, ctx),
    }
}

fn eval_operator(op: &Operator, ctx: &Context) -> Result<Value, EvalError> {
    use OperatorKind as K;

    op.check()?;
    let kind = op.kind();
    let operands = op.operands();

    let value = match kind {
        K::And => {
            for operand in operands {
                if !evaluate(operand, ctx)?.truthy() {
                    return Ok(Value::Bool(false));
                }
            }
            Value::Bool(true)
        }
        K::Or => {
            for operand in operands {
                if evaluate(operand, ctx)?.truthy() {
                    return Ok(Value::Bool(true));
                }
            }
            Value::Bool(false)
        }
        K::Xor | K::Nand | K::Nor => {
            let mut truths = 0_usize;
            for operand in operands {
                if evaluate(operand, ctx)?.truthy() {
                    truths += 1;
                }
            }
            Value::Bool(match kind {
                K::Xor => truths % 2 == 1,
                K::Nand => truths < operands.len(),
                _ => truths == 0,
            })
        }
        K::Not => Value::Bool(!unary(op, ctx)?.truthy()),

        K::EqualTo => binary_with(op, ctx, |a, b| a.loose_eq(b))?,
        K::NotEqualTo => binary_with(op, ctx, |a, b| !a.loose_eq(b))?,
        K::Identical => binary_with(op, ctx, |a, b| a.strict_eq(b))?,
        K::NotIdentical => binary_with(op, ctx, |a, b| !a.strict_eq(b))?,
        K::GreaterThan => ordering(op, ctx, |o| o == Ordering::Greater)?,
        K::GreaterThanOrEqualTo => ordering(op, ctx, |o| o != Ordering::Less)?,
        K::LessThan => ordering(op, ctx, |o| o == Ordering::Less)?,
        K::LessThanOrEqualTo => ordering(op, ctx, |o| o != Ordering::Greater)?,

        K::Addition
        | K::Subtraction
        | K::Multiplication
        | K::Division
        | K::Modulo
        | K::Exponentiation => {
            let (a, b) = binary(op, ctx)?;
            arithmetic::binary(kind, &a, &b)?
        }
        K::Negation | K::Absolute | K::Ceil | K::Floor | K::Round => {
            arithmetic::unary(kind, &unary(op, ctx)?)?
        }
        K::Min | K::Max => arithmetic::extremum(kind, &all(op, ctx)?)?,

        K::Contains
        | K::ContainsInsensitive
        | K::StartsWith
        | K::StartsWithInsensitive
        | K::EndsWith
        | K::EndsWithInsensitive
        | K::EqualsInsensitive => {
            let (a, b) = binary(op, ctx)?;
            Value::Bool(text::predicate(kind, &a, &b)?)
        }
        K::Matches => match op.pattern() {
            Some(regex) => Value::Bool(text::is_match(regex, &evaluate(&operands[0], ctx)?)),
            None => {
                let (subject, pattern) = binary(op, ctx)?;
                Value::Bool(text::matches(&subject, &pattern)?)
            }
        },
        K::Lowercase | K::Uppercase | K::Trim | K::Length => {
            text::transform(kind, &unary(op, ctx)?)?
        }
        K::Concatenate => text::concatenate(kind, &all(op, ctx)?)?,

        K::In
        | K::NotIn
        | K::ContainsAll
        | K::ContainsAny
        | K::Union
        | K::Intersection
        | K::Difference
        | K::Subset
        | K::Superset => {
            let (a, b) = binary(op, ctx)?;
            set::apply(kind, &a, &b)?
        }

        K::IsNull => Value::Bool(unary(op, ctx)?.is_null()),
        K::IsBoolean => Value::Bool(matches!(unary(op, ctx)?, Value::Bool(_))),
        K::IsNumeric => Value::Bool(unary(op, ctx)?.as_number().is_some()),
        K::IsInteger => Value::Bool(matches!(unary(op, ctx)?, Value::Int(_))),
        K::IsFloat => Value::Bool(matches!(unary(op, ctx)?, Value::Float(_))),
        K::IsString => Value::Bool(matches!(unary(op, ctx)?, Value::String(_))),
        K::IsArray => Value::Bool(matches!(unary(op, ctx)?, Value::Array(_))),
        K::IsEmpty => Value::Bool(!unary(op, ctx)?.truthy()),
        K::Truthy => Value::Bool(unary(op, ctx)?.truthy()),

        K::Before | K::After | K::SameDay => {
            let (a, b) = binary(op, ctx)?;
            Value::Bool(date::compare(kind, &a, &b))
        }
        K::IsWeekend | K::IsWeekday | K::Year | K::Month | K::DayOfMonth => {
            date::inspect(kind, &unary(op, ctx)?)
        }
    };
    Ok(value)
}

fn malformed(op: &Operator) -> EvalError {
    EvalError::Structural(StructuralError {
        operator: op.kind(),
        expected: op.kind().arity(),
        actual: op.operands().len(),
    })
}

fn unary(op: &Operator, ctx: &Context) -> Result<Value, EvalError> {
    match op.operands() {
        [a] => evaluate(a, ctx),
        _ => Err(malformed(op)),
    }
}

fn binary(op: &Operator, ctx: &Context) -> Result<(Value, Value), EvalError> {
    match op.operands() {
        [a, b] => Ok((evaluate(a, ctx)?, evaluate(b, ctx)?)),
        _ => Err(malformed(op)),
    }
}

fn all(op: &Operator, ctx: &Context) -> Result<Vec<Value>, EvalError> {
    op.operands().iter().map(|o| evaluate(o, ctx)).collect()
}

fn binary_with(
    op: &Operator,
    ctx: &Context,
    f: impl FnOnce(&Value, &Value) -> bool,
) -> Result<Value, EvalError> {
    let (a, b) = binary(op, ctx)?;
    Ok(Value::Bool(f(&a, &b)))
}

fn ordering(
    op: &Operator,
    ctx: &Context,
    f: impl FnOnce(Ordering) -> bool,
) -> Result<Value, EvalError> {
    let (a, b) = binary(op, ctx)?;
    Ok(Value::Bool(a.compare(&b).is_some_and(f)))
}
