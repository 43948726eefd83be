use std::ops::{Add, Div, Mul, Neg, Not, Rem, Sub};
use std::sync::Arc;

use super::operator::{Operand, Operator, OperatorKind};
use super::reference::{FieldRef, Variable, VariableProperty};
use super::Value;

// Builders for hand-written operator trees. Arity is fixed by each method, so
// they construct nodes unchecked; n-ary helpers given no operands produce a
// node that fails its structural check at evaluation time.

/// Reference a field by dotted path. Each call builds a fresh reference chain;
/// use [`FieldResolver`](crate::FieldResolver) for memoized, shared references.
#[must_use]
pub fn field(path: &str) -> Operand {
    let mut segments = path.split('.');
    let head = segments.next().unwrap_or_default();
    let mut reference = FieldRef::Variable(Arc::new(Variable::new(head)));
    for segment in segments {
        reference =
            FieldRef::Property(Arc::new(VariableProperty::new(reference, segment, Value::Null)));
    }
    Operand::Field(reference)
}

/// A literal operand.
#[must_use]
pub fn lit(value: impl Into<Value>) -> Operand {
    Operand::Literal(value.into())
}

#[must_use]
pub fn and(operands: impl IntoIterator<Item = Operand>) -> Operand {
    apply(OperatorKind::And, operands.into_iter().collect())
}

#[must_use]
pub fn or(operands: impl IntoIterator<Item = Operand>) -> Operand {
    apply(OperatorKind::Or, operands.into_iter().collect())
}

#[must_use]
pub fn xor(operands: impl IntoIterator<Item = Operand>) -> Operand {
    apply(OperatorKind::Xor, operands.into_iter().collect())
}

/// Wrap an operator kind and its operands into an operand.
#[must_use]
pub fn apply(kind: OperatorKind, operands: Vec<Operand>) -> Operand {
    Operand::Operator(Box::new(Operator::from_parts_unchecked(kind, operands)))
}

impl Operand {
    fn binary(self, kind: OperatorKind, other: impl Into<Operand>) -> Operand {
        apply(kind, vec![self, other.into()])
    }

    /// Loose equality (`==`).
    #[must_use]
    pub fn equals(self, other: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::EqualTo, other)
    }

    #[must_use]
    pub fn not_equals(self, other: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::NotEqualTo, other)
    }

    /// Strict equality (`===`).
    #[must_use]
    pub fn identical(self, other: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::Identical, other)
    }

    #[must_use]
    pub fn not_identical(self, other: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::NotIdentical, other)
    }

    #[must_use]
    pub fn gt(self, other: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::GreaterThan, other)
    }

    #[must_use]
    pub fn gte(self, other: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::GreaterThanOrEqualTo, other)
    }

    #[must_use]
    pub fn lt(self, other: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::LessThan, other)
    }

    #[must_use]
    pub fn lte(self, other: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::LessThanOrEqualTo, other)
    }

    #[must_use]
    pub fn is_in(self, list: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::In, list)
    }

    #[must_use]
    pub fn not_in(self, list: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::NotIn, list)
    }

    #[must_use]
    pub fn contains(self, needle: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::Contains, needle)
    }

    #[must_use]
    pub fn starts_with(self, prefix: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::StartsWith, prefix)
    }

    #[must_use]
    pub fn ends_with(self, suffix: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::EndsWith, suffix)
    }

    #[must_use]
    pub fn matches(self, pattern: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::Matches, pattern)
    }

    #[must_use]
    pub fn and(self, other: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::And, other)
    }

    #[must_use]
    pub fn or(self, other: impl Into<Operand>) -> Operand {
        self.binary(OperatorKind::Or, other)
    }
}

impl Not for Operand {
    type Output = Operand;

    fn not(self) -> Operand {
        apply(OperatorKind::Not, vec![self])
    }
}

impl Neg for Operand {
    type Output = Operand;

    fn neg(self) -> Operand {
        apply(OperatorKind::Negation, vec![self])
    }
}

macro_rules! arithmetic {
    ($trait:ident, $method:ident, $kind:ident) => {
        impl $trait for Operand {
            type Output = Operand;

            fn $method(self, rhs: Operand) -> Operand {
                self.binary(OperatorKind::$kind, rhs)
            }
        }
    };
}

arithmetic!(Add, add, Addition);
arithmetic!(Sub, sub, Subtraction);
arithmetic!(Mul, mul, Multiplication);
arithmetic!(Div, div, Division);
arithmetic!(Rem, rem, Modulo);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;

    #[test]
    fn field_builds_property_chain() {
        let Operand::Field(reference) = field("user.profile.age") else {
            panic!("expected a field operand");
        };
        assert_eq!(reference.path(), "user.profile.age");
        assert!(matches!(reference, FieldRef::Property(_)));
    }

    #[test]
    fn comparison_builder() {
        let expr = field("score").gte(lit(90_i64));
        let op = expr.as_operator().unwrap();
        assert_eq!(op.kind(), OperatorKind::GreaterThanOrEqualTo);
        assert_eq!(op.operands().len(), 2);
        assert_eq!(op.operands()[1], lit(90_i64));
    }

    #[test]
    fn not_and_negation() {
        let expr = !field("banned").equals(lit(true));
        assert_eq!(expr.as_operator().unwrap().kind(), OperatorKind::Not);
        let expr = -field("delta");
        assert_eq!(expr.as_operator().unwrap().kind(), OperatorKind::Negation);
    }

    #[test]
    fn arithmetic_operators() {
        let expr = (field("a") + lit(1_i64)) * lit(2_i64);
        let op = expr.as_operator().unwrap();
        assert_eq!(op.kind(), OperatorKind::Multiplication);
        assert_eq!(
            op.operands()[0].as_operator().unwrap().kind(),
            OperatorKind::Addition
        );
    }

    #[test]
    fn nary_helpers() {
        let expr = and([
            field("a").equals(lit(1_i64)),
            field("b").equals(lit(2_i64)),
            field("c").equals(lit(3_i64)),
        ]);
        let op = expr.as_operator().unwrap();
        assert_eq!(op.kind(), OperatorKind::And);
        assert_eq!(op.operands().len(), 3);
    }

    #[test]
    fn empty_nary_fails_structurally_at_evaluation() {
        let rule = crate::Rule::new(or([]));
        assert!(matches!(
            rule.evaluate(&Context::new()),
            Err(crate::EvalError::Structural(_))
        ));
    }
}
