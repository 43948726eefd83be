use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::error::{CompileError, StructuralError};
use super::{FieldRef, Value};

/// Operator families. Every [`OperatorKind`] belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Comparison,
    Logical,
    Mathematical,
    String,
    Set,
    Type,
    Date,
}

/// Number of operands an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    #[must_use]
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(1) => write!(f, "exactly 1 operand"),
            Arity::Exactly(n) => write!(f, "exactly {n} operands"),
            Arity::AtLeast(1) => write!(f, "at least 1 operand"),
            Arity::AtLeast(n) => write!(f, "at least {n} operands"),
        }
    }
}

/// The closed operator catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    // Comparison
    EqualTo,
    NotEqualTo,
    Identical,
    NotIdentical,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,

    // Logical
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Not,

    // Mathematical
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    Exponentiation,
    Negation,
    Absolute,
    Ceil,
    Floor,
    Round,
    Min,
    Max,

    // String
    Contains,
    ContainsInsensitive,
    StartsWith,
    StartsWithInsensitive,
    EndsWith,
    EndsWithInsensitive,
    Matches,
    EqualsInsensitive,
    Lowercase,
    Uppercase,
    Trim,
    Length,
    Concatenate,

    // Set
    In,
    NotIn,
    ContainsAll,
    ContainsAny,
    Union,
    Intersection,
    Difference,
    Subset,
    Superset,

    // Type
    IsNull,
    IsBoolean,
    IsNumeric,
    IsInteger,
    IsFloat,
    IsString,
    IsArray,
    IsEmpty,
    Truthy,

    // Date
    Before,
    After,
    SameDay,
    IsWeekend,
    IsWeekday,
    Year,
    Month,
    DayOfMonth,
}

impl OperatorKind {
    /// Every kind, in declaration order.
    pub const ALL: [OperatorKind; 66] = [
        OperatorKind::EqualTo,
        OperatorKind::NotEqualTo,
        OperatorKind::Identical,
        OperatorKind::NotIdentical,
        OperatorKind::GreaterThan,
        OperatorKind::GreaterThanOrEqualTo,
        OperatorKind::LessThan,
        OperatorKind::LessThanOrEqualTo,
        OperatorKind::And,
        OperatorKind::Or,
        OperatorKind::Xor,
        OperatorKind::Nand,
        OperatorKind::Nor,
        OperatorKind::Not,
        OperatorKind::Addition,
        OperatorKind::Subtraction,
        OperatorKind::Multiplication,
        OperatorKind::Division,
        OperatorKind::Modulo,
        OperatorKind::Exponentiation,
        OperatorKind::Negation,
        OperatorKind::Absolute,
        OperatorKind::Ceil,
        OperatorKind::Floor,
        OperatorKind::Round,
        OperatorKind::Min,
        OperatorKind::Max,
        OperatorKind::Contains,
        OperatorKind::ContainsInsensitive,
        OperatorKind::StartsWith,
        OperatorKind::StartsWithInsensitive,
        OperatorKind::EndsWith,
        OperatorKind::EndsWithInsensitive,
        OperatorKind::Matches,
        OperatorKind::EqualsInsensitive,
        OperatorKind::Lowercase,
        OperatorKind::Uppercase,
        OperatorKind::Trim,
        OperatorKind::Length,
        OperatorKind::Concatenate,
        OperatorKind::In,
        OperatorKind::NotIn,
        OperatorKind::ContainsAll,
        OperatorKind::ContainsAny,
        OperatorKind::Union,
        OperatorKind::Intersection,
        OperatorKind::Difference,
        OperatorKind::Subset,
        OperatorKind::Superset,
        OperatorKind::IsNull,
        OperatorKind::IsBoolean,
        OperatorKind::IsNumeric,
        OperatorKind::IsInteger,
        OperatorKind::IsFloat,
        OperatorKind::IsString,
        OperatorKind::IsArray,
        OperatorKind::IsEmpty,
        OperatorKind::Truthy,
        OperatorKind::Before,
        OperatorKind::After,
        OperatorKind::SameDay,
        OperatorKind::IsWeekend,
        OperatorKind::IsWeekday,
        OperatorKind::Year,
        OperatorKind::Month,
        OperatorKind::DayOfMonth,
    ];

    #[must_use]
    pub fn category(self) -> Category {
        use OperatorKind as K;
        match self {
            K::EqualTo
            | K::NotEqualTo
            | K::Identical
            | K::NotIdentical
            | K::GreaterThan
            | K::GreaterThanOrEqualTo
            | K::LessThan
            | K::LessThanOrEqualTo => Category::Comparison,
            K::And | K::Or | K::Xor | K::Nand | K::Nor | K::Not => Category::Logical,
            K::Addition
            | K::Subtraction
            | K::Multiplication
            | K::Division
            | K::Modulo
            | K::Exponentiation
            | K::Negation
            | K::Absolute
            | K::Ceil
            | K::Floor
            | K::Round
            | K::Min
            | K::Max => Category::Mathematical,
            K::Contains
            | K::ContainsInsensitive
            | K::StartsWith
            | K::StartsWithInsensitive
            | K::EndsWith
            | K::EndsWithInsensitive
            | K::Matches
            | K::EqualsInsensitive
            | K::Lowercase
            | K::Uppercase
            | K::Trim
            | K::Length
            | K::Concatenate => Category::String,
            K::In
            | K::NotIn
            | K::ContainsAll
            | K::ContainsAny
            | K::Union
            | K::Intersection
            | K::Difference
            | K::Subset
            | K::Superset => Category::Set,
            K::IsNull
            | K::IsBoolean
            | K::IsNumeric
            | K::IsInteger
            | K::IsFloat
            | K::IsString
            | K::IsArray
            | K::IsEmpty
            | K::Truthy => Category::Type,
            K::Before
            | K::After
            | K::SameDay
            | K::IsWeekend
            | K::IsWeekday
            | K::Year
            | K::Month
            | K::DayOfMonth => Category::Date,
        }
    }

    #[must_use]
    pub fn arity(self) -> Arity {
        use OperatorKind as K;
        match self {
            K::And | K::Or | K::Xor | K::Nand | K::Nor | K::Min | K::Max | K::Concatenate => {
                Arity::AtLeast(1)
            }
            K::Not
            | K::Negation
            | K::Absolute
            | K::Ceil
            | K::Floor
            | K::Round
            | K::Lowercase
            | K::Uppercase
            | K::Trim
            | K::Length
            | K::IsNull
            | K::IsBoolean
            | K::IsNumeric
            | K::IsInteger
            | K::IsFloat
            | K::IsString
            | K::IsArray
            | K::IsEmpty
            | K::Truthy
            | K::IsWeekend
            | K::IsWeekday
            | K::Year
            | K::Month
            | K::DayOfMonth => Arity::Exactly(1),
            _ => Arity::Exactly(2),
        }
    }

    /// Whether the operator yields a boolean. The others produce values
    /// (numbers, strings, lists) that feed other operators.
    #[must_use]
    pub fn is_predicate(self) -> bool {
        use OperatorKind as K;
        !matches!(
            self,
            K::Addition
                | K::Subtraction
                | K::Multiplication
                | K::Division
                | K::Modulo
                | K::Exponentiation
                | K::Negation
                | K::Absolute
                | K::Ceil
                | K::Floor
                | K::Round
                | K::Min
                | K::Max
                | K::Lowercase
                | K::Uppercase
                | K::Trim
                | K::Length
                | K::Concatenate
                | K::Union
                | K::Intersection
                | K::Difference
                | K::Year
                | K::Month
                | K::DayOfMonth
        )
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A node of the shared operator tree.
///
/// A `Matches` node whose pattern is a string literal may carry the compiled
/// regex, see [`Operator::compile_pattern`]. It is derived from the operands
/// and takes no part in equality.
#[derive(Debug, Clone)]
pub struct Operator {
    kind: OperatorKind,
    operands: Vec<Operand>,
    pattern: Option<Arc<Regex>>,
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.operands == other.operands
    }
}

/// An operator operand: a literal, a field reference, or a nested operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Field(FieldRef),
    Operator(Box<Operator>),
}

impl Operator {
    /// Build an operator, checking the operand count against the kind's arity.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError`] when the operand count does not fit.
    pub fn new(kind: OperatorKind, operands: Vec<Operand>) -> Result<Self, StructuralError> {
        let op = Self::from_parts_unchecked(kind, operands);
        op.check()?;
        Ok(op)
    }

    /// Build an operator without checking arity. Evaluation and serialization
    /// re-check every node, so a malformed tree surfaces as a [`StructuralError`]
    /// there.
    #[must_use]
    pub fn from_parts_unchecked(kind: OperatorKind, operands: Vec<Operand>) -> Self {
        Self {
            kind,
            operands,
            pattern: None,
        }
    }

    /// Compile a `Matches` node's literal pattern once, so evaluation reuses
    /// it. Other kinds, and patterns read from fields, are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidPattern`] when the literal is not a
    /// valid regular expression.
    pub fn compile_pattern(&mut self) -> Result<(), CompileError> {
        if self.kind != OperatorKind::Matches {
            return Ok(());
        }
        let Some(Operand::Literal(Value::String(pattern))) = self.operands.get(1) else {
            return Ok(());
        };
        let regex = Regex::new(pattern).map_err(|err| CompileError::InvalidPattern {
            pattern: pattern.clone(),
            message: err.to_string(),
        })?;
        self.pattern = Some(Arc::new(regex));
        Ok(())
    }

    /// The regex compiled by [`compile_pattern`](Operator::compile_pattern), if any.
    #[must_use]
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    #[must_use]
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    #[must_use]
    pub fn into_parts(self) -> (OperatorKind, Vec<Operand>) {
        (self.kind, self.operands)
    }

    /// Check this node's operand count.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError`] when the operand count does not fit the arity.
    pub fn check(&self) -> Result<(), StructuralError> {
        let arity = self.kind.arity();
        if arity.accepts(self.operands.len()) {
            Ok(())
        } else {
            Err(StructuralError {
                operator: self.kind,
                expected: arity,
                actual: self.operands.len(),
            })
        }
    }
}

impl Operand {
    #[must_use]
    pub fn as_operator(&self) -> Option<&Operator> {
        match self {
            Operand::Operator(op) => Some(op),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_field(&self) -> Option<&FieldRef> {
        match self {
            Operand::Field(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Operand::Literal(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Operator> for Operand {
    fn from(op: Operator) -> Self {
        Operand::Operator(Box::new(op))
    }
}

impl From<FieldRef> for Operand {
    fn from(field: FieldRef) -> Self {
        Operand::Field(field)
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Literal(value)
    }
}
