//! The expression language's operator table.
//!
//! [`syntax`] is the single exhaustive mapping from operator kinds to surface
//! syntax. The parser, compiler and serializer all derive their lookups from it.

use crate::OperatorKind;

/// Binding strengths, weakest first.
pub(crate) mod strength {
    pub(crate) const OR: u8 = 1;
    pub(crate) const XOR: u8 = 2;
    pub(crate) const AND: u8 = 3;
    pub(crate) const MEMBERSHIP: u8 = 4;
    pub(crate) const EQUALITY: u8 = 5;
    pub(crate) const RELATIONAL: u8 = 6;
    pub(crate) const ADDITIVE: u8 = 7;
    pub(crate) const MULTIPLICATIVE: u8 = 8;
    pub(crate) const POWER: u8 = 9;
    pub(crate) const UNARY: u8 = 10;
    pub(crate) const ATOM: u8 = 11;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Assoc {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Syntax {
    Infix {
        token: &'static str,
        strength: u8,
        assoc: Assoc,
    },
    Prefix(&'static str),
    Function(&'static str),
}

const fn left(token: &'static str, strength: u8) -> Syntax {
    Syntax::Infix {
        token,
        strength,
        assoc: Assoc::Left,
    }
}

#[must_use]
pub(crate) fn syntax(kind: OperatorKind) -> Syntax {
    use strength as s;
    use OperatorKind as K;
    use Syntax::{Function, Prefix};

    match kind {
        K::Or => left("or", s::OR),
        K::Xor => left("xor", s::XOR),
        K::And => left("and", s::AND),
        K::Nand => Function("nand"),
        K::Nor => Function("nor"),
        K::Not => Prefix("not"),

        K::In => left("in", s::MEMBERSHIP),
        K::NotIn => left("not in", s::MEMBERSHIP),
        K::Contains => left("contains", s::MEMBERSHIP),
        K::StartsWith => left("startsWith", s::MEMBERSHIP),
        K::EndsWith => left("endsWith", s::MEMBERSHIP),
        K::Matches => left("matches", s::MEMBERSHIP),

        K::EqualTo => left("==", s::EQUALITY),
        K::NotEqualTo => left("!=", s::EQUALITY),
        K::Identical => left("===", s::EQUALITY),
        K::NotIdentical => left("!==", s::EQUALITY),

        K::GreaterThan => left(">", s::RELATIONAL),
        K::GreaterThanOrEqualTo => left(">=", s::RELATIONAL),
        K::LessThan => left("<", s::RELATIONAL),
        K::LessThanOrEqualTo => left("<=", s::RELATIONAL),

        K::Addition => left("+", s::ADDITIVE),
        K::Subtraction => left("-", s::ADDITIVE),
        K::Multiplication => left("*", s::MULTIPLICATIVE),
        K::Division => left("/", s::MULTIPLICATIVE),
        K::Modulo => left("%", s::MULTIPLICATIVE),
        K::Exponentiation => Syntax::Infix {
            token: "**",
            strength: s::POWER,
            assoc: Assoc::Right,
        },
        K::Negation => Prefix("-"),

        K::Absolute => Function("abs"),
        K::Ceil => Function("ceil"),
        K::Floor => Function("floor"),
        K::Round => Function("round"),
        K::Min => Function("min"),
        K::Max => Function("max"),

        K::ContainsInsensitive => Function("icontains"),
        K::StartsWithInsensitive => Function("istartsWith"),
        K::EndsWithInsensitive => Function("iendsWith"),
        K::EqualsInsensitive => Function("iequals"),
        K::Lowercase => Function("lower"),
        K::Uppercase => Function("upper"),
        K::Trim => Function("trim"),
        K::Length => Function("length"),
        K::Concatenate => Function("concat"),

        K::ContainsAll => Function("containsAll"),
        K::ContainsAny => Function("containsAny"),
        K::Union => Function("union"),
        K::Intersection => Function("intersection"),
        K::Difference => Function("difference"),
        K::Subset => Function("subset"),
        K::Superset => Function("superset"),

        K::IsNull => Function("isNull"),
        K::IsBoolean => Function("isBoolean"),
        K::IsNumeric => Function("isNumeric"),
        K::IsInteger => Function("isInteger"),
        K::IsFloat => Function("isFloat"),
        K::IsString => Function("isString"),
        K::IsArray => Function("isArray"),
        K::IsEmpty => Function("isEmpty"),
        K::Truthy => Function("bool"),

        K::Before => Function("before"),
        K::After => Function("after"),
        K::SameDay => Function("sameDay"),
        K::IsWeekend => Function("isWeekend"),
        K::IsWeekday => Function("isWeekday"),
        K::Year => Function("year"),
        K::Month => Function("month"),
        K::DayOfMonth => Function("day"),
    }
}

/// The operator written as `token` between two operands. Words match
/// case-insensitively.
pub(crate) fn infix_kind(token: &str) -> Option<OperatorKind> {
    OperatorKind::ALL.into_iter().find(|kind| {
        matches!(syntax(*kind), Syntax::Infix { token: t, .. } if t.eq_ignore_ascii_case(token))
    })
}

pub(crate) fn prefix_kind(token: &str) -> Option<OperatorKind> {
    OperatorKind::ALL.into_iter().find(
        |kind| matches!(syntax(*kind), Syntax::Prefix(t) if t.eq_ignore_ascii_case(token)),
    )
}

pub(crate) fn function_kind(name: &str) -> Option<OperatorKind> {
    OperatorKind::ALL
        .into_iter()
        .find(|kind| matches!(syntax(*kind), Syntax::Function(n) if n == name))
}

/// Binding strength of an infix token as it appears in the input, with its
/// associativity. Words are matched case-insensitively.
pub(crate) fn infix_strength(token: &str) -> Option<(u8, Assoc)> {
    OperatorKind::ALL.into_iter().find_map(|kind| match syntax(kind) {
        Syntax::Infix {
            token: t,
            strength,
            assoc,
        } if t.eq_ignore_ascii_case(token) => Some((strength, assoc)),
        _ => None,
    })
}
