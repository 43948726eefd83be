use crate::compile::build;
use crate::{CompileError, FieldResolver, Operand, Operator, OperatorKind, Value};

use super::ast::SqlNode;

/// Translate a `LIKE` pattern into an anchored regular expression:
/// `%` matches any run of characters, `_` exactly one.
pub(crate) fn like_to_regex(pattern: &str) -> String {
    let mut regex = String::from("(?s)^");
    for ch in pattern.chars() {
        match ch {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            other => regex.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    regex.push('$');
    regex
}

fn binary_kind(op: &str) -> Option<OperatorKind> {
    Some(match op {
        "=" | "==" => OperatorKind::Identical,
        "!=" | "<>" => OperatorKind::NotIdentical,
        "<" => OperatorKind::LessThan,
        "<=" => OperatorKind::LessThanOrEqualTo,
        ">" => OperatorKind::GreaterThan,
        ">=" => OperatorKind::GreaterThanOrEqualTo,
        "+" => OperatorKind::Addition,
        "-" => OperatorKind::Subtraction,
        "*" => OperatorKind::Multiplication,
        "/" => OperatorKind::Division,
        "%" => OperatorKind::Modulo,
        _ => return None,
    })
}

fn negate(operand: Operand, negated: bool) -> Result<Operand, CompileError> {
    if negated {
        build(OperatorKind::Not, vec![operand])
    } else {
        Ok(operand)
    }
}

/// Gather the operands of a chain of the same logical keyword.
fn chain<'a>(node: &'a SqlNode, keyword: &str, out: &mut Vec<&'a SqlNode>) {
    match node {
        SqlNode::Binary { op, left, right } if op.eq_ignore_ascii_case(keyword) => {
            chain(left, keyword, out);
            chain(right, keyword, out);
        }
        other => out.push(other),
    }
}

pub(crate) fn compile_where(
    node: &SqlNode,
    resolver: &mut FieldResolver,
) -> Result<Operand, CompileError> {
    match node {
        SqlNode::Literal(value) => Ok(Operand::Literal(value.clone())),
        SqlNode::Field(path) => Ok(Operand::Field(resolver.resolve(path))),
        SqlNode::Unary { op, operand } => {
            let kind = match op.to_ascii_uppercase().as_str() {
                "NOT" => OperatorKind::Not,
                "-" => OperatorKind::Negation,
                _ => return Err(CompileError::UnknownOperator { token: op.clone() }),
            };
            let operand = compile_where(operand, resolver)?;
            build(kind, vec![operand])
        }
        SqlNode::Binary { op, left, right } => {
            let logical = match op.to_ascii_uppercase().as_str() {
                "AND" => Some(OperatorKind::And),
                "OR" => Some(OperatorKind::Or),
                _ => None,
            };
            if let Some(kind) = logical {
                let mut parts = Vec::new();
                chain(node, op, &mut parts);
                let operands = parts
                    .into_iter()
                    .map(|part| compile_where(part, resolver))
                    .collect::<Result<Vec<_>, _>>()?;
                return build(kind, operands);
            }
            let kind = binary_kind(op)
                .ok_or_else(|| CompileError::UnknownOperator { token: op.clone() })?;
            let left = compile_where(left, resolver)?;
            let right = compile_where(right, resolver)?;
            build(kind, vec![left, right])
        }
        SqlNode::Between {
            expr,
            low,
            high,
            negated,
        } => {
            let subject = compile_where(expr, resolver)?;
            let low = compile_where(low, resolver)?;
            let high = compile_where(high, resolver)?;
            let range = build(
                OperatorKind::And,
                vec![
                    build(OperatorKind::GreaterThanOrEqualTo, vec![subject.clone(), low])?,
                    build(OperatorKind::LessThanOrEqualTo, vec![subject, high])?,
                ],
            )?;
            negate(range, *negated)
        }
        SqlNode::In {
            expr,
            list,
            negated,
        } => {
            let kind = if *negated {
                OperatorKind::NotIn
            } else {
                OperatorKind::In
            };
            let subject = compile_where(expr, resolver)?;
            build(kind, vec![subject, Operand::Literal(Value::Array(list.clone()))])
        }
        SqlNode::Like {
            expr,
            pattern,
            negated,
        } => {
            let subject = compile_where(expr, resolver)?;
            let regex = Operand::Literal(Value::String(like_to_regex(pattern)));
            negate(build(OperatorKind::Matches, vec![subject, regex])?, *negated)
        }
        SqlNode::IsNull { expr, negated } => {
            let subject = compile_where(expr, resolver)?;
            let is_null = build(
                OperatorKind::EqualTo,
                vec![subject, Operand::Literal(Value::Null)],
            )?;
            negate(is_null, *negated)
        }
    }
}

/// Whether `op` is the `And` node a `BETWEEN` desugars into; returns the
/// subject and bounds.
pub(crate) fn as_between(op: &Operator) -> Option<(&Operand, &Operand, &Operand)> {
    if op.kind() != OperatorKind::And {
        return None;
    }
    let [lower, upper] = op.operands() else {
        return None;
    };
    let (lower, upper) = (lower.as_operator()?, upper.as_operator()?);
    if lower.kind() != OperatorKind::GreaterThanOrEqualTo
        || upper.kind() != OperatorKind::LessThanOrEqualTo
    {
        return None;
    }
    let ([subject, low], [again, high]) = (lower.operands(), upper.operands()) else {
        return None;
    };
    (subject == again).then_some((subject, low, high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::grammar::parse_where;
    use crate::Context;

    fn compile(input: &str) -> Operand {
        let node = parse_where(input, 256).unwrap();
        compile_where(&node, &mut FieldResolver::new()).unwrap()
    }

    fn eval(input: &str, ctx: &Context) -> bool {
        crate::Rule::new(compile(input)).evaluate(ctx).unwrap()
    }

    #[test]
    fn like_translation() {
        assert_eq!(like_to_regex("J%n_"), "(?s)^J.*n.$");
        assert_eq!(like_to_regex("a.b"), "(?s)^a\\.b$");
    }

    #[test]
    fn between_desugars_to_range() {
        let root = compile("age BETWEEN 18 AND 65");
        let op = root.as_operator().unwrap();
        let (subject, low, high) = as_between(op).unwrap();
        assert_eq!(subject.as_field().unwrap().path(), "age");
        assert_eq!(low, &Operand::Literal(Value::Int(18)));
        assert_eq!(high, &Operand::Literal(Value::Int(65)));

        let range = "age >= 18 AND age <= 65";
        for age in [10_i64, 18, 30, 65, 70] {
            let ctx = Context::new().set("age", age);
            assert_eq!(eval("age BETWEEN 18 AND 65", &ctx), eval(range, &ctx));
        }
    }

    #[test]
    fn logical_chains_keep_between_intact() {
        let root = compile("a = 1 AND b BETWEEN 1 AND 2 AND c = 3");
        let op = root.as_operator().unwrap();
        assert_eq!(op.kind(), OperatorKind::And);
        assert_eq!(op.operands().len(), 3);
        assert!(as_between(op.operands()[1].as_operator().unwrap()).is_some());
    }

    #[test]
    fn equality_is_typed() {
        assert!(eval("code = '123'", &Context::new().set("code", "123")));
        assert!(!eval("code = '123'", &Context::new().set("code", 123_i64)));
        assert!(eval("code <> '123'", &Context::new().set("code", 123_i64)));
    }

    #[test]
    fn null_checks() {
        let root = compile("x IS NULL");
        assert_eq!(root.as_operator().unwrap().kind(), OperatorKind::EqualTo);
        assert!(eval("x IS NULL", &Context::new()));
        assert!(eval("x IS NOT NULL", &Context::new().set("x", 0_i64)));
    }

    #[test]
    fn like_matches_whole_value() {
        let ctx = Context::new().set("name", "John");
        assert!(eval("name LIKE 'J%'", &ctx));
        assert!(eval("name LIKE 'J_hn'", &ctx));
        assert!(!eval("name LIKE 'oh'", &ctx));
        assert!(eval("name NOT LIKE 'X%'", &ctx));
    }

    #[test]
    fn unknown_operator() {
        let node = SqlNode::binary(
            "~",
            SqlNode::Field("a".into()),
            SqlNode::Literal(Value::Int(1)),
        );
        let err = compile_where(&node, &mut FieldResolver::new()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown DSL operator: ~");
    }
}
