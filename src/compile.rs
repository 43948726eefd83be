//! Lowering of the expression syntax tree into the operator tree.

use crate::parse::syntax::{function_kind, infix_kind, prefix_kind};
use crate::parse::Node;
use crate::{CompileError, FieldResolver, Operand, Operator, OperatorKind, Value};

/// Build a checked operator node. Literal regex patterns are compiled here,
/// so an invalid one fails compilation instead of every evaluation.
pub(crate) fn build(kind: OperatorKind, operands: Vec<Operand>) -> Result<Operand, CompileError> {
    let mut op = Operator::new(kind, operands)?;
    op.compile_pattern()?;
    Ok(Operand::Operator(Box::new(op)))
}

/// Join two operands under an associative logical kind, absorbing children
/// of the same kind so chains become one n-ary node.
pub(crate) fn flatten(kind: OperatorKind, left: Operand, right: Operand) -> Operand {
    let mut operands = Vec::new();
    for side in [left, right] {
        match side {
            Operand::Operator(op) if op.kind() == kind => operands.extend(op.into_parts().1),
            other => operands.push(other),
        }
    }
    Operand::Operator(Box::new(Operator::from_parts_unchecked(kind, operands)))
}

pub(crate) fn compile_expression(
    node: &Node,
    resolver: &mut FieldResolver,
) -> Result<Operand, CompileError> {
    match node {
        Node::Literal(value) => Ok(Operand::Literal(value.clone())),
        Node::Array(items) => Ok(Operand::Literal(Value::Array(items.clone()))),
        Node::Field(path) => Ok(Operand::Field(resolver.resolve(path))),
        Node::Unary { op, operand } => {
            let kind = prefix_kind(op).ok_or_else(|| CompileError::UnknownOperator {
                token: op.clone(),
            })?;
            let operand = compile_expression(operand, resolver)?;
            build(kind, vec![operand])
        }
        Node::Binary { op, left, right } => {
            let kind = infix_kind(op).ok_or_else(|| CompileError::UnknownOperator {
                token: op.clone(),
            })?;
            let left = compile_expression(left, resolver)?;
            let right = compile_expression(right, resolver)?;
            match kind {
                OperatorKind::And | OperatorKind::Or | OperatorKind::Xor => {
                    Ok(flatten(kind, left, right))
                }
                _ => build(kind, vec![left, right]),
            }
        }
        Node::Call { name, args } => {
            let kind = function_kind(name).ok_or_else(|| CompileError::UnknownFunction {
                name: name.clone(),
            })?;
            let operands = args
                .iter()
                .map(|arg| compile_expression(arg, resolver))
                .collect::<Result<Vec<_>, _>>()?;
            build(kind, operands)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_expression;

    fn compile(input: &str) -> Result<Operand, CompileError> {
        let node = parse_expression(input, 256).unwrap();
        compile_expression(&node, &mut FieldResolver::new())
    }

    fn kind_of(operand: &Operand) -> OperatorKind {
        operand.as_operator().unwrap().kind()
    }

    #[test]
    fn tokens_map_to_kinds() {
        let cases = [
            ("a == 1", OperatorKind::EqualTo),
            ("a === 1", OperatorKind::Identical),
            ("a !== 1", OperatorKind::NotIdentical),
            ("a >= 1", OperatorKind::GreaterThanOrEqualTo),
            ("a in [1]", OperatorKind::In),
            ("a not in [1]", OperatorKind::NotIn),
            ("a startsWith \"x\"", OperatorKind::StartsWith),
            ("a ** 2", OperatorKind::Exponentiation),
            ("not a", OperatorKind::Not),
            ("-a", OperatorKind::Negation),
            ("abs(a)", OperatorKind::Absolute),
            ("isWeekend(a)", OperatorKind::IsWeekend),
            ("nand(a, b)", OperatorKind::Nand),
        ];
        for (input, kind) in cases {
            assert_eq!(kind_of(&compile(input).unwrap()), kind, "{input}");
        }
    }

    #[test]
    fn logical_chains_flatten() {
        let root = compile("a and b and (c and d)").unwrap();
        let op = root.as_operator().unwrap();
        assert_eq!(op.kind(), OperatorKind::And);
        assert_eq!(op.operands().len(), 4);

        let mixed = compile("a and b or c").unwrap();
        let op = mixed.as_operator().unwrap();
        assert_eq!(op.kind(), OperatorKind::Or);
        assert_eq!(kind_of(&op.operands()[0]), OperatorKind::And);
    }

    #[test]
    fn arithmetic_nests_as_value_operands() {
        let root = compile("price * qty > 100").unwrap();
        let op = root.as_operator().unwrap();
        assert_eq!(op.kind(), OperatorKind::GreaterThan);
        assert_eq!(kind_of(&op.operands()[0]), OperatorKind::Multiplication);
    }

    #[test]
    fn shared_resolver_reuses_references() {
        let mut resolver = FieldResolver::new();
        let node = parse_expression("user.age > 1 and user.age < 9", 256).unwrap();
        let root = compile_expression(&node, &mut resolver).unwrap();
        let op = root.as_operator().unwrap();
        let first = op.operands()[0].as_operator().unwrap().operands()[0]
            .as_field()
            .unwrap();
        let second = op.operands()[1].as_operator().unwrap().operands()[0]
            .as_field()
            .unwrap();
        assert!(first.ptr_eq(second));
    }

    #[test]
    fn unknown_tokens_are_semantic_errors() {
        let node = Node::binary("=~", Node::Field("a".into()), Node::Literal(Value::Int(1)));
        let err = compile_expression(&node, &mut FieldResolver::new()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown DSL operator: =~");

        let err = compile("frobnicate(a)").unwrap_err();
        assert_eq!(err.to_string(), "Unknown function: frobnicate");
    }

    #[test]
    fn wrong_argument_count_is_structural() {
        let err = compile("abs(a, b)").unwrap_err();
        assert_eq!(err.to_string(), "Absolute requires exactly 1 operand, got 2");
        assert_eq!(err.kind(), crate::ErrorKind::Structural);
    }

    #[test]
    fn literal_patterns_compile_once() {
        let root = compile("name matches \"^a.+z$\"").unwrap();
        let op = root.as_operator().unwrap();
        assert_eq!(op.pattern().map(regex::Regex::as_str), Some("^a.+z$"));

        let from_field = compile("name matches pattern").unwrap();
        assert!(from_field.as_operator().unwrap().pattern().is_none());

        let err = compile("name matches \"(\"").unwrap_err();
        assert!(matches!(err, CompileError::InvalidPattern { ref pattern, .. } if pattern == "("));
        assert_eq!(err.kind(), crate::ErrorKind::Semantic);
    }
}
