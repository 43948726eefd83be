use crate::Value;

/// Syntax tree of the expression language. Produced by the parser and
/// consumed by the compiler; operator tokens are kept as written so the
/// compiler decides what they mean.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(Value),
    Field(String),
    Array(Vec<Value>),
    Unary {
        op: String,
        operand: Box<Node>,
    },
    Binary {
        op: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    Call {
        name: String,
        args: Vec<Node>,
    },
}

impl Node {
    pub(crate) fn unary(op: impl Into<String>, operand: Node) -> Self {
        Node::Unary {
            op: op.into(),
            operand: Box::new(operand),
        }
    }

    pub(crate) fn binary(op: impl Into<String>, left: Node, right: Node) -> Self {
        Node::Binary {
            op: op.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
