use crate::Value;

/// Syntax tree of a SQL `WHERE` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlNode {
    Literal(Value),
    Field(String),
    Unary {
        op: String,
        operand: Box<SqlNode>,
    },
    Binary {
        op: String,
        left: Box<SqlNode>,
        right: Box<SqlNode>,
    },
    Between {
        expr: Box<SqlNode>,
        low: Box<SqlNode>,
        high: Box<SqlNode>,
        negated: bool,
    },
    In {
        expr: Box<SqlNode>,
        list: Vec<Value>,
        negated: bool,
    },
    Like {
        expr: Box<SqlNode>,
        pattern: String,
        negated: bool,
    },
    IsNull {
        expr: Box<SqlNode>,
        negated: bool,
    },
}

impl SqlNode {
    pub(crate) fn binary(op: impl Into<String>, left: SqlNode, right: SqlNode) -> Self {
        SqlNode::Binary {
            op: op.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
