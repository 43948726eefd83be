use crate::parse::cursor::Cursor;
use crate::parse::grammar::{literal_list, number_value};
use crate::parse::lexer::{tokenize, Spanned, Token};
use crate::parse::ParseError;
use crate::Value;

use super::ast::SqlNode;

/// Symbols of the `WHERE` grammar, longest first.
const SQL_SYMBOLS: &[&str] = &[
    "<>", "<=", ">=", "!=", "==", "=", "<", ">", "+", "-", "*", "/", "%", "(", ")", "[", "]", ",",
];

pub(crate) const KEYWORDS: &[&str] = &[
    "and", "or", "not", "in", "between", "like", "is", "null", "true", "false",
];

const COMPARISONS: &[&str] = &["=", "==", "!=", "<>", "<", "<=", ">", ">="];

/// Parse a `WHERE` clause (without the `WHERE` keyword).
///
/// Grammar, weakest first: `OR`, `AND`, `NOT`, predicates (comparison,
/// `[NOT] IN`, `[NOT] BETWEEN`, `[NOT] LIKE`, `IS [NOT] NULL`), `+ -`,
/// `* / %`, unary minus, operands.
pub(crate) fn parse_where(input: &str, max_depth: usize) -> Result<SqlNode, ParseError> {
    let tokens = tokenize(input, SQL_SYMBOLS)?;
    if tokens.is_empty() {
        return Err(ParseError::new("Expression must not be empty", 0));
    }
    let mut cursor = Cursor::new(&tokens, input.len(), max_depth);
    let node = or_expr(&mut cursor)?;
    cursor.finish()?;
    Ok(node)
}

fn or_expr(c: &mut Cursor<'_, '_>) -> Result<SqlNode, ParseError> {
    let mut left = and_expr(c)?;
    while c.eat_keyword("or") {
        let right = c.descend(and_expr)?;
        left = SqlNode::binary("OR", left, right);
    }
    Ok(left)
}

fn and_expr(c: &mut Cursor<'_, '_>) -> Result<SqlNode, ParseError> {
    let mut left = not_expr(c)?;
    while c.eat_keyword("and") {
        let right = c.descend(not_expr)?;
        left = SqlNode::binary("AND", left, right);
    }
    Ok(left)
}

fn not_expr(c: &mut Cursor<'_, '_>) -> Result<SqlNode, ParseError> {
    if c.eat_keyword("not") {
        let operand = c.descend(not_expr)?;
        return Ok(SqlNode::Unary {
            op: "NOT".to_owned(),
            operand: Box::new(operand),
        });
    }
    predicate(c)
}

fn predicate(c: &mut Cursor<'_, '_>) -> Result<SqlNode, ParseError> {
    let expr = additive(c)?;

    if let Some(Token::Symbol(op)) = c.peek() {
        if COMPARISONS.contains(op) {
            c.advance(1);
            let right = c.descend(additive)?;
            return Ok(SqlNode::binary(*op, expr, right));
        }
    }

    if c.eat_keyword("is") {
        let negated = c.eat_keyword("not");
        c.expect_keyword("null")?;
        return Ok(SqlNode::IsNull {
            expr: Box::new(expr),
            negated,
        });
    }

    let negated = c.at_keyword("not")
        && c
            .peek_nth(1)
            .is_some_and(|t| t.is_keyword("in") || t.is_keyword("between") || t.is_keyword("like"));
    if negated {
        c.advance(1);
    }

    if c.eat_keyword("in") {
        let close = if c.eat_symbol("(") {
            ")"
        } else if c.eat_symbol("[") {
            "]"
        } else {
            return Err(c.unexpected());
        };
        let list = literal_list(c, close, |c| {
            Ok(match additive(c)? {
                SqlNode::Literal(value) => Some(value),
                _ => None,
            })
        })?;
        return Ok(SqlNode::In {
            expr: Box::new(expr),
            list,
            negated,
        });
    }

    if c.eat_keyword("between") {
        let low = c.descend(additive)?;
        c.expect_keyword("and")?;
        let high = c.descend(additive)?;
        return Ok(SqlNode::Between {
            expr: Box::new(expr),
            low: Box::new(low),
            high: Box::new(high),
            negated,
        });
    }

    if c.eat_keyword("like") {
        let position = c.position();
        return match c.next() {
            Some(Spanned {
                token: Token::Str(pattern),
                ..
            }) => Ok(SqlNode::Like {
                expr: Box::new(expr),
                pattern: pattern.clone(),
                negated,
            }),
            Some(_) => Err(ParseError::new("LIKE requires a string pattern", position)),
            None => Err(c.end_of_input()),
        };
    }

    Ok(expr)
}

fn additive(c: &mut Cursor<'_, '_>) -> Result<SqlNode, ParseError> {
    let mut left = multiplicative(c)?;
    loop {
        let op = if c.eat_symbol("+") {
            "+"
        } else if c.eat_symbol("-") {
            "-"
        } else {
            return Ok(left);
        };
        let right = c.descend(multiplicative)?;
        left = SqlNode::binary(op, left, right);
    }
}

fn multiplicative(c: &mut Cursor<'_, '_>) -> Result<SqlNode, ParseError> {
    let mut left = unary(c)?;
    loop {
        let op = if c.eat_symbol("*") {
            "*"
        } else if c.eat_symbol("/") {
            "/"
        } else if c.eat_symbol("%") {
            "%"
        } else {
            return Ok(left);
        };
        let right = c.descend(unary)?;
        left = SqlNode::binary(op, left, right);
    }
}

fn unary(c: &mut Cursor<'_, '_>) -> Result<SqlNode, ParseError> {
    if c.eat_symbol("-") {
        if let Some(Token::Number(text)) = c.peek() {
            let position = c.position();
            c.advance(1);
            return number_value(text, true, position).map(SqlNode::Literal);
        }
        let operand = c.descend(unary)?;
        return Ok(SqlNode::Unary {
            op: "-".to_owned(),
            operand: Box::new(operand),
        });
    }
    operand(c)
}

fn operand(c: &mut Cursor<'_, '_>) -> Result<SqlNode, ParseError> {
    let Some(Spanned { token, position }) = c.next() else {
        return Err(c.end_of_input());
    };
    let position = *position;
    match token {
        Token::Number(text) => number_value(text, false, position).map(SqlNode::Literal),
        Token::Str(s) => Ok(SqlNode::Literal(Value::String(s.clone()))),
        Token::Symbol("(") => {
            let inner = c.descend(or_expr)?;
            c.expect_symbol(")")?;
            Ok(inner)
        }
        Token::Ident(word) => {
            let lower = word.to_ascii_lowercase();
            match lower.as_str() {
                "true" => Ok(SqlNode::Literal(Value::Bool(true))),
                "false" => Ok(SqlNode::Literal(Value::Bool(false))),
                "null" => Ok(SqlNode::Literal(Value::Null)),
                kw if KEYWORDS.contains(&kw) => Err(ParseError::new(
                    format!("Unexpected keyword '{word}'"),
                    position,
                )),
                _ => {
                    c.check_path(word, position)?;
                    Ok(SqlNode::Field((*word).to_owned()))
                }
            }
        }
        other => Err(ParseError::new(
            format!("Unexpected token {}", other.describe()),
            position,
        )),
    }
}
