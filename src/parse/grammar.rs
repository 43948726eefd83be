use crate::Value;

use super::ast::Node;
use super::cursor::Cursor;
use super::lexer::{Spanned, Token};
use super::syntax::{infix_strength, strength, Assoc};
use super::ParseError;

const RESERVED: &[&str] = &[
    "and", "or", "xor", "not", "in", "contains", "startsWith", "endsWith", "matches",
];

/// Read a number token. `negative` folds a preceding unary minus into the
/// literal so `-9223372036854775808` stays an integer.
pub(crate) fn number_value(
    text: &str,
    negative: bool,
    position: usize,
) -> Result<Value, ParseError> {
    let signed = if negative {
        format!("-{text}")
    } else {
        text.to_owned()
    };
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(i) = signed.parse::<i64>() {
            return Ok(Value::Int(i));
        }
    }
    signed
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| ParseError::new(format!("Invalid number '{signed}'"), position))
}

pub(crate) fn parse_tokens(
    tokens: &[Spanned<'_>],
    input_len: usize,
    max_depth: usize,
) -> Result<Node, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::new("Expression must not be empty", 0));
    }
    let mut cursor = Cursor::new(tokens, input_len, max_depth);
    let node = expr(&mut cursor, 0)?;
    cursor.finish()?;
    Ok(node)
}

/// The infix operator at the cursor: its token, strength, associativity,
/// and how many tokens it spans.
fn peek_infix(c: &Cursor<'_, '_>) -> Option<(String, u8, Assoc, usize)> {
    match c.peek()? {
        Token::Symbol(sym) => infix_strength(sym).map(|(s, a)| ((*sym).to_owned(), s, a, 1)),
        Token::Ident(word) if word.eq_ignore_ascii_case("not") => c
            .peek_nth(1)?
            .is_keyword("in")
            .then(|| ("not in".to_owned(), strength::MEMBERSHIP, Assoc::Left, 2)),
        Token::Ident(word) => infix_strength(word).map(|(s, a)| ((*word).to_owned(), s, a, 1)),
        _ => None,
    }
}

/// Precedence climbing: parse operators binding at least `min_strength`.
fn expr(c: &mut Cursor<'_, '_>, min_strength: u8) -> Result<Node, ParseError> {
    let mut left = unary(c)?;
    while let Some((op, strength, assoc, width)) = peek_infix(c) {
        if strength < min_strength {
            break;
        }
        c.advance(width);
        let next_min = match assoc {
            Assoc::Left => strength + 1,
            Assoc::Right => strength,
        };
        let right = c.descend(|c| expr(c, next_min))?;
        left = Node::binary(op, left, right);
    }
    Ok(left)
}

fn unary(c: &mut Cursor<'_, '_>) -> Result<Node, ParseError> {
    if c.eat_keyword("not") {
        let operand = c.descend(unary)?;
        return Ok(Node::unary("not", operand));
    }
    if c.eat_symbol("-") {
        if let Some(Token::Number(text)) = c.peek() {
            let position = c.position();
            c.advance(1);
            return number_value(text, true, position).map(Node::Literal);
        }
        let operand = c.descend(unary)?;
        return Ok(Node::unary("-", operand));
    }
    primary(c)
}

fn primary(c: &mut Cursor<'_, '_>) -> Result<Node, ParseError> {
    let Some(Spanned { token, position }) = c.next() else {
        return Err(c.end_of_input());
    };
    let position = *position;
    match token {
        Token::Number(text) => number_value(text, false, position).map(Node::Literal),
        Token::Str(s) => Ok(Node::Literal(Value::String(s.clone()))),
        Token::Symbol("(") => {
            let inner = c.descend(|c| expr(c, 0))?;
            c.expect_symbol(")")?;
            Ok(inner)
        }
        Token::Symbol("[") => array(c),
        Token::Ident(word) => {
            if let Some(value) = keyword_literal(word) {
                return Ok(Node::Literal(value));
            }
            if RESERVED.iter().any(|r| r.eq_ignore_ascii_case(word)) {
                return Err(ParseError::new(
                    format!("Unexpected keyword '{word}'"),
                    position,
                ));
            }
            if c.eat_symbol("(") {
                return call(c, word);
            }
            c.check_path(word, position)?;
            Ok(Node::Field((*word).to_owned()))
        }
        other => Err(ParseError::new(
            format!("Unexpected token {}", other.describe()),
            position,
        )),
    }
}

/// A bracketed list of literal values, after the opening `[`.
pub(crate) fn literal_list(
    c: &mut Cursor<'_, '_>,
    close: &str,
    element: impl Fn(&mut Cursor<'_, '_>) -> Result<Option<Value>, ParseError>,
) -> Result<Vec<Value>, ParseError> {
    let mut items = Vec::new();
    if c.eat_symbol(close) {
        return Ok(items);
    }
    loop {
        let position = c.position();
        match c.descend(|c| element(c))? {
            Some(value) => items.push(value),
            None => {
                return Err(ParseError::new(
                    "List elements must be literals",
                    position,
                ))
            }
        }
        if !c.eat_symbol(",") {
            break;
        }
    }
    c.expect_symbol(close)?;
    Ok(items)
}

fn array(c: &mut Cursor<'_, '_>) -> Result<Node, ParseError> {
    let items = literal_list(c, "]", |c| {
        Ok(match expr(c, 0)? {
            Node::Literal(value) => Some(value),
            Node::Array(values) => Some(Value::Array(values)),
            _ => None,
        })
    })?;
    Ok(Node::Array(items))
}

fn call(c: &mut Cursor<'_, '_>, name: &str) -> Result<Node, ParseError> {
    let mut args = Vec::new();
    if !c.eat_symbol(")") {
        loop {
            args.push(c.descend(|c| expr(c, 0))?);
            if !c.eat_symbol(",") {
                break;
            }
        }
        c.expect_symbol(")")?;
    }
    Ok(Node::Call {
        name: name.to_owned(),
        args,
    })
}

pub(crate) fn keyword_literal(word: &str) -> Option<Value> {
    match word.to_ascii_lowercase().as_str() {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        "null" => Some(Value::Null),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_expression;
    use super::*;

    fn parse(input: &str) -> Node {
        parse_expression(input, 256).unwrap()
    }

    fn field(name: &str) -> Node {
        Node::Field(name.to_owned())
    }

    fn int(i: i64) -> Node {
        Node::Literal(Value::Int(i))
    }

    #[test]
    fn comparison() {
        assert_eq!(parse("age >= 18"), Node::binary(">=", field("age"), int(18)));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expected = Node::binary(
            "or",
            Node::binary("==", field("a"), int(1)),
            Node::binary(
                "and",
                Node::binary("==", field("b"), int(2)),
                Node::binary("==", field("c"), int(3)),
            ),
        );
        assert_eq!(parse("a == 1 or b == 2 and c == 3"), expected);
    }

    #[test]
    fn xor_sits_between_and_and_or() {
        let expected = Node::binary(
            "or",
            field("a"),
            Node::binary("xor", field("b"), Node::binary("and", field("c"), field("d"))),
        );
        assert_eq!(parse("a or b xor c and d"), expected);
    }

    #[test]
    fn arithmetic_precedence_and_associativity() {
        assert_eq!(
            parse("1 + 2 * 3"),
            Node::binary("+", int(1), Node::binary("*", int(2), int(3)))
        );
        assert_eq!(
            parse("10 - 4 - 3"),
            Node::binary("-", Node::binary("-", int(10), int(4)), int(3))
        );
        assert_eq!(
            parse("2 ** 3 ** 2"),
            Node::binary("**", int(2), Node::binary("**", int(3), int(2)))
        );
    }

    #[test]
    fn parentheses_override() {
        assert_eq!(
            parse("(1 + 2) * 3"),
            Node::binary("*", Node::binary("+", int(1), int(2)), int(3))
        );
    }

    #[test]
    fn unary_operators() {
        assert_eq!(parse("-5"), int(-5));
        assert_eq!(parse("-x"), Node::unary("-", field("x")));
        assert_eq!(parse("- -5"), Node::unary("-", int(-5)));
        assert_eq!(
            parse("not (a == 1)"),
            Node::unary("not", Node::binary("==", field("a"), int(1)))
        );
        assert_eq!(
            parse("NOT active"),
            Node::unary("not", field("active"))
        );
        assert_eq!(parse("-9223372036854775808"), int(i64::MIN));
    }

    #[test]
    fn membership() {
        let list = Node::Array(vec![Value::from("banned"), Value::from("deleted")]);
        assert_eq!(
            parse(r#"status not in ["banned", "deleted"]"#),
            Node::binary("not in", field("status"), list.clone())
        );
        assert_eq!(
            parse(r#"status in ["banned", "deleted"]"#),
            Node::binary("in", field("status"), list)
        );
        assert_eq!(parse("x in []"), Node::binary("in", field("x"), Node::Array(vec![])));
    }

    #[test]
    fn literals() {
        assert_eq!(parse("1.5"), Node::Literal(Value::Float(1.5)));
        assert_eq!(parse("true"), Node::Literal(Value::Bool(true)));
        assert_eq!(parse("null"), Node::Literal(Value::Null));
        assert_eq!(parse("'hi'"), Node::Literal(Value::from("hi")));
        assert_eq!(
            parse("99999999999999999999"),
            Node::Literal(Value::Float(1e20))
        );
    }

    #[test]
    fn function_calls() {
        assert_eq!(
            parse("lower(name) == \"bob\""),
            Node::binary(
                "==",
                Node::Call {
                    name: "lower".into(),
                    args: vec![field("name")]
                },
                Node::Literal(Value::from("bob"))
            )
        );
        assert_eq!(
            parse("now()"),
            Node::Call {
                name: "now".into(),
                args: vec![]
            }
        );
    }

    #[test]
    fn syntax_errors_carry_positions() {
        let cases = [
            ("(a == 1", "Expected ')' but reached end of input", 7),
            ("a ==", "Unexpected end of input", 4),
            ("a == 1)", "Unexpected token ')'", 6),
            ("a == and", "Unexpected keyword 'and'", 5),
            ("[a]", "List elements must be literals", 1),
            ("a b", "Unexpected token 'b'", 2),
        ];
        for (input, message, position) in cases {
            let err = parse_expression(input, 256).unwrap_err();
            assert_eq!(err.message(), message, "{input}");
            assert_eq!(err.position(), Some(position), "{input}");
        }
    }

    #[test]
    fn nesting_limit() {
        let deep = format!("{}x{}", "(".repeat(20), ")".repeat(20));
        assert!(parse_expression(&deep, 64).is_ok());
        let err = parse_expression(&deep, 8).unwrap_err();
        assert_eq!(err.message(), "Maximum nesting depth of 8 exceeded");
    }

    #[test]
    fn field_path_segments_count_toward_nesting() {
        assert!(parse_expression("a.b.c.d == 1", 4).is_ok());
        let err = parse_expression("x == 1 and a.b.c.d.e == 1", 4).unwrap_err();
        assert_eq!(err.message(), "Maximum nesting depth of 4 exceeded");
        assert_eq!(err.position(), Some(11));
    }
}
