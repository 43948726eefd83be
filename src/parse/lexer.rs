use winnow::ascii::digit1;
use winnow::combinator::{alt, cut_err, opt, repeat};
use winnow::error::{ContextError, ErrMode, ModalResult};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use super::ParseError;

/// A lexical token. Keywords are plain identifiers; the grammar decides
/// which words are reserved.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token<'i> {
    Ident(&'i str),
    /// Number text as written, without sign.
    Number(&'i str),
    Str(String),
    Symbol(&'static str),
}

impl Token<'_> {
    pub(crate) fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self, Token::Symbol(s) if *s == symbol)
    }

    pub(crate) fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Ident(word) if word.eq_ignore_ascii_case(keyword))
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Ident(s) | Token::Number(s) => format!("'{s}'"),
            Token::Str(s) => format!("string \"{s}\""),
            Token::Symbol(s) => format!("'{s}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned<'i> {
    pub(crate) token: Token<'i>,
    /// Byte offset of the token's first character.
    pub(crate) position: usize,
}

/// Symbols of the expression language, longest first.
pub(crate) const EXPRESSION_SYMBOLS: &[&str] = &[
    "===", "!==", "==", "!=", ">=", "<=", "**", ">", "<", "*", "/", "%", "+", "-", "(", ")", "[",
    "]", ",",
];

fn segment<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

// Identifiers may be dotted paths; segments after the first may start with a
// digit so list indexes (`items.0`) read naturally.
fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
        repeat::<_, _, (), _, _>(0.., ('.', segment)),
    )
        .take()
        .parse_next(input)
}

fn number<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        digit1,
        opt(('.', digit1)),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .parse_next(input)
}

/// A single- or double-quoted string. Backslash escapes and a doubled
/// quote character are both recognized.
fn string_literal(input: &mut &str) -> ModalResult<String> {
    let quote = one_of(['"', '\'']).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = cut_err(any).parse_next(input)?;
        if ch == quote {
            if input.starts_with(quote) {
                any.parse_next(input)?;
                s.push(quote);
                continue;
            }
            return Ok(s);
        }
        if ch == '\\' {
            match cut_err(any).parse_next(input)? {
                'n' => s.push('\n'),
                't' => s.push('\t'),
                'r' => s.push('\r'),
                esc @ ('"' | '\'' | '\\') => s.push(esc),
                other => {
                    s.push('\\');
                    s.push(other);
                }
            }
        } else {
            s.push(ch);
        }
    }
}

fn symbol(symbols: &'static [&'static str]) -> impl FnMut(&mut &str) -> ModalResult<&'static str> {
    move |input: &mut &str| {
        for sym in symbols {
            if let Some(rest) = input.strip_prefix(sym) {
                *input = rest;
                return Ok(*sym);
            }
        }
        Err(ErrMode::Backtrack(ContextError::new()))
    }
}

/// Split `source` into tokens using the given symbol table (longest first).
pub(crate) fn tokenize<'i>(
    source: &'i str,
    symbols: &'static [&'static str],
) -> Result<Vec<Spanned<'i>>, ParseError> {
    let mut input = source;
    let mut tokens = Vec::new();
    loop {
        input = input.trim_start();
        let Some(first) = input.chars().next() else {
            break;
        };
        let position = source.len() - input.len();
        let token = alt((
            string_literal.map(Token::Str),
            number.map(Token::Number),
            ident.map(Token::Ident),
            symbol(symbols).map(Token::Symbol),
        ))
        .parse_next(&mut input)
        .map_err(|_| {
            if matches!(first, '"' | '\'') {
                ParseError::new("Unterminated string literal", position)
            } else {
                ParseError::new(format!("Unexpected character '{first}'"), position)
            }
        })?;
        tokens.push(Spanned { token, position });
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token<'_>> {
        tokenize(input, EXPRESSION_SYMBOLS)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn comparison_tokens() {
        assert_eq!(
            lex("user.age >= 18"),
            vec![
                Token::Ident("user.age"),
                Token::Symbol(">="),
                Token::Number("18"),
            ]
        );
    }

    #[test]
    fn longest_symbol_wins() {
        assert_eq!(
            lex("a === b !== c ** 2"),
            vec![
                Token::Ident("a"),
                Token::Symbol("==="),
                Token::Ident("b"),
                Token::Symbol("!=="),
                Token::Ident("c"),
                Token::Symbol("**"),
                Token::Number("2"),
            ]
        );
    }

    #[test]
    fn numbers_never_carry_a_sign() {
        assert_eq!(
            lex("-3.5e2"),
            vec![Token::Symbol("-"), Token::Number("3.5e2")]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            lex(r#""say \"hi\"\n" 'it''s'"#),
            vec![
                Token::Str("say \"hi\"\n".into()),
                Token::Str("it's".into()),
            ]
        );
    }

    #[test]
    fn indexed_paths() {
        assert_eq!(lex("items.0.name"), vec![Token::Ident("items.0.name")]);
    }

    #[test]
    fn positions_are_byte_offsets() {
        let tokens = tokenize("a  == 1", EXPRESSION_SYMBOLS).unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 3, 6]);
    }

    #[test]
    fn lexical_errors() {
        let err = tokenize("name == \"open", EXPRESSION_SYMBOLS).unwrap_err();
        assert_eq!(err.message(), "Unterminated string literal");
        assert_eq!(err.position(), Some(8));

        let err = tokenize("a @ b", EXPRESSION_SYMBOLS).unwrap_err();
        assert_eq!(err.message(), "Unexpected character '@'");
        assert_eq!(err.position(), Some(2));
    }
}
