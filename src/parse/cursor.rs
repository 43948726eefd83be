use super::lexer::{Spanned, Token};
use super::ParseError;

/// A position in a token stream, with the nesting guard shared by every
/// recursive-descent grammar.
pub(crate) struct Cursor<'t, 'i> {
    tokens: &'t [Spanned<'i>],
    pos: usize,
    end: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t, 'i> Cursor<'t, 'i> {
    pub(crate) fn new(tokens: &'t [Spanned<'i>], input_len: usize, max_depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            end: input_len,
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn peek(&self) -> Option<&'t Token<'i>> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    pub(crate) fn peek_nth(&self, n: usize) -> Option<&'t Token<'i>> {
        self.tokens.get(self.pos + n).map(|s| &s.token)
    }

    pub(crate) fn next(&mut self) -> Option<&'t Spanned<'i>> {
        let spanned = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(spanned)
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Byte offset of the next token, or the input length at the end.
    pub(crate) fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |s| s.position)
    }

    pub(crate) fn at_symbol(&self, symbol: &str) -> bool {
        self.peek().is_some_and(|t| t.is_symbol(symbol))
    }

    pub(crate) fn at_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(keyword))
    }

    /// Consume `symbol` if it is next.
    pub(crate) fn eat_symbol(&mut self, symbol: &str) -> bool {
        let found = self.at_symbol(symbol);
        if found {
            self.pos += 1;
        }
        found
    }

    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        let found = self.at_keyword(keyword);
        if found {
            self.pos += 1;
        }
        found
    }

    pub(crate) fn end_of_input(&self) -> ParseError {
        ParseError::new("Unexpected end of input", self.end)
    }

    pub(crate) fn unexpected(&self) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(s) => ParseError::new(
                format!("Unexpected token {}", s.token.describe()),
                s.position,
            ),
            None => self.end_of_input(),
        }
    }

    pub(crate) fn expect_symbol(&mut self, symbol: &str) -> Result<(), ParseError> {
        self.expect(symbol, |t| t.is_symbol(symbol))
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        self.expect(keyword, |t| t.is_keyword(keyword))
    }

    fn expect(
        &mut self,
        what: &str,
        matches: impl Fn(&Token<'_>) -> bool,
    ) -> Result<(), ParseError> {
        match self.tokens.get(self.pos) {
            Some(s) if matches(&s.token) => {
                self.pos += 1;
                Ok(())
            }
            Some(s) => Err(ParseError::new(
                format!("Expected '{what}' but found {}", s.token.describe()),
                s.position,
            )),
            None => Err(ParseError::new(
                format!("Expected '{what}' but reached end of input"),
                self.end,
            )),
        }
    }

    /// Fail unless every token has been consumed.
    pub(crate) fn finish(&self) -> Result<(), ParseError> {
        if self.pos < self.tokens.len() {
            Err(self.unexpected())
        } else {
            Ok(())
        }
    }

    fn too_deep(&self, position: usize) -> ParseError {
        ParseError::new(
            format!("Maximum nesting depth of {} exceeded", self.max_depth),
            position,
        )
    }

    /// Each segment of a dotted field path is one level of property access,
    /// so long paths count against the same limit as nested expressions.
    pub(crate) fn check_path(&self, path: &str, position: usize) -> Result<(), ParseError> {
        if path.split('.').count() > self.max_depth {
            return Err(self.too_deep(position));
        }
        Ok(())
    }

    /// Run `f` one nesting level deeper, failing past the configured depth.
    pub(crate) fn descend<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.max_depth {
            return Err(self.too_deep(self.position()));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
