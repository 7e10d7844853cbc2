//! Tokens and the reader the keyword handlers walk them with.
use std::path::Path;

use strum::{Display, EnumIs};

use crate::{
    error::{DslError, DslResult},
    lexer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum TokenFlag {
    Standard,
    String,
    Char,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Source text, quotes included for literals.
    pub text: String,
    pub flag: TokenFlag,
    /// 1-based source line.
    pub line: usize,
    /// Byte offset in the source.
    pub offset: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, flag: TokenFlag, line: usize, offset: usize) -> Self {
        Self {
            text: text.into(),
            flag,
            line,
            offset,
        }
    }

    pub fn is_string_literal(&self) -> bool {
        self.flag.is_string()
    }

    /// `@Name` tokens.
    pub fn is_keyword(&self) -> bool {
        self.flag.is_standard() && self.text.len() > 1 && self.text.starts_with('@')
    }

    pub fn is_identifier(&self) -> bool {
        self.flag.is_standard() && bhvmodel::utils::is_valid_identifier(&self.text)
    }

    /// Punctuation or identifier equal to `text`.
    pub fn is(&self, text: &str) -> bool {
        self.flag.is_standard() && self.text == text
    }

    /// Text of a string literal without its quotes.
    pub fn unquoted(&self) -> &str {
        match self.flag {
            TokenFlag::String | TokenFlag::Char if self.text.len() >= 2 => &self.text[1..self.text.len() - 1],
            _ => &self.text,
        }
    }
}

/// Every token of one input, with the name of the file it comes from.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    file: Option<String>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>, file: Option<String>) -> Self {
        Self { tokens, file }
    }

    /// Tokenize `src`.
    pub fn lex(src: &str, file: Option<&str>) -> DslResult<Self> {
        Ok(Self::new(lexer::lex(src)?, file.map(str::to_string)))
    }

    pub fn from_path(path: &Path) -> DslResult<Self> {
        let src = std::fs::read_to_string(path)?;
        Self::lex(&src, Some(&path.display().to_string()))
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn reader(&self) -> TokenReader<'_> {
        TokenReader::new(self)
    }
}

/// Position in a [`TokenStream`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(usize);

impl Cursor {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A cursor bound to its stream.
///
/// Readers are `Copy`: a handler can look ahead by reading from a copy and
/// commit with [`TokenReader::seek`].
#[derive(Debug, Clone, Copy)]
pub struct TokenReader<'s> {
    stream: &'s TokenStream,
    position: usize,
}

impl<'s> TokenReader<'s> {
    pub fn new(stream: &'s TokenStream) -> Self {
        Self { stream, position: 0 }
    }

    pub fn stream(&self) -> &'s TokenStream {
        self.stream
    }

    pub fn cursor(&self) -> Cursor {
        Cursor(self.position)
    }

    pub fn seek(&mut self, cursor: Cursor) {
        self.position = cursor.0.min(self.stream.tokens.len());
    }

    pub fn is_end(&self) -> bool {
        self.position >= self.stream.tokens.len()
    }

    pub fn peek(&self) -> Option<&'s Token> {
        self.stream.tokens.get(self.position)
    }

    pub fn peek_nth(&self, n: usize) -> Option<&'s Token> {
        self.stream.tokens.get(self.position + n)
    }

    /// Line of the current token, or of the last one at end of stream.
    pub fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.stream.tokens.last())
            .map_or(0, |t| t.line)
    }

    pub fn next(&mut self) -> DslResult<&'s Token> {
        let token = self.peek().ok_or(DslError::UnexpectedEndOfFile { line: self.line() })?;
        self.position += 1;
        Ok(token)
    }

    /// Returns `true` if the current token is `text`.
    pub fn check(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is(text))
    }

    /// Skip the current token if it is `text`.
    pub fn consume(&mut self, text: &str) -> bool {
        let found = self.check(text);
        if found {
            self.position += 1;
        }
        found
    }

    pub fn expect(&mut self, text: &str) -> DslResult<&'s Token> {
        let token = self.next()?;
        if !token.is(text) {
            return Err(DslError::unexpected(format!("`{text}`"), token));
        }
        Ok(token)
    }

    pub fn read_identifier(&mut self) -> DslResult<&'s str> {
        let token = self.next()?;
        if !token.is_identifier() {
            return Err(DslError::unexpected("an identifier", token));
        }
        Ok(&token.text)
    }

    /// Read a string literal and strip its quotes.
    pub fn read_string(&mut self) -> DslResult<&'s str> {
        let token = self.next()?;
        if !token.is_string_literal() {
            return Err(DslError::unexpected("a string", token));
        }
        Ok(token.unquoted())
    }

    /// Read a possibly signed number.
    pub fn read_f64(&mut self) -> DslResult<f64> {
        let negative = if self.consume("-") {
            true
        } else {
            self.consume("+");
            false
        };
        let token = self.next()?;
        if !token.flag.is_number() {
            return Err(DslError::unexpected("a number", token));
        }
        let value = parse_f64(&token.text).ok_or_else(|| DslError::InvalidNumber {
            text: token.text.clone(),
            line: token.line,
        })?;
        Ok(if negative { -value } else { value })
    }

    pub fn read_unsigned(&mut self) -> DslResult<u32> {
        let token = self.next()?;
        let digits = token.text.trim_end_matches(['u', 'U', 'l', 'L']);
        if !token.flag.is_number() {
            return Err(DslError::unexpected("an unsigned integer", token));
        }
        digits.parse().map_err(|_| DslError::InvalidNumber {
            text: token.text.clone(),
            line: token.line,
        })
    }

    pub fn read_bool(&mut self) -> DslResult<bool> {
        let token = self.next()?;
        match token.text.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(DslError::unexpected("a boolean", token)),
        }
    }

    /// Read `open a, b, ... close` and return the items.
    pub fn read_list(&mut self, open: &str, close: &str) -> DslResult<Vec<&'s Token>> {
        self.expect(open)?;
        let mut items = Vec::new();
        if self.consume(close) {
            return Ok(items);
        }
        loop {
            items.push(self.next()?);
            let token = self.next()?;
            if token.is(close) {
                return Ok(items);
            }
            if !token.is(",") {
                return Err(DslError::unexpected(format!("`,` or `{close}`"), token));
            }
        }
    }

    /// Read every token up to the next `;`, which is consumed.
    pub fn read_until_semicolon(&mut self) -> DslResult<Vec<&'s Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next()?;
            if token.is(";") {
                return Ok(tokens);
            }
            tokens.push(token);
        }
    }
}

/// Parse a numeric literal, ignoring C-style suffixes (`1.5f`, `3u`, `3D`).
fn parse_f64(text: &str) -> Option<f64> {
    text.parse().ok().or_else(|| {
        text.trim_end_matches(|c: char| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
            .parse()
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_suffixes() {
        assert_eq!(parse_f64("1.e-5"), Some(1e-5));
        assert_eq!(parse_f64("2.5f"), Some(2.5));
        assert_eq!(parse_f64("3D"), Some(3.));
        assert_eq!(parse_f64("x"), None);
    }
}
