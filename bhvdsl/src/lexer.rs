//! Tokenizer for behaviour files, built with chumsky.
//!
//! Produces a flat list of [`Token`]s: `@Keyword`s, identifiers, numbers
//! (exponents and C-style suffixes included), string and character literals,
//! multi-character operators and single punctuation. `//` and `/* */`
//! comments are skipped.
use chumsky::prelude::*;

use crate::{
    error::{DslError, DslResult},
    token::{Token, TokenFlag},
};

type Lexed<'a> = (TokenFlag, &'a str);

fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<(Lexed<'a>, SimpleSpan)>, extra::Err<Rich<'a, char>>> {
    let word = any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
                .repeated(),
        )
        .to_slice();

    let keyword = just('@')
        .then(word.clone())
        .to_slice()
        .map(|s| (TokenFlag::Standard, s));
    let identifier = word.map(|s| (TokenFlag::Standard, s));

    let digits = any().filter(|c: &char| c.is_ascii_digit()).repeated().at_least(1);
    let exponent = one_of("eE").then(one_of("+-").or_not()).then(digits.clone());
    let suffix = any()
        .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
        .repeated();
    let number = choice((
        digits
            .clone()
            .then(just('.').then(digits.clone().or_not()).or_not())
            .ignored(),
        just('.').then(digits).ignored(),
    ))
    .then(exponent.or_not())
    .then(suffix)
    .to_slice()
    .map(|s| (TokenFlag::Number, s));

    let escaped = just('\\').then(any()).ignored();
    let string = just('"')
        .then(none_of("\\\"").ignored().or(escaped.clone()).repeated())
        .then(just('"'))
        .to_slice()
        .map(|s| (TokenFlag::String, s))
        .labelled("string literal")
        .as_context();
    let character = just('\'')
        .then(none_of("\\'").ignored().or(escaped).repeated())
        .then(just('\''))
        .to_slice()
        .map(|s| (TokenFlag::Char, s))
        .labelled("character literal")
        .as_context();

    let operator = choice((
        just("+="),
        just("-="),
        just("*="),
        just("/="),
        just("=="),
        just("!="),
        just("<="),
        just(">="),
        just("&&"),
        just("||"),
        just("->"),
        just("::"),
        just("++"),
        just("--"),
    ))
    .to_slice()
        .map(|s| (TokenFlag::Standard, s));
    let punctuation = any()
        .filter(|c: &char| c.is_ascii_punctuation() && !matches!(c, '"' | '\''))
        .to_slice()
        .map(|s| (TokenFlag::Standard, s));

    let token = choice((
        keyword,
        string,
        character,
        number,
        identifier,
        operator,
        punctuation,
    ));

    let line_comment = just("//")
        .then(any().and_is(just('\n').not()).repeated())
        .ignored();
    let block_comment = just("/*")
        .then(any().and_is(just("*/").not()).repeated())
        .then(just("*/"))
        .ignored();
    let trivia = choice((
        line_comment,
        block_comment,
        any().filter(|c: &char| c.is_whitespace()).ignored(),
    ))
    .repeated();

    trivia
        .clone()
        .ignore_then(
            token
                .map_with(|tok, e| (tok, e.span()))
                .then_ignore(trivia)
                .repeated()
                .collect(),
        )
        .then_ignore(end())
}

/// 1-based line of every byte offset, computed from line starts.
struct LineIndex(Vec<usize>);

impl LineIndex {
    fn new(src: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self(starts)
    }

    fn line(&self, offset: usize) -> usize {
        self.0.partition_point(|&start| start <= offset)
    }
}

/// Tokenize `src`. The first lexing error aborts.
pub fn lex(src: &str) -> DslResult<Vec<Token>> {
    let lines = LineIndex::new(src);
    let (tokens, errors) = lexer().parse(src).into_output_errors();
    if let Some(error) = errors.into_iter().next() {
        // an unterminated literal fails at the end of input, report its start
        let offset = error
            .contexts()
            .map(|(_, span)| span.start)
            .next()
            .unwrap_or(error.span().start);
        return Err(DslError::Lex {
            line: lines.line(offset),
            message: error.to_string(),
        });
    }
    Ok(tokens
        .unwrap_or_default()
        .into_iter()
        .map(|((flag, text), span)| Token::new(text, flag, lines.line(span.start), span.start))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_one_based() {
        let index = LineIndex::new("a\nb\n\nc");
        assert_eq!(index.line(0), 1);
        assert_eq!(index.line(2), 2);
        assert_eq!(index.line(5), 4);
    }
}
