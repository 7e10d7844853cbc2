//! Options of code-block keywords.
//!
//! `@Integrator<Append, PlaneStress> { ... }` or, equivalently,
//! `@Integrator{mode: Append, hypothesis: PlaneStress} { ... }`. Entries are
//! bare flags or `key: value` pairs; anything unrecognised is kept aside for
//! the caller to validate.
use std::{collections::BTreeSet, str::FromStr};

use bhvmodel::{
    Hypothesis,
    code::{Mode, Position},
};

use crate::{
    error::{DslError, DslResult},
    token::{Token, TokenReader},
};

/// Hypotheses a code block is declared for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HypothesisSelection {
    /// The hypothesis being treated, [`Hypothesis::Undefined`] at top level.
    #[default]
    Current,
    /// Every supported hypothesis (`".+"`).
    All,
    Listed(BTreeSet<Hypothesis>),
}

impl HypothesisSelection {
    fn add(&mut self, hypothesis: Hypothesis) {
        match self {
            HypothesisSelection::Listed(set) => {
                set.insert(hypothesis);
            }
            HypothesisSelection::All => {}
            HypothesisSelection::Current => *self = HypothesisSelection::Listed(BTreeSet::from([hypothesis])),
        }
    }
}

/// An option no generic rule understood, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntreatedOption {
    pub name: String,
    pub value: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlockOptions {
    pub position: Position,
    pub mode: Mode,
    pub hypotheses: HypothesisSelection,
    /// Suppress warnings about the block.
    pub safe: bool,
    pub untreated: Vec<UntreatedOption>,
}

/// Delimiters of the option group starting at the reader, if any.
fn option_delimiters(reader: &TokenReader<'_>) -> Option<(&'static str, &'static str)> {
    if reader.check("<") {
        return Some(("<", ">"));
    }
    if !reader.check("{") {
        return None;
    }
    // `{...}` only holds options when another `{` follows the matching `}`
    let mut lookahead = *reader;
    let mut depth = 0usize;
    while let Ok(token) = lookahead.next() {
        if token.is("{") {
            depth += 1;
        } else if token.is("}") {
            depth -= 1;
            if depth == 0 {
                return lookahead.check("{").then_some(("{", "}"));
            }
        }
    }
    None
}

fn parse_value<T: FromStr>(what: &'static str, token: &Token) -> DslResult<T> {
    token.unquoted().parse().map_err(|_| DslError::InvalidValue {
        what,
        value: token.text.clone(),
        line: token.line,
    })
}

/// Read the optional option group of a code-block keyword.
pub fn read_code_block_options(reader: &mut TokenReader<'_>) -> DslResult<CodeBlockOptions> {
    let mut options = CodeBlockOptions::default();
    let Some((open, close)) = option_delimiters(reader) else {
        return Ok(options);
    };
    reader.expect(open)?;
    if reader.consume(close) {
        return Ok(options);
    }
    loop {
        let name = reader.next()?;
        if reader.consume(":") {
            read_keyed_option(reader, &mut options, name)?;
        } else {
            read_flag(&mut options, name);
        }
        let separator = reader.next()?;
        if separator.is(close) {
            return Ok(options);
        }
        if !separator.is(",") {
            return Err(DslError::unexpected(format!("`,` or `{close}`"), separator));
        }
    }
}

fn read_flag(options: &mut CodeBlockOptions, token: &Token) {
    let text = token.unquoted();
    if token.is_string_literal() && text == ".+" {
        options.hypotheses = HypothesisSelection::All;
    } else if text == "safe" {
        options.safe = true;
    } else if let Ok(mode) = Mode::from_str(text) {
        options.mode = mode;
    } else if let Ok(position) = Position::from_str(text) {
        options.position = position;
    } else if let Ok(hypothesis) = Hypothesis::parse(text) {
        options.hypotheses.add(hypothesis);
    } else {
        options.untreated.push(UntreatedOption {
            name: text.to_string(),
            value: None,
            line: token.line,
        });
    }
}

fn read_keyed_option(reader: &mut TokenReader<'_>, options: &mut CodeBlockOptions, key: &Token) -> DslResult<()> {
    match key.unquoted() {
        "mode" => options.mode = parse_value("mode", reader.next()?)?,
        "position" => options.position = parse_value("position", reader.next()?)?,
        "safe" => options.safe = reader.read_bool()?,
        "hypothesis" | "hypotheses" => {
            let values = if reader.check("{") {
                reader.read_list("{", "}")?
            } else {
                vec![reader.next()?]
            };
            for value in values {
                if value.is_string_literal() && value.unquoted() == ".+" {
                    options.hypotheses = HypothesisSelection::All;
                } else {
                    let hypothesis = Hypothesis::parse(value.unquoted()).map_err(|_| DslError::InvalidValue {
                        what: "modelling hypothesis",
                        value: value.text.clone(),
                        line: value.line,
                    })?;
                    options.hypotheses.add(hypothesis);
                }
            }
        }
        name => {
            let value = reader.next()?;
            options.untreated.push(UntreatedOption {
                name: name.to_string(),
                value: Some(value.text.clone()),
                line: key.line,
            });
        }
    }
    Ok(())
}
