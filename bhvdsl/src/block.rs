//! Code-block extraction
//!
//! Copies the tokens of a `{ ... }` block back into source text, rewriting the
//! identifiers that name members of the behaviour on the way.
use bhvmodel::{Hypothesis, code::CodeBlock, data::BehaviourData};
use strum::EnumIs;

use crate::{
    error::{DslError, DslResult},
    token::{Token, TokenReader},
};

/// How a member name is used by a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum Usage {
    Read,
    /// Left-hand side of `=`, `+=`, `-=`, `*=` or `/=`.
    Assigned,
}

/// Rewrites a member name: `(hypothesis, name, qualify) -> text`.
pub type Modifier<'a> = &'a dyn Fn(Hypothesis, &str, bool) -> String;

/// Records how a member name is used, without touching the output.
pub type Analyser<'a> = &'a dyn Fn(&mut CodeBlock, Hypothesis, &str, Usage);

const ASSIGNMENTS: [&str; 5] = ["=", "+=", "-=", "*=", "/="];

/// Tokens never preceded by a space.
const NO_SPACE_BEFORE: [&str; 10] = [";", ",", ")", "]", ".", "->", "::", "(", "[", "++"];
/// Tokens never followed by a space.
const NO_SPACE_AFTER: [&str; 6] = ["(", "[", ".", "->", "::", "!"];

/// The standard modifier: qualified members are accessed through `this`.
pub fn standard_modifier(_: Hypothesis, name: &str, qualify: bool) -> String {
    if qualify {
        format!("this->{name}")
    } else {
        name.to_string()
    }
}

/// The standard analyser: assignments modify, everything else reads.
pub fn standard_analyser(block: &mut CodeBlock, _: Hypothesis, name: &str, usage: Usage) {
    match usage {
        Usage::Read => block.used_variables.insert(name.to_string()),
        Usage::Assigned => block.modified_variables.insert(name.to_string()),
    };
}

pub struct CodeBlockExtractor<'a> {
    data: &'a BehaviourData,
    hypothesis: Hypothesis,
    modifier: Option<Modifier<'a>>,
    analyser: Option<Analyser<'a>>,
    qualify: bool,
    /// File named in `#line` markers, when enabled.
    line_markers: Option<&'a str>,
}

impl<'a> CodeBlockExtractor<'a> {
    /// An extractor copying the block verbatim.
    pub fn new(data: &'a BehaviourData, hypothesis: Hypothesis) -> Self {
        Self {
            data,
            hypothesis,
            modifier: None,
            analyser: None,
            qualify: false,
            line_markers: None,
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier<'a>, qualify: bool) -> Self {
        self.modifier = Some(modifier);
        self.qualify = qualify;
        self
    }

    pub fn with_analyser(mut self, analyser: Analyser<'a>) -> Self {
        self.analyser = Some(analyser);
        self
    }

    pub fn with_line_markers(mut self, file: &'a str) -> Self {
        self.line_markers = Some(file);
        self
    }

    /// Read the block starting at `{`. The reader ends past the closing `}`.
    pub fn extract(&self, reader: &mut TokenReader<'_>) -> DslResult<CodeBlock> {
        reader.expect("{")?;
        let mut block = CodeBlock::default();
        let mut code = String::new();
        let mut braces = 1usize;
        let mut parentheses = 0usize;
        let mut current_line = None;
        let mut previous: Option<&Token> = None;
        loop {
            let token = reader.next()?;
            if token.is("{") {
                braces += 1;
            } else if token.is("}") {
                braces -= 1;
                if braces == 0 {
                    break;
                }
            } else if token.is("(") {
                parentheses += 1;
            } else if token.is(")") {
                parentheses = parentheses
                    .checked_sub(1)
                    .ok_or(DslError::UnbalancedParenthesis { line: token.line })?;
            }

            let new_line = current_line != Some(token.line);
            if new_line {
                if current_line.is_some() {
                    code.push('\n');
                }
                if let Some(file) = self.line_markers {
                    code.push_str(&format!("#line {} \"{}\"\n", token.line, file));
                }
                current_line = Some(token.line);
            } else if needs_space(previous, token) {
                code.push(' ');
            }

            match self.member_access(previous, token) {
                Some(name) => {
                    if let Some(analyser) = self.analyser {
                        let usage = match reader.peek() {
                            Some(next) if ASSIGNMENTS.iter().any(|op| next.is(op)) => Usage::Assigned,
                            _ => Usage::Read,
                        };
                        analyser(&mut block, self.hypothesis, name, usage);
                    }
                    match self.modifier {
                        Some(modifier) => code.push_str(&modifier(self.hypothesis, name, self.qualify)),
                        None => code.push_str(name),
                    }
                }
                None => code.push_str(&token.text),
            }
            previous = Some(token);
        }
        if parentheses != 0 {
            return Err(DslError::UnbalancedParenthesis { line: reader.line() });
        }
        if !code.is_empty() && !code.ends_with('\n') {
            code.push('\n');
        }
        block.code = code;
        Ok(block)
    }

    /// The member named by `token`, unless it is accessed through another object.
    fn member_access<'t>(&self, previous: Option<&Token>, token: &'t Token) -> Option<&'t str> {
        if !token.is_identifier() || !self.data.is_member_name(&token.text) {
            return None;
        }
        let qualified = previous.is_some_and(|p| p.is(".") || p.is("->") || p.is("::"));
        (!qualified).then_some(token.text.as_str())
    }
}

fn needs_space(previous: Option<&Token>, token: &Token) -> bool {
    let Some(previous) = previous else {
        return false;
    };
    !(NO_SPACE_BEFORE.iter().any(|t| token.is(t)) || NO_SPACE_AFTER.iter().any(|t| previous.is(t)))
}
