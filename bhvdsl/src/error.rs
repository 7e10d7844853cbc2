use bhvmodel::ErrorKind;
use strum::EnumIs;
use thiserror::Error;

use crate::token::Token;

#[derive(Debug, EnumIs, Error)]
pub enum DslError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParse {
        source: toml::de::Error,
        file: String,
    },

    #[error("Line {line}: {message}")]
    Lex { line: usize, message: String },

    #[error("Line {line}: unexpected end of file")]
    UnexpectedEndOfFile { line: usize },

    #[error("Line {line}: expected {expected}, found `{found}`")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("Line {line}: unbalanced parenthesis")]
    UnbalancedParenthesis { line: usize },

    #[error("Line {line}: invalid number `{text}`")]
    InvalidNumber { text: String, line: usize },

    #[error("Line {line}: invalid {what} `{value}`")]
    InvalidValue {
        what: &'static str,
        value: String,
        line: usize,
    },

    #[error(transparent)]
    Model(#[from] bhvmodel::Error),

    #[error("Keyword names must start with `@`, got `{keyword}`")]
    InvalidKeywordName { keyword: String },

    #[error("The keyword `{keyword}` is already registered")]
    KeywordAlreadyRegistered { keyword: String },

    #[error("The keyword `{keyword}` is not registered")]
    KeywordNotRegistered { keyword: String },

    #[error("Unknown keyword `{keyword}`")]
    UnknownKeyword { keyword: String },

    #[error("The keyword `{keyword}` is claimed by several interfaces ({interfaces}) which disagree on its extent")]
    AmbiguousKeyword { keyword: String, interfaces: String },

    #[error("The keyword `{keyword}` is not treated by interface `{interface}`")]
    KeywordNotTreatedByInterface { keyword: String, interface: String },

    #[error("Unknown interface `{name}`")]
    UnknownInterface { name: String },

    #[error("Unsupported option `{option}` for `{keyword}`")]
    UnsupportedOption { option: String, keyword: String },

    #[error("The gradient `{name}` has no associated thermodynamic force")]
    PendingGradient { name: String },

    #[error("The thermodynamic force `{name}` is not preceded by a gradient")]
    MissingGradient { name: String },

    #[error("Error while treating `{keyword}` (line {line}): {source}")]
    InKeyword {
        keyword: String,
        line: usize,
        source: Box<DslError>,
    },
}

impl DslError {
    pub(crate) fn unexpected(expected: impl Into<String>, found: &Token) -> Self {
        DslError::UnexpectedToken {
            expected: expected.into(),
            found: found.text.clone(),
            line: found.line,
        }
    }

    /// Attach the keyword being treated, unless already done.
    pub fn in_keyword(self, keyword: &str, line: usize) -> Self {
        match self {
            DslError::InKeyword { .. } => self,
            source => DslError::InKeyword {
                keyword: keyword.to_string(),
                line,
                source: Box::new(source),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        use DslError::*;
        match self {
            Io(_) | ConfigParse { .. } | Lex { .. } | UnexpectedEndOfFile { .. } | UnexpectedToken { .. }
            | UnbalancedParenthesis { .. } | InvalidNumber { .. } | InvalidValue { .. } => ErrorKind::Syntax,
            Model(error) => error.kind(),
            KeywordAlreadyRegistered { .. } => ErrorKind::DuplicateDeclaration,
            UnknownKeyword { .. } => ErrorKind::UnknownKeyword,
            InKeyword { source, .. } => source.kind(),
            InvalidKeywordName { .. }
            | KeywordNotRegistered { .. }
            | AmbiguousKeyword { .. }
            | KeywordNotTreatedByInterface { .. }
            | UnknownInterface { .. }
            | UnsupportedOption { .. }
            | PendingGradient { .. }
            | MissingGradient { .. } => ErrorKind::Consistency,
        }
    }

    /// Source line of the error, when known.
    pub fn line(&self) -> Option<usize> {
        use DslError::*;
        match self {
            Lex { line, .. }
            | UnexpectedEndOfFile { line }
            | UnexpectedToken { line, .. }
            | UnbalancedParenthesis { line }
            | InvalidNumber { line, .. }
            | InvalidValue { line, .. }
            | InKeyword { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// The error without keyword context.
    pub fn root(&self) -> &DslError {
        match self {
            DslError::InKeyword { source, .. } => source.root(),
            _ => self,
        }
    }
}

pub type DslResult<T> = Result<T, DslError>;
