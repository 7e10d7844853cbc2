//! Code blocks
//!
//! A code block is an opaque piece of integration code attached to a behaviour
//! under a name (`Integrator`, `InitLocalVariables`, ...). Successive
//! declarations of the same block are merged according to a [`Mode`] and a
//! [`Position`], see [`AggregatedCodeBlock::insert`].
use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs, EnumString};

use crate::utils::{Error, Result};

/// Code extracted from one keyword invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CodeBlock {
    pub code: String,
    /// Variables read by the block.
    pub used_variables: BTreeSet<String>,
    /// Variables assigned by the block.
    pub modified_variables: BTreeSet<String>,
}

impl CodeBlock {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }
}

/// How a new block is combined with an existing block of the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Fails if the block already exists.
    Create,
    /// Appends to the existing body.
    #[default]
    #[strum(serialize = "CreateOrAppend", serialize = "Append")]
    CreateOrAppend,
    /// Replaces the existing body.
    #[strum(serialize = "CreateOrReplace", serialize = "Replace")]
    CreateOrReplace,
    /// Keeps the existing body untouched.
    CreateButDontReplace,
}

/// Where a new block lands relative to an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Position {
    AtBeginning,
    #[default]
    Body,
    AtEnd,
}

/// The merged state of every declaration of one code block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AggregatedCodeBlock {
    beginning: String,
    body: Option<String>,
    end: String,
    used_variables: BTreeSet<String>,
    modified_variables: BTreeSet<String>,
}

impl AggregatedCodeBlock {
    /// Merge `block` into this aggregate.
    ///
    /// Beginning and end parts always accumulate; the mode only governs the
    /// body. Usage metadata is the union of every merged block, even the
    /// replaced ones.
    pub fn insert(&mut self, name: &str, block: CodeBlock, mode: Mode, position: Position) -> Result<()> {
        match position {
            Position::AtBeginning => self.beginning.push_str(&block.code),
            Position::AtEnd => self.end.push_str(&block.code),
            Position::Body => {
                if mode.is_create() && !self.is_empty() {
                    return Err(Error::CodeBlockAlreadyDeclared {
                        name: name.to_string(),
                    });
                }
                match (mode, self.body.as_mut()) {
                    (_, None) => self.body = Some(block.code),
                    (Mode::CreateOrAppend, Some(body)) => body.push_str(&block.code),
                    (Mode::CreateButDontReplace, Some(_)) => return Ok(()),
                    (_, Some(body)) => *body = block.code,
                }
            }
        }
        self.used_variables.extend(block.used_variables);
        self.modified_variables.extend(block.modified_variables);
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.beginning.is_empty() && self.body.is_none() && self.end.is_empty()
    }

    /// Full code: beginning, body, then end.
    pub fn code(&self) -> String {
        let mut code = self.beginning.clone();
        if let Some(body) = &self.body {
            code.push_str(body);
        }
        code.push_str(&self.end);
        code
    }

    pub fn used_variables(&self) -> &BTreeSet<String> {
        &self.used_variables
    }

    pub fn modified_variables(&self) -> &BTreeSet<String> {
        &self.modified_variables
    }

    /// Flatten the aggregate into a single block.
    pub fn to_code_block(&self) -> CodeBlock {
        CodeBlock {
            code: self.code(),
            used_variables: self.used_variables.clone(),
            modified_variables: self.modified_variables.clone(),
        }
    }
}
