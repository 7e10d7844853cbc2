//! Compiler configuration, loaded from TOML.
use std::{collections::BTreeSet, path::Path};

use bhvmodel::Hypothesis;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs};

use crate::error::{DslError, DslResult};

/// What to do with code-block options nobody understood.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIs, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownOptionPolicy {
    #[default]
    Error,
    Warn,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DslConfig {
    /// Emit `#line` markers in extracted code blocks.
    pub debug_line_markers: bool,
    pub unknown_options: UnknownOptionPolicy,
    /// Keywords skipped with a warning instead of failing.
    pub ignored_keywords: BTreeSet<String>,
    /// Hypotheses used when the input declares none.
    pub default_hypotheses: Option<BTreeSet<Hypothesis>>,
    /// Interfaces instantiated before analysis starts.
    pub interfaces: Vec<String>,
}

impl DslConfig {
    pub fn from_toml_str(src: &str, file: &str) -> DslResult<Self> {
        toml::from_str(src).map_err(|e| DslError::ConfigParse {
            source: e,
            file: file.to_string(),
        })
    }

    pub fn load_from_toml(path: &Path) -> DslResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml_str, &path.display().to_string())
    }

    pub fn is_ignored(&self, keyword: &str) -> bool {
        self.ignored_keywords.contains(keyword)
    }
}
