//! Keyword registry
//!
//! Maps `@Keyword` names to handlers. A registry is filled once, then frozen
//! in a [`crate::DslContext`] and shared by every compilation.
use std::collections::BTreeMap;

use log::debug;

use crate::{
    dsl::BehaviourDsl,
    error::{DslError, DslResult},
    token::TokenReader,
};

/// Called with the reader just past the keyword; consumes everything the
/// keyword needs.
pub type KeywordHandler = fn(&mut BehaviourDsl, &mut TokenReader<'_>) -> DslResult<()>;

#[derive(Clone, Default)]
pub struct KeywordRegistry {
    handlers: BTreeMap<String, KeywordHandler>,
}

impl KeywordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`. Registering an existing name fails
    /// unless `allow_override` is set.
    pub fn register(&mut self, name: &str, handler: KeywordHandler, allow_override: bool) -> DslResult<()> {
        if !name.starts_with('@') || name.len() < 2 {
            return Err(DslError::InvalidKeywordName {
                keyword: name.to_string(),
            });
        }
        if !allow_override && self.handlers.contains_key(name) {
            return Err(DslError::KeywordAlreadyRegistered {
                keyword: name.to_string(),
            });
        }
        debug!("Registering keyword `{}`", name);
        self.handlers.insert(name.to_string(), handler);
        Ok(())
    }

    /// Make `target`'s handler reachable as `alias` too.
    pub fn alias(&mut self, alias: &str, target: &str) -> DslResult<()> {
        let handler = self.get(target).ok_or_else(|| DslError::KeywordNotRegistered {
            keyword: target.to_string(),
        })?;
        self.register(alias, handler, false)
    }

    /// Remove a keyword; later occurrences are unknown keywords.
    pub fn disable(&mut self, name: &str) -> DslResult<()> {
        self.handlers
            .remove(name)
            .map(|_| debug!("Keyword `{}` disabled", name))
            .ok_or_else(|| DslError::KeywordNotRegistered {
                keyword: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Option<KeywordHandler> {
        self.handlers.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for KeywordRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}
