//! Typed attributes
//!
//! Attributes are named values attached to a behaviour (tolerances, flags,
//! strain measure, ...). The set of value kinds is closed: once an attribute is
//! declared with a kind, it keeps that kind.
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumDiscriminants, EnumIs};

use crate::utils::{Error, Result};

#[derive(Debug, Clone, PartialEq, EnumDiscriminants, EnumIs)]
#[strum_discriminants(name(AttributeKind), derive(Display, Hash))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        self.into()
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Number(n) => write!(f, "{n}"),
            AttributeValue::String(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Rust types that an attribute value can be read back as.
pub trait AttributeType: Sized {
    const KIND: AttributeKind;

    fn from_value(value: &AttributeValue) -> Option<Self>;
}

impl AttributeType for bool {
    const KIND: AttributeKind = AttributeKind::Bool;

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl AttributeType for f64 {
    const KIND: AttributeKind = AttributeKind::Number;

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl AttributeType for String {
    const KIND: AttributeKind = AttributeKind::String;

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AttributeStore {
    values: BTreeMap<String, AttributeValue>,
}

impl AttributeStore {
    /// Declare an attribute.
    ///
    /// Redeclaring an attribute with another kind always fails. Redeclaring it
    /// with the same kind fails too, unless `allow_idempotent` is set, in which
    /// case the first value is kept.
    pub fn set(&mut self, name: &str, value: AttributeValue, allow_idempotent: bool) -> Result<()> {
        if let Some(previous) = self.values.get(name) {
            if previous.kind() != value.kind() {
                return Err(Error::AttributeKindMismatch {
                    name: name.to_string(),
                    expected: previous.kind(),
                    found: value.kind(),
                });
            }
            if allow_idempotent {
                return Ok(());
            }
            return Err(Error::AttributeAlreadyDeclared {
                name: name.to_string(),
            });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    /// Read an attribute back as `T`.
    pub fn get<T: AttributeType>(&self, name: &str) -> Result<T> {
        let value = self.values.get(name).ok_or_else(|| Error::UnknownAttribute {
            name: name.to_string(),
        })?;
        T::from_value(value).ok_or_else(|| Error::AttributeKindMismatch {
            name: name.to_string(),
            expected: T::KIND,
            found: value.kind(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
