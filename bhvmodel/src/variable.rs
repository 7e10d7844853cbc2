//! Variables of a behaviour
//!
//! Each variable belongs to exactly one [`VariableCategory`] inside one
//! [`BehaviourData`](crate::data::BehaviourData). Declaration order is kept: the
//! generated code lays variables out in the order they were written.
use std::ops::Deref;

use enum_map::Enum;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Enum)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VariableCategory {
    #[strum(to_string = "material property")]
    MaterialProperty,
    #[strum(to_string = "state variable")]
    StateVariable,
    #[strum(to_string = "auxiliary state variable")]
    AuxiliaryStateVariable,
    #[strum(to_string = "external state variable")]
    ExternalStateVariable,
    #[strum(to_string = "local variable")]
    LocalVariable,
    #[strum(to_string = "integration variable")]
    IntegrationVariable,
    #[strum(to_string = "parameter")]
    Parameter,
}

impl VariableCategory {
    /// Whether variables of this category come with an increment (`d` + name)
    /// that is visible in code blocks.
    pub fn has_increment(self) -> bool {
        matches!(
            self,
            VariableCategory::StateVariable
                | VariableCategory::IntegrationVariable
                | VariableCategory::ExternalStateVariable
        )
    }
}

/// Name of the increment of a variable.
pub fn increment_name(name: &str) -> String {
    format!("d{name}")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VariableDescription {
    /// Type as written by the user (`real`, `StrainStensor`, ...).
    pub type_name: String,
    pub name: String,
    /// Number of elements, `1` for scalars.
    pub array_size: u16,
    /// Line of declaration in the input file.
    pub line: usize,
    /// Glossary name. Exclusive with [`VariableDescription::entry_name`].
    pub glossary_name: Option<String>,
    /// Free-form external name. Exclusive with [`VariableDescription::glossary_name`].
    pub entry_name: Option<String>,
}

impl VariableDescription {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>, array_size: u16, line: usize) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            array_size,
            line,
            glossary_name: None,
            entry_name: None,
        }
    }

    /// Builder variant setting the glossary name. Checks happen at registration.
    pub fn with_glossary_name(mut self, glossary_name: impl Into<String>) -> Self {
        self.glossary_name = Some(glossary_name.into());
        self
    }

    /// Builder variant setting the entry name. Checks happen at registration.
    pub fn with_entry_name(mut self, entry_name: impl Into<String>) -> Self {
        self.entry_name = Some(entry_name.into());
        self
    }

    pub fn is_array(&self) -> bool {
        self.array_size > 1
    }

    /// Name seen by the outside world: the glossary name, else the entry name,
    /// else the variable name itself.
    pub fn external_name(&self) -> &str {
        self.glossary_name
            .as_deref()
            .or(self.entry_name.as_deref())
            .unwrap_or(&self.name)
    }

    /// Whether the variable carries a glossary or an entry name.
    pub fn has_external_name(&self) -> bool {
        self.glossary_name.is_some() || self.entry_name.is_some()
    }
}

/// Ordered list of variables of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VariableDescriptionContainer(Vec<VariableDescription>);

impl VariableDescriptionContainer {
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|v| v.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&VariableDescription> {
        self.0.iter().find(|v| v.name == name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut VariableDescription> {
        self.0.iter_mut().find(|v| v.name == name)
    }

    pub(crate) fn push(&mut self, variable: VariableDescription) {
        self.0.push(variable);
    }

    /// Variable names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|v| v.name.as_str())
    }
}

impl Deref for VariableDescriptionContainer {
    type Target = [VariableDescription];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a VariableDescriptionContainer {
    type Item = &'a VariableDescription;
    type IntoIter = std::slice::Iter<'a, VariableDescription>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
