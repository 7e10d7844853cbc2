//! Per-hypothesis behaviour data.
//!
//! A [`BehaviourData`] holds everything that may differ from one modelling
//! hypothesis to another: variables, code blocks, reserved names, attributes,
//! bounds and parameter defaults. The owning
//! [`BehaviourDescription`](crate::description::BehaviourDescription) keeps one
//! default instance and clones it lazily into specialisations.
use std::collections::{BTreeMap, BTreeSet};

use enum_map::EnumMap;
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    attribute::{AttributeStore, AttributeType, AttributeValue},
    bounds::{Bounds, BoundsKind, VariableBounds},
    code::{AggregatedCodeBlock, CodeBlock, Mode, Position},
    glossary,
    utils::{Error, Result, is_valid_identifier},
    variable::{VariableCategory, VariableDescription, VariableDescriptionContainer, increment_name},
};

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BehaviourData {
    variables: EnumMap<VariableCategory, VariableDescriptionContainer>,
    /// Names that can not be used by a new variable.
    reserved_names: BTreeSet<String>,
    /// Reserved names that code blocks may refer to (increments, main variables, `dt`).
    member_names: BTreeSet<String>,
    code_blocks: BTreeMap<String, AggregatedCodeBlock>,
    attributes: AttributeStore,
    bounds: BTreeMap<String, VariableBounds>,
    parameter_defaults: BTreeMap<String, Vec<f64>>,
}

impl BehaviourData {
    /// Reserve a name so that no variable can use it.
    pub fn reserve_name(&mut self, name: &str) -> Result<()> {
        if self.is_name_reserved(name) {
            return Err(Error::NameAlreadyReserved {
                name: name.to_string(),
            });
        }
        debug!("Reserving name `{}`", name);
        self.reserved_names.insert(name.to_string());
        Ok(())
    }

    /// Reserve a name that code blocks may refer to as a member of the
    /// behaviour (and that is thus rewritten like a variable).
    pub fn register_member_name(&mut self, name: &str) -> Result<()> {
        self.reserve_name(name)?;
        self.member_names.insert(name.to_string());
        Ok(())
    }

    /// Whether `name` is reserved or used by a variable.
    pub fn is_name_reserved(&self, name: &str) -> bool {
        self.reserved_names.contains(name) || self.is_variable_name(name)
    }

    pub fn reserved_names(&self) -> &BTreeSet<String> {
        &self.reserved_names
    }

    /// Declare a variable in the given category.
    ///
    /// Fails if the name is reserved or used by any variable of any category, or
    /// if the glossary or entry name is already carried by another variable.
    pub fn add_variable(&mut self, category: VariableCategory, variable: VariableDescription) -> Result<()> {
        if !is_valid_identifier(&variable.name) {
            return Err(Error::InvalidVariableName {
                name: variable.name.clone(),
            });
        }
        if variable.array_size == 0 {
            return Err(Error::InvalidArraySize {
                name: variable.name.clone(),
            });
        }
        if self.is_variable_name(&variable.name) {
            return Err(Error::VariableAlreadyDeclared {
                name: variable.name.clone(),
            });
        }
        if self.reserved_names.contains(&variable.name) {
            return Err(Error::NameAlreadyReserved {
                name: variable.name.clone(),
            });
        }
        let increment = category.has_increment().then(|| increment_name(&variable.name));
        if let Some(increment) = &increment {
            if self.is_name_reserved(increment) {
                return Err(Error::NameAlreadyReserved {
                    name: increment.clone(),
                });
            }
        }
        if variable.glossary_name.is_some() && variable.entry_name.is_some() {
            return Err(Error::ExternalNameAlreadyDefined {
                variable: variable.name.clone(),
                external_name: variable.external_name().to_string(),
            });
        }
        if let Some(glossary_name) = &variable.glossary_name {
            self.check_glossary_name(&variable.name, glossary_name)?;
        }
        if let Some(entry_name) = &variable.entry_name {
            self.check_entry_name(&variable.name, entry_name)?;
        }

        debug!("Declaring {} `{}` of type `{}`", category, variable.name, variable.type_name);
        if let Some(increment) = increment {
            self.reserved_names.insert(increment.clone());
            self.member_names.insert(increment);
        }
        self.variables[category].push(variable);
        Ok(())
    }

    /// Variables of one category, in declaration order.
    pub fn variables(&self, category: VariableCategory) -> &VariableDescriptionContainer {
        &self.variables[category]
    }

    /// Every variable with its category, category by category.
    pub fn all_variables(&self) -> impl Iterator<Item = (VariableCategory, &VariableDescription)> {
        VariableCategory::iter().flat_map(move |c| self.variables[c].iter().map(move |v| (c, v)))
    }

    pub fn is_variable_name(&self, name: &str) -> bool {
        self.category_of(name).is_some()
    }

    pub fn category_of(&self, name: &str) -> Option<VariableCategory> {
        VariableCategory::iter().find(|c| self.variables[*c].contains(name))
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDescription> {
        VariableCategory::iter().find_map(|c| self.variables[c].get(name))
    }

    fn variable_mut(&mut self, name: &str) -> Result<&mut VariableDescription> {
        let category = self.category_of(name).ok_or_else(|| Error::UnknownVariable {
            name: name.to_string(),
        })?;
        self.variables[category]
            .get_mut(name)
            .ok_or_else(|| Error::UnknownVariable {
                name: name.to_string(),
            })
    }

    /// Whether code blocks may refer to `name`: a variable, the increment of a
    /// variable or a registered member.
    pub fn is_member_name(&self, name: &str) -> bool {
        self.is_variable_name(name) || self.member_names.contains(name)
    }

    fn check_glossary_name(&self, variable: &str, glossary_name: &str) -> Result<()> {
        if !glossary::contains(glossary_name) {
            return Err(Error::UnknownGlossaryName {
                name: glossary_name.to_string(),
            });
        }
        if let Some((_, owner)) = self
            .all_variables()
            .find(|(_, v)| v.glossary_name.as_deref() == Some(glossary_name))
        {
            return Err(Error::GlossaryNameAlreadyUsed {
                glossary_name: glossary_name.to_string(),
                variable: variable.to_string(),
                owner: owner.name.clone(),
            });
        }
        Ok(())
    }

    fn check_entry_name(&self, variable: &str, entry_name: &str) -> Result<()> {
        if glossary::contains(entry_name) {
            return Err(Error::EntryNameIsGlossaryName {
                name: entry_name.to_string(),
            });
        }
        if !is_valid_identifier(entry_name) {
            return Err(Error::InvalidVariableName {
                name: entry_name.to_string(),
            });
        }
        if let Some((_, owner)) = self
            .all_variables()
            .find(|(_, v)| v.entry_name.as_deref() == Some(entry_name))
        {
            return Err(Error::EntryNameAlreadyUsed {
                entry_name: entry_name.to_string(),
                variable: variable.to_string(),
                owner: owner.name.clone(),
            });
        }
        Ok(())
    }

    pub fn set_glossary_name(&mut self, variable: &str, glossary_name: &str) -> Result<()> {
        self.check_external_name_unset(variable)?;
        self.check_glossary_name(variable, glossary_name)?;
        self.variable_mut(variable)?.glossary_name = Some(glossary_name.to_string());
        Ok(())
    }

    pub fn set_entry_name(&mut self, variable: &str, entry_name: &str) -> Result<()> {
        self.check_external_name_unset(variable)?;
        self.check_entry_name(variable, entry_name)?;
        self.variable_mut(variable)?.entry_name = Some(entry_name.to_string());
        Ok(())
    }

    fn check_external_name_unset(&self, variable: &str) -> Result<()> {
        let v = self.variable(variable).ok_or_else(|| Error::UnknownVariable {
            name: variable.to_string(),
        })?;
        if v.has_external_name() {
            return Err(Error::ExternalNameAlreadyDefined {
                variable: variable.to_string(),
                external_name: v.external_name().to_string(),
            });
        }
        Ok(())
    }

    /// External name of a variable (glossary name, entry name or the name itself).
    pub fn external_name(&self, variable: &str) -> Result<&str> {
        self.variable(variable)
            .map(VariableDescription::external_name)
            .ok_or_else(|| Error::UnknownVariable {
                name: variable.to_string(),
            })
    }

    /// Merge a code block under `name`, see [`AggregatedCodeBlock::insert`].
    pub fn set_code(&mut self, name: &str, block: CodeBlock, mode: Mode, position: Position) -> Result<()> {
        self.code_blocks
            .entry(name.to_string())
            .or_default()
            .insert(name, block, mode, position)
    }

    pub fn has_code(&self, name: &str) -> bool {
        self.code_blocks.contains_key(name)
    }

    pub fn code_block(&self, name: &str) -> Option<&AggregatedCodeBlock> {
        self.code_blocks.get(name)
    }

    /// Full code of the named block.
    pub fn code(&self, name: &str) -> Result<String> {
        self.code_blocks
            .get(name)
            .map(AggregatedCodeBlock::code)
            .ok_or_else(|| Error::UnknownCodeBlock {
                name: name.to_string(),
            })
    }

    pub fn code_block_names(&self) -> impl Iterator<Item = &str> {
        self.code_blocks.keys().map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: AttributeValue, allow_idempotent: bool) -> Result<()> {
        self.attributes.set(name, value, allow_idempotent)
    }

    pub fn attribute<T: AttributeType>(&self, name: &str) -> Result<T> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Set the bounds of the given kind of a declared variable.
    pub fn set_bounds(&mut self, variable: &str, kind: BoundsKind, bounds: Bounds) -> Result<()> {
        if !self.is_variable_name(variable) {
            return Err(Error::UnknownVariable {
                name: variable.to_string(),
            });
        }
        let slot = self.bounds.entry(variable.to_string()).or_default().slot(kind);
        if slot.is_some() {
            return Err(Error::BoundsAlreadyDeclared {
                variable: variable.to_string(),
                kind,
            });
        }
        *slot = Some(bounds);
        Ok(())
    }

    pub fn bounds(&self, variable: &str) -> Option<&VariableBounds> {
        self.bounds.get(variable)
    }

    pub fn all_bounds(&self) -> impl Iterator<Item = (&str, &VariableBounds)> {
        self.bounds.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Set the default values of a parameter, one per array element.
    pub fn set_parameter_default(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        let parameter = self
            .variables[VariableCategory::Parameter]
            .get(name)
            .ok_or_else(|| match self.category_of(name) {
                Some(_) => Error::UnexpectedVariableCategory {
                    name: name.to_string(),
                    expected: VariableCategory::Parameter.to_string(),
                },
                None => Error::UnknownVariable {
                    name: name.to_string(),
                },
            })?;
        if values.len() != parameter.array_size as usize {
            return Err(Error::ParameterDefaultArity {
                name: name.to_string(),
                expected: parameter.array_size as usize,
                found: values.len(),
            });
        }
        if self.parameter_defaults.contains_key(name) {
            return Err(Error::ParameterDefaultAlreadyDeclared {
                name: name.to_string(),
            });
        }
        self.parameter_defaults.insert(name.to_string(), values);
        Ok(())
    }

    pub fn parameter_default(&self, name: &str) -> Option<&[f64]> {
        self.parameter_defaults.get(name).map(Vec::as_slice)
    }

    /// Checks that every parameter has a default value.
    pub fn check_parameter_defaults(&self) -> Result<()> {
        for parameter in &self.variables[VariableCategory::Parameter] {
            if !self.parameter_defaults.contains_key(&parameter.name) {
                return Err(Error::MissingParameterDefault {
                    name: parameter.name.clone(),
                });
            }
        }
        Ok(())
    }
}
