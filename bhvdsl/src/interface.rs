//! Interface plug-ins
//!
//! An interface adapts a behaviour to one target solver. During analysis it
//! may claim keywords of its own and restrict the modelling hypotheses the
//! behaviour is compiled for.
use std::collections::{BTreeMap, BTreeSet};

use bhvmodel::{BehaviourDescription, Hypothesis, attribute::AttributeValue};
use log::debug;

use crate::{
    error::{DslError, DslResult},
    token::{Cursor, TokenReader},
};

pub trait BehaviourInterface: Send {
    fn name(&self) -> &str;

    /// Treat `keyword` if this interface knows it. The reader is positioned
    /// just past the keyword; on success the position after everything the
    /// keyword consumed is returned.
    fn treat_keyword(
        &mut self,
        description: &mut BehaviourDescription,
        keyword: &str,
        reader: TokenReader<'_>,
    ) -> DslResult<Option<Cursor>>;

    /// Hypotheses this interface can handle, `None` for all of them.
    fn supported_hypotheses(&self, _description: &BehaviourDescription) -> Option<BTreeSet<Hypothesis>> {
        None
    }

    /// Names used by the generated code that variables must not take.
    fn reserved_names(&self) -> Vec<String> {
        Vec::new()
    }
}

pub type InterfaceConstructor = fn() -> Box<dyn BehaviourInterface>;

/// Builds interfaces by name.
#[derive(Clone, Default)]
pub struct InterfaceFactory {
    constructors: BTreeMap<String, InterfaceConstructor>,
}

impl InterfaceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory knowing the interfaces shipped with this crate.
    pub fn standard() -> Self {
        let mut factory = Self::new();
        factory.register(GenericInterface::NAME, || {
            Box::new(GenericInterface) as Box<dyn BehaviourInterface>
        });
        factory
    }

    pub fn register(&mut self, name: &str, constructor: InterfaceConstructor) {
        debug!("Registering interface `{}`", name);
        self.constructors.insert(name.to_string(), constructor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn create(&self, name: &str) -> DslResult<Box<dyn BehaviourInterface>> {
        self.constructors
            .get(name)
            .map(|constructor| constructor())
            .ok_or_else(|| DslError::UnknownInterface {
                name: name.to_string(),
            })
    }
}

impl std::fmt::Debug for InterfaceFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

/// Interface for solvers calling behaviours through a generic entry point.
#[derive(Debug, Default)]
pub struct GenericInterface;

impl GenericInterface {
    pub const NAME: &'static str = "generic";
    const GENERATE_MTEST_FILE: &'static str = "@GenerateMTestFileOnFailure";
}

impl BehaviourInterface for GenericInterface {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn treat_keyword(
        &mut self,
        description: &mut BehaviourDescription,
        keyword: &str,
        mut reader: TokenReader<'_>,
    ) -> DslResult<Option<Cursor>> {
        if keyword != Self::GENERATE_MTEST_FILE {
            return Ok(None);
        }
        let value = reader.read_bool()?;
        reader.expect(";")?;
        description.set_behaviour_attribute(
            "generic::generate_mtest_file_on_failure",
            AttributeValue::Bool(value),
            false,
        )?;
        Ok(Some(reader.cursor()))
    }

    fn reserved_names(&self) -> Vec<String> {
        ["mgis_bv", "BehaviourIntegrationOptions"]
            .map(String::from)
            .to_vec()
    }
}
