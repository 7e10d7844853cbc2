//! Behaviour description
//!
//! A [`BehaviourDescription`] owns one default [`BehaviourData`], shared by every
//! modelling hypothesis, plus specialisations created on demand by deep-copying
//! the default. Every mutation goes through the description so that the
//! following rules hold at all times:
//!
//! - a mutation for [`Hypothesis::Undefined`] is applied to the default data and
//!   then replayed on every existing specialisation;
//! - a mutation for a given hypothesis materialises its specialisation first,
//!   then touches that specialisation only;
//! - the set of supported hypotheses is written once, and must contain every
//!   hypothesis specialised or looked up before it was written.
//!
//! Reads for a hypothesis without specialisation fall back to the default data.
use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
};

use log::{debug, info};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::{Display, EnumIs, EnumString};

use crate::{
    attribute::{AttributeStore, AttributeType, AttributeValue},
    bounds::{Bounds, BoundsKind},
    code::{CodeBlock, Mode, Position},
    data::BehaviourData,
    glossary,
    hypothesis::Hypothesis,
    material_property::MaterialProperty,
    utils::{Error, Result},
    variable::{VariableCategory, VariableDescription, VariableDescriptionContainer, increment_name},
};

/// Kind of behaviour, fixed by its main variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BehaviourType {
    #[default]
    General,
    SmallStrain,
    FiniteStrain,
    CohesiveZone,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Symmetry {
    #[default]
    #[strum(to_string = "isotropic", serialize = "Isotropic")]
    Isotropic,
    #[strum(to_string = "orthotropic", serialize = "Orthotropic")]
    Orthotropic,
}

impl Symmetry {
    /// Number of thermal expansion coefficients a behaviour of this symmetry takes.
    pub fn thermal_expansion_arity(self) -> usize {
        match self {
            Symmetry::Isotropic => 1,
            Symmetry::Orthotropic => 3,
        }
    }
}

/// A driving variable and its conjugated thermodynamic force.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MainVariable {
    pub driving: VariableDescription,
    pub force: VariableDescription,
}

impl MainVariable {
    pub fn new(driving: VariableDescription, force: VariableDescription) -> Self {
        Self { driving, force }
    }

    /// Strain and stress of small strain behaviours.
    pub fn small_strain() -> Self {
        Self::new(
            VariableDescription::new("StrainStensor", "eto", 1, 0).with_glossary_name("Strain"),
            VariableDescription::new("StressStensor", "sig", 1, 0).with_glossary_name("Stress"),
        )
    }

    /// Deformation gradient and stress of finite strain behaviours.
    pub fn finite_strain() -> Self {
        Self::new(
            VariableDescription::new("DeformationGradientTensor", "F", 1, 0)
                .with_glossary_name("DeformationGradient"),
            VariableDescription::new("StressStensor", "sig", 1, 0).with_glossary_name("Stress"),
        )
    }

    /// Opening displacement and cohesive force of cohesive zone models.
    pub fn cohesive_zone() -> Self {
        Self::new(
            VariableDescription::new("DisplacementTVector", "u", 1, 0)
                .with_glossary_name("OpeningDisplacement"),
            VariableDescription::new("ForceTVector", "t", 1, 0).with_glossary_name("CohesiveForce"),
        )
    }

    /// Names code blocks may refer to: the driving variable, its increment and
    /// the force.
    pub fn member_names(&self) -> [String; 3] {
        [
            self.driving.name.clone(),
            increment_name(&self.driving.name),
            self.force.name.clone(),
        ]
    }
}

/// Descriptive metadata, each settable once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BehaviourMetadata {
    pub dsl: Option<String>,
    pub behaviour: Option<String>,
    pub material: Option<String>,
    pub library: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

fn set_once(slot: &mut Option<String>, what: &'static str, value: &str) -> Result<()> {
    if slot.is_some() {
        return Err(Error::AlreadyDeclared { what });
    }
    *slot = Some(value.to_string());
    Ok(())
}

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BehaviourDescription {
    /// Data shared by every hypothesis that is not specialised.
    d: BehaviourData,
    specializations: BTreeMap<Hypothesis, BehaviourData>,
    hypotheses: BTreeSet<Hypothesis>,
    /// Restricts a later narrowing declaration of `hypotheses`.
    candidate_hypotheses: Option<BTreeSet<Hypothesis>>,
    /// Hypotheses looked up before `hypotheses` was declared.
    requested_hypotheses: RefCell<BTreeSet<Hypothesis>>,
    behaviour_type: BehaviourType,
    main_variables: Vec<MainVariable>,
    symmetry: Option<Symmetry>,
    elastic_symmetry: Option<Symmetry>,
    thermal_expansion: Option<SmallVec<MaterialProperty, 3>>,
    attributes: AttributeStore,
    metadata: BehaviourMetadata,
}

impl BehaviourDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the supported modelling hypotheses.
    ///
    /// With `narrowing`, the set is first intersected with the candidates given
    /// to [`BehaviourDescription::restrict_hypotheses`], if any.
    pub fn set_hypotheses(&mut self, hypotheses: BTreeSet<Hypothesis>, narrowing: bool) -> Result<()> {
        if hypotheses.is_empty() {
            return Err(Error::EmptyHypotheses);
        }
        if !self.hypotheses.is_empty() {
            return Err(Error::HypothesesAlreadyDeclared);
        }
        if hypotheses.contains(&Hypothesis::Undefined) {
            return Err(Error::UndefinedHypothesisDeclared);
        }
        let hypotheses = match (&self.candidate_hypotheses, narrowing) {
            (Some(candidates), true) => {
                let kept: BTreeSet<_> = hypotheses.intersection(candidates).copied().collect();
                if kept.is_empty() {
                    return Err(Error::EmptyHypothesesIntersection {
                        candidates: candidates.iter().copied().collect(),
                    });
                }
                kept
            }
            _ => hypotheses,
        };
        if let Some(h) = self.specializations.keys().find(|h| !hypotheses.contains(h)) {
            return Err(Error::SpecialisedHypothesisNotDeclared { hypothesis: *h });
        }
        if let Some(h) = self
            .requested_hypotheses
            .borrow()
            .iter()
            .find(|h| !hypotheses.contains(h))
        {
            return Err(Error::RequestedHypothesisNotDeclared { hypothesis: *h });
        }
        info!("Supported modelling hypotheses: {:?}", hypotheses);
        self.hypotheses = hypotheses;
        Ok(())
    }

    /// Give the candidates a later narrowing [`BehaviourDescription::set_hypotheses`]
    /// is intersected with. Successive restrictions accumulate.
    pub fn restrict_hypotheses(&mut self, candidates: BTreeSet<Hypothesis>) {
        let restricted = match self.candidate_hypotheses.take() {
            Some(previous) => previous.intersection(&candidates).copied().collect(),
            None => candidates,
        };
        self.candidate_hypotheses = Some(restricted);
    }

    /// The declared hypotheses, empty until declared.
    pub fn hypotheses(&self) -> &BTreeSet<Hypothesis> {
        &self.hypotheses
    }

    pub fn are_hypotheses_declared(&self) -> bool {
        !self.hypotheses.is_empty()
    }

    /// Hypotheses looked up before the declaration.
    pub fn requested_hypotheses(&self) -> BTreeSet<Hypothesis> {
        self.requested_hypotheses.borrow().clone()
    }

    pub fn is_hypothesis_supported(&self, h: Hypothesis) -> bool {
        self.hypotheses.contains(&h)
    }

    fn check_hypothesis(&self, h: Hypothesis) -> Result<()> {
        if h.is_undefined() {
            return Ok(());
        }
        if self.hypotheses.is_empty() {
            self.requested_hypotheses.borrow_mut().insert(h);
            return Ok(());
        }
        if !self.hypotheses.contains(&h) {
            return Err(Error::UnsupportedHypothesis { hypothesis: h });
        }
        Ok(())
    }

    pub fn has_specialization(&self, h: Hypothesis) -> bool {
        self.specializations.contains_key(&h)
    }

    pub fn specialized_hypotheses(&self) -> impl Iterator<Item = Hypothesis> {
        self.specializations.keys().copied()
    }

    /// Whether every declared hypothesis has its own specialisation.
    pub fn are_all_hypotheses_specialized(&self) -> bool {
        !self.hypotheses.is_empty() && self.hypotheses.iter().all(|h| self.specializations.contains_key(h))
    }

    /// Hypotheses whose data actually differ.
    ///
    /// With a single supported hypothesis, that hypothesis. Otherwise the
    /// specialised hypotheses, plus [`Hypothesis::Undefined`] standing for the
    /// others if some are not specialised.
    pub fn distinct_hypotheses(&self) -> Result<BTreeSet<Hypothesis>> {
        if self.hypotheses.is_empty() {
            return Err(Error::HypothesesNotDeclared);
        }
        if self.hypotheses.len() == 1 {
            return Ok(self.hypotheses.clone());
        }
        let mut distinct: BTreeSet<_> = self.specializations.keys().copied().collect();
        if !self.are_all_hypotheses_specialized() {
            distinct.insert(Hypothesis::Undefined);
        }
        Ok(distinct)
    }

    /// Materialise the specialisation of `h`, if not done yet.
    pub fn specialize(&mut self, h: Hypothesis) -> Result<()> {
        if h.is_undefined() {
            return Err(Error::UnsupportedHypothesis { hypothesis: h });
        }
        self.get_or_create(h).map(|_| ())
    }

    fn get_or_create(&mut self, h: Hypothesis) -> Result<&mut BehaviourData> {
        self.check_hypothesis(h)?;
        if !self.specializations.contains_key(&h) {
            debug!("Specialising the behaviour data for hypothesis `{}`", h);
        }
        let d = &self.d;
        Ok(self.specializations.entry(h).or_insert_with(|| d.clone()))
    }

    /// Data used for hypothesis `h`: its specialisation, or the default data.
    pub fn behaviour_data(&self, h: Hypothesis) -> Result<&BehaviourData> {
        self.check_hypothesis(h)?;
        Ok(self.specializations.get(&h).unwrap_or(&self.d))
    }

    /// The default data.
    pub fn default_data(&self) -> &BehaviourData {
        &self.d
    }

    /// Apply `op` to the data of `h`: the default and every specialisation for
    /// [`Hypothesis::Undefined`], the (possibly new) specialisation otherwise.
    fn apply<F>(&mut self, h: Hypothesis, mut op: F) -> Result<()>
    where
        F: FnMut(&mut BehaviourData) -> Result<()>,
    {
        if h.is_undefined() {
            op(&mut self.d)?;
            for data in self.specializations.values_mut() {
                op(data)?;
            }
            Ok(())
        } else {
            op(self.get_or_create(h)?)
        }
    }

    pub fn reserve_name(&mut self, h: Hypothesis, name: &str) -> Result<()> {
        self.apply(h, |d| d.reserve_name(name))
    }

    pub fn register_member_name(&mut self, h: Hypothesis, name: &str) -> Result<()> {
        self.apply(h, |d| d.register_member_name(name))
    }

    pub fn add_variable(&mut self, h: Hypothesis, category: VariableCategory, variable: VariableDescription) -> Result<()> {
        self.apply(h, |d| d.add_variable(category, variable.clone()))
    }

    pub fn add_variables(
        &mut self,
        h: Hypothesis,
        category: VariableCategory,
        variables: impl IntoIterator<Item = VariableDescription>,
    ) -> Result<()> {
        for variable in variables {
            self.add_variable(h, category, variable)?;
        }
        Ok(())
    }

    pub fn set_glossary_name(&mut self, h: Hypothesis, variable: &str, glossary_name: &str) -> Result<()> {
        self.apply(h, |d| d.set_glossary_name(variable, glossary_name))
    }

    pub fn set_entry_name(&mut self, h: Hypothesis, variable: &str, entry_name: &str) -> Result<()> {
        self.apply(h, |d| d.set_entry_name(variable, entry_name))
    }

    /// Variables of one category for hypothesis `h`.
    pub fn variables(&self, h: Hypothesis, category: VariableCategory) -> Result<&VariableDescriptionContainer> {
        Ok(self.behaviour_data(h)?.variables(category))
    }

    pub fn set_code(&mut self, h: Hypothesis, name: &str, block: CodeBlock, mode: Mode, position: Position) -> Result<()> {
        self.apply(h, |d| d.set_code(name, block.clone(), mode, position))
    }

    pub fn get_code(&self, h: Hypothesis, name: &str) -> Result<String> {
        self.behaviour_data(h)?.code(name)
    }

    pub fn has_code(&self, h: Hypothesis, name: &str) -> Result<bool> {
        Ok(self.behaviour_data(h)?.has_code(name))
    }

    pub fn set_attribute(&mut self, h: Hypothesis, name: &str, value: AttributeValue, allow_idempotent: bool) -> Result<()> {
        self.apply(h, |d| d.set_attribute(name, value.clone(), allow_idempotent))
    }

    pub fn attribute<T: AttributeType>(&self, h: Hypothesis, name: &str) -> Result<T> {
        self.behaviour_data(h)?.attribute(name)
    }

    /// Declare a behaviour-wide attribute (not tied to any hypothesis).
    pub fn set_behaviour_attribute(&mut self, name: &str, value: AttributeValue, allow_idempotent: bool) -> Result<()> {
        self.attributes.set(name, value, allow_idempotent)
    }

    pub fn behaviour_attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn set_bounds(&mut self, h: Hypothesis, variable: &str, kind: BoundsKind, bounds: Bounds) -> Result<()> {
        self.apply(h, |d| d.set_bounds(variable, kind, bounds))
    }

    pub fn set_parameter_default(&mut self, h: Hypothesis, name: &str, values: Vec<f64>) -> Result<()> {
        self.apply(h, |d| d.set_parameter_default(name, values.clone()))
    }

    pub fn behaviour_type(&self) -> BehaviourType {
        self.behaviour_type
    }

    pub fn main_variables(&self) -> &[MainVariable] {
        &self.main_variables
    }

    pub fn are_main_variables_declared(&self) -> bool {
        !self.main_variables.is_empty()
    }

    /// Fix the kind of behaviour and its first driving variable/force pair.
    pub fn declare_main_variables(&mut self, kind: BehaviourType, main_variable: MainVariable) -> Result<()> {
        if self.are_main_variables_declared() {
            return Err(Error::MainVariablesAlreadyDeclared);
        }
        self.insert_main_variable(main_variable)?;
        info!("Behaviour type set to `{}`", kind);
        self.behaviour_type = kind;
        Ok(())
    }

    /// Add another pair to a general behaviour.
    pub fn add_main_variable(&mut self, main_variable: MainVariable) -> Result<()> {
        if !self.behaviour_type.is_general() || !self.are_main_variables_declared() {
            return Err(Error::BehaviourTypeMismatch {
                expected: BehaviourType::General,
                found: self.behaviour_type,
            });
        }
        self.insert_main_variable(main_variable)
    }

    fn insert_main_variable(&mut self, main_variable: MainVariable) -> Result<()> {
        if self
            .main_variables
            .iter()
            .any(|m| m.driving.name == main_variable.driving.name)
        {
            return Err(Error::DuplicateMainVariable {
                name: main_variable.driving.name.clone(),
            });
        }
        for v in [&main_variable.driving, &main_variable.force] {
            if let Some(g) = &v.glossary_name {
                if !glossary::contains(g) {
                    return Err(Error::UnknownGlossaryName { name: g.clone() });
                }
            }
        }
        for name in main_variable.member_names() {
            self.register_member_name(Hypothesis::Undefined, &name)?;
        }
        self.main_variables.push(main_variable);
        Ok(())
    }

    pub fn declare_small_strain_behaviour(&mut self) -> Result<()> {
        self.declare_main_variables(BehaviourType::SmallStrain, MainVariable::small_strain())
    }

    pub fn declare_finite_strain_behaviour(&mut self) -> Result<()> {
        self.declare_main_variables(BehaviourType::FiniteStrain, MainVariable::finite_strain())
    }

    pub fn declare_cohesive_zone_model(&mut self) -> Result<()> {
        self.declare_main_variables(BehaviourType::CohesiveZone, MainVariable::cohesive_zone())
    }

    /// Symmetry of the behaviour, isotropic unless declared otherwise.
    pub fn symmetry(&self) -> Symmetry {
        self.symmetry.unwrap_or_default()
    }

    pub fn is_symmetry_declared(&self) -> bool {
        self.symmetry.is_some()
    }

    pub fn set_symmetry(&mut self, symmetry: Symmetry) -> Result<()> {
        if self.symmetry.is_some() {
            return Err(Error::SymmetryAlreadyDeclared);
        }
        if symmetry.is_isotropic() && self.elastic_symmetry.is_some_and(|s| s.is_orthotropic()) {
            return Err(Error::OrthotropicElasticityOfIsotropicBehaviour);
        }
        if let Some(coefficients) = &self.thermal_expansion {
            if coefficients.len() != symmetry.thermal_expansion_arity() {
                return Err(Error::SymmetryConflictsWithThermalExpansion {
                    symmetry,
                    count: coefficients.len(),
                });
            }
        }
        self.symmetry = Some(symmetry);
        Ok(())
    }

    /// Symmetry of the elastic part, the overall symmetry unless declared.
    pub fn elastic_symmetry(&self) -> Symmetry {
        self.elastic_symmetry.unwrap_or_else(|| self.symmetry())
    }

    pub fn set_elastic_symmetry(&mut self, symmetry: Symmetry) -> Result<()> {
        if self.elastic_symmetry.is_some() {
            return Err(Error::ElasticSymmetryAlreadyDeclared);
        }
        if symmetry.is_orthotropic() && self.symmetry().is_isotropic() {
            return Err(Error::OrthotropicElasticityOfIsotropicBehaviour);
        }
        self.elastic_symmetry = Some(symmetry);
        Ok(())
    }

    /// Declare the thermal expansion coefficients: one for isotropic
    /// behaviours, three for orthotropic ones. Each coefficient may only depend
    /// on the temperature.
    pub fn set_thermal_expansion(&mut self, coefficients: Vec<MaterialProperty>) -> Result<()> {
        if self.thermal_expansion.is_some() {
            return Err(Error::ThermalExpansionAlreadyDeclared);
        }
        let symmetry = self.symmetry();
        let expected = symmetry.thermal_expansion_arity();
        if coefficients.len() != expected {
            return Err(Error::ThermalExpansionArity {
                symmetry,
                expected,
                found: coefficients.len(),
            });
        }
        for coefficient in &coefficients {
            let inputs = coefficient.inputs();
            let depends_on_temperature_only = match inputs {
                [] => true,
                [input] => self.d.external_name(input)? == glossary::TEMPERATURE,
                _ => false,
            };
            if !depends_on_temperature_only {
                return Err(Error::ThermalExpansionInputs {
                    inputs: inputs.to_vec(),
                });
            }
        }
        self.thermal_expansion = Some(coefficients.into_iter().collect());
        Ok(())
    }

    pub fn thermal_expansion(&self) -> Option<&[MaterialProperty]> {
        self.thermal_expansion.as_deref()
    }

    pub fn metadata(&self) -> &BehaviourMetadata {
        &self.metadata
    }

    pub fn set_dsl_name(&mut self, name: &str) -> Result<()> {
        set_once(&mut self.metadata.dsl, "domain specific language", name)
    }

    pub fn set_behaviour_name(&mut self, name: &str) -> Result<()> {
        set_once(&mut self.metadata.behaviour, "behaviour name", name)
    }

    pub fn set_material_name(&mut self, name: &str) -> Result<()> {
        set_once(&mut self.metadata.material, "material name", name)
    }

    pub fn set_library(&mut self, name: &str) -> Result<()> {
        set_once(&mut self.metadata.library, "library name", name)
    }

    pub fn set_author(&mut self, author: &str) -> Result<()> {
        set_once(&mut self.metadata.author, "author", author)
    }

    pub fn set_date(&mut self, date: &str) -> Result<()> {
        set_once(&mut self.metadata.date, "date", date)
    }

    pub fn set_description(&mut self, description: &str) -> Result<()> {
        set_once(&mut self.metadata.description, "description", description)
    }

    /// Name of the generated class: `Material_Behaviour`, or `Behaviour` when
    /// no material is given.
    pub fn class_name(&self) -> Option<String> {
        let behaviour = self.metadata.behaviour.as_deref()?;
        Some(match &self.metadata.material {
            Some(material) => format!("{material}_{behaviour}"),
            None => behaviour.to_string(),
        })
    }

    /// Final checks before the description is handed to code generators.
    pub fn check_consistency(&self) -> Result<()> {
        if self.hypotheses.is_empty() {
            return Err(Error::HypothesesNotDeclared);
        }
        if !self.are_main_variables_declared() {
            return Err(Error::MissingBehaviourType);
        }
        self.d.check_parameter_defaults()?;
        for data in self.specializations.values() {
            data.check_parameter_defaults()?;
        }
        Ok(())
    }
}
