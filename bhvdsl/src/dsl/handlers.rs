//! Handlers of the standard keywords.
use std::collections::BTreeSet;

use bhvmodel::{
    Hypothesis,
    attribute::AttributeValue,
    bounds::{Bounds, BoundsKind},
    description::{BehaviourType, MainVariable, Symmetry},
    material_property::MaterialProperty,
    utils::is_valid_identifier,
    variable::{VariableCategory, VariableDescription},
};
use log::debug;

use super::BehaviourDsl;
use crate::{
    error::{DslError, DslResult},
    keywords::{KeywordHandler, KeywordRegistry},
    lexer,
    token::{Token, TokenReader},
};

/// Strain measures of small strain behaviours.
const STRAIN_MEASURES: [&str; 3] = ["Linearised", "GreenLagrange", "Hencky"];

/// Registry holding every keyword of the behaviour DSL.
pub fn standard_keywords() -> DslResult<KeywordRegistry> {
    let mut keywords = KeywordRegistry::new();
    let handlers: &[(&str, KeywordHandler)] = &[
        ("@DSL", treat_dsl),
        ("@Behaviour", treat_behaviour),
        ("@Material", treat_material),
        ("@Library", treat_library),
        ("@Author", treat_author),
        ("@Date", treat_date),
        ("@Description", treat_description),
        ("@Interface", treat_interface),
        ("@ModellingHypothesis", treat_modelling_hypothesis),
        ("@ModellingHypotheses", treat_modelling_hypotheses),
        ("@MaterialProperty", treat_material_property),
        ("@StateVariable", treat_state_variable),
        ("@AuxiliaryStateVariable", treat_auxiliary_state_variable),
        ("@ExternalStateVariable", treat_external_state_variable),
        ("@LocalVariable", treat_local_variable),
        ("@IntegrationVariable", treat_integration_variable),
        ("@Parameter", treat_parameter),
        ("@Gradient", treat_gradient),
        ("@ThermodynamicForce", treat_thermodynamic_force),
        ("@Bounds", treat_bounds),
        ("@PhysicalBounds", treat_physical_bounds),
        ("@InitLocalVariables", treat_init_local_variables),
        ("@Integrator", treat_integrator),
        ("@ComputeStress", treat_compute_stress),
        ("@UpdateAuxiliaryStateVariables", treat_update_auxiliary_state_variables),
        ("@TangentOperator", treat_tangent_operator),
        ("@Includes", treat_includes),
        ("@Members", treat_members),
        ("@Sources", treat_sources),
        ("@IsotropicBehaviour", treat_isotropic_behaviour),
        ("@OrthotropicBehaviour", treat_orthotropic_behaviour),
        ("@IsotropicElasticBehaviour", treat_isotropic_elastic_behaviour),
        ("@OrthotropicElasticBehaviour", treat_orthotropic_elastic_behaviour),
        ("@ComputeThermalExpansion", treat_compute_thermal_expansion),
        ("@Epsilon", treat_epsilon),
        ("@UseQt", treat_use_qt),
        ("@StrainMeasure", treat_strain_measure),
        ("@Flux", treat_thermodynamic_force),
    ];
    for &(name, handler) in handlers {
        keywords.register(name, handler, false)?;
    }
    for (alias, target) in [
        ("@Parser", "@DSL"),
        ("@Coef", "@MaterialProperty"),
        ("@StateVar", "@StateVariable"),
        ("@AuxiliaryStateVar", "@AuxiliaryStateVariable"),
        ("@ExternalStateVar", "@ExternalStateVariable"),
    ] {
        keywords.alias(alias, target)?;
    }
    debug!("{} standard keywords registered", keywords.len());
    Ok(keywords)
}

fn treat_dsl(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let token = reader.next()?;
    reader.expect(";")?;
    let description = &mut dsl.description;
    match token.text.as_str() {
        "Default" | "DefaultDSL" => description.declare_small_strain_behaviour()?,
        "DefaultFiniteStrain" | "DefaultFiniteStrainDSL" => description.declare_finite_strain_behaviour()?,
        "DefaultCZM" | "DefaultCZMDSL" => description.declare_cohesive_zone_model()?,
        "DefaultGenericBehaviour" => {}
        _ => {
            return Err(DslError::InvalidValue {
                what: "domain specific language",
                value: token.text.clone(),
                line: token.line,
            });
        }
    }
    description.set_dsl_name(&token.text)?;
    Ok(())
}

/// `@Keyword name;` where `name` is a valid identifier.
fn read_name<'s>(reader: &mut TokenReader<'s>) -> DslResult<&'s str> {
    let name = reader.read_identifier()?;
    reader.expect(";")?;
    Ok(name)
}

fn treat_behaviour(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let name = read_name(reader)?;
    dsl.description.set_behaviour_name(name)?;
    Ok(())
}

fn treat_material(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let name = read_name(reader)?;
    dsl.description.set_material_name(name)?;
    Ok(())
}

fn treat_library(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let name = read_name(reader)?;
    dsl.description.set_library(name)?;
    Ok(())
}

/// Free text up to `;`.
fn read_text(reader: &mut TokenReader<'_>) -> DslResult<String> {
    Ok(reader
        .read_until_semicolon()?
        .iter()
        .map(|t| t.unquoted())
        .collect::<Vec<_>>()
        .join(" "))
}

fn treat_author(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let author = read_text(reader)?;
    dsl.description.set_author(&author)?;
    Ok(())
}

fn treat_date(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let date = read_text(reader)?;
    dsl.description.set_date(&date)?;
    Ok(())
}

fn treat_description(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let block = dsl.extract_code_block(reader, Hypothesis::Undefined, false)?;
    dsl.description.set_description(block.code.trim())?;
    Ok(())
}

fn treat_interface(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    loop {
        let name = reader.next()?;
        dsl.select_interface(name.unquoted())?;
        let separator = reader.next()?;
        if separator.is(";") {
            return Ok(());
        }
        if !separator.is(",") {
            return Err(DslError::unexpected("`,` or `;`", separator));
        }
    }
}

fn treat_modelling_hypothesis(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let token = reader.next()?;
    reader.expect(";")?;
    let hypothesis = Hypothesis::parse(token.unquoted())?;
    dsl.set_hypotheses(BTreeSet::from([hypothesis]))
}

fn treat_modelling_hypotheses(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let tokens = reader.read_list("{", "}")?;
    reader.expect(";")?;
    let mut hypotheses = BTreeSet::new();
    for token in tokens {
        match token.unquoted() {
            ".+" => hypotheses.extend(Hypothesis::all()),
            name => {
                hypotheses.insert(Hypothesis::parse(name)?);
            }
        }
    }
    dsl.set_hypotheses(hypotheses)
}

/// `@Keyword<h1, h2> type name, name2[3], ...;`
fn read_variables(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>, category: VariableCategory) -> DslResult<()> {
    let hypotheses = dsl.read_hypothesis_restriction(reader)?;
    let untyped = category == VariableCategory::Parameter
        && reader
            .peek_nth(1)
            .is_some_and(|t| ["=", "[", ",", ";"].iter().any(|s| t.is(s)));
    let type_name = if untyped { "real" } else { reader.read_identifier()? };
    loop {
        let token = reader.next()?;
        if !token.is_identifier() {
            return Err(DslError::unexpected("a variable name", token));
        }
        let array_size = if reader.consume("[") {
            let size = reader.read_unsigned()?;
            reader.expect("]")?;
            u16::try_from(size).map_err(|_| DslError::InvalidValue {
                what: "array size",
                value: size.to_string(),
                line: token.line,
            })?
        } else {
            1
        };
        let variable = VariableDescription::new(type_name, token.text.as_str(), array_size, token.line);
        let defaults = if category == VariableCategory::Parameter && reader.consume("=") {
            Some(read_default_values(reader)?)
        } else {
            None
        };
        for &h in &hypotheses {
            dsl.description.add_variable(h, category, variable.clone())?;
            if let Some(values) = &defaults {
                dsl.description.set_parameter_default(h, &token.text, values.clone())?;
            }
        }
        let separator = reader.next()?;
        if separator.is(";") {
            return Ok(());
        }
        if !separator.is(",") {
            return Err(DslError::unexpected("`,` or `;`", separator));
        }
    }
}

/// `value` or `{v1, v2, ...}`.
fn read_default_values(reader: &mut TokenReader<'_>) -> DslResult<Vec<f64>> {
    if !reader.consume("{") {
        return Ok(vec![reader.read_f64()?]);
    }
    let mut values = Vec::new();
    loop {
        values.push(reader.read_f64()?);
        let separator = reader.next()?;
        if separator.is("}") {
            return Ok(values);
        }
        if !separator.is(",") {
            return Err(DslError::unexpected("`,` or `}`", separator));
        }
    }
}

fn treat_material_property(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    read_variables(dsl, reader, VariableCategory::MaterialProperty)
}

fn treat_state_variable(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    read_variables(dsl, reader, VariableCategory::StateVariable)
}

fn treat_auxiliary_state_variable(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    read_variables(dsl, reader, VariableCategory::AuxiliaryStateVariable)
}

fn treat_external_state_variable(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    read_variables(dsl, reader, VariableCategory::ExternalStateVariable)
}

fn treat_local_variable(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    read_variables(dsl, reader, VariableCategory::LocalVariable)
}

fn treat_integration_variable(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    read_variables(dsl, reader, VariableCategory::IntegrationVariable)
}

fn treat_parameter(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    read_variables(dsl, reader, VariableCategory::Parameter)
}

/// `type name;`
fn read_main_variable(reader: &mut TokenReader<'_>) -> DslResult<VariableDescription> {
    let type_name = reader.read_identifier()?;
    let token = reader.next()?;
    if !token.is_identifier() {
        return Err(DslError::unexpected("a variable name", token));
    }
    reader.expect(";")?;
    Ok(VariableDescription::new(type_name, token.text.as_str(), 1, token.line))
}

fn check_general_behaviour(dsl: &BehaviourDsl) -> DslResult<()> {
    let found = dsl.description.behaviour_type();
    if !found.is_general() {
        return Err(bhvmodel::Error::BehaviourTypeMismatch {
            expected: BehaviourType::General,
            found,
        }
        .into());
    }
    Ok(())
}

fn treat_gradient(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    check_general_behaviour(dsl)?;
    if let Some(pending) = &dsl.pending_gradient {
        return Err(DslError::PendingGradient {
            name: pending.name.clone(),
        });
    }
    dsl.pending_gradient = Some(read_main_variable(reader)?);
    Ok(())
}

fn treat_thermodynamic_force(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    check_general_behaviour(dsl)?;
    let force = read_main_variable(reader)?;
    let Some(gradient) = dsl.pending_gradient.take() else {
        return Err(DslError::MissingGradient { name: force.name });
    };
    let main_variable = MainVariable::new(gradient, force);
    if dsl.description.are_main_variables_declared() {
        dsl.description.add_main_variable(main_variable)?;
    } else {
        dsl.description
            .declare_main_variables(BehaviourType::General, main_variable)?;
    }
    Ok(())
}

/// One side of an interval: a number, or `*` for unbounded.
fn read_bound(reader: &mut TokenReader<'_>) -> DslResult<Option<f64>> {
    if reader.consume("*") {
        return Ok(None);
    }
    reader.read_f64().map(Some)
}

fn expect_one_of<'s>(reader: &mut TokenReader<'s>, candidates: &[&str]) -> DslResult<&'s Token> {
    let token = reader.next()?;
    if !candidates.iter().any(|c| token.is(c)) {
        return Err(DslError::unexpected(
            candidates
                .iter()
                .map(|c| format!("`{c}`"))
                .collect::<Vec<_>>()
                .join(" or "),
            token,
        ));
    }
    Ok(token)
}

/// `variable in [lower:upper];`, each side possibly `*`.
fn read_bounds(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>, kind: BoundsKind) -> DslResult<()> {
    let variable = reader.read_identifier()?;
    reader.expect("in")?;
    expect_one_of(reader, &["[", "]"])?;
    let lower = read_bound(reader)?;
    reader.expect(":")?;
    let upper = read_bound(reader)?;
    expect_one_of(reader, &["[", "]"])?;
    reader.expect(";")?;
    let bounds = Bounds::new(variable, lower, upper)?;
    for h in dsl.hypotheses_defining(variable)? {
        dsl.description.set_bounds(h, variable, kind, bounds)?;
    }
    Ok(())
}

fn treat_bounds(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    read_bounds(dsl, reader, BoundsKind::Value)
}

fn treat_physical_bounds(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    read_bounds(dsl, reader, BoundsKind::Physical)
}

fn treat_init_local_variables(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    dsl.treat_code_block(reader, "InitLocalVariables", true)
}

fn treat_integrator(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    dsl.treat_code_block(reader, "Integrator", true)
}

fn treat_compute_stress(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    dsl.treat_code_block(reader, "ComputeStress", true)
}

fn treat_update_auxiliary_state_variables(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    dsl.treat_code_block(reader, "UpdateAuxiliaryStateVariables", true)
}

fn treat_tangent_operator(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    dsl.treat_code_block(reader, "TangentOperator", true)
}

fn treat_includes(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    dsl.treat_code_block(reader, "Includes", false)
}

fn treat_members(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    dsl.treat_code_block(reader, "Members", false)
}

fn treat_sources(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    dsl.treat_code_block(reader, "Sources", false)
}

fn treat_isotropic_behaviour(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    reader.expect(";")?;
    dsl.description.set_symmetry(Symmetry::Isotropic)?;
    Ok(())
}

fn treat_orthotropic_behaviour(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    reader.expect(";")?;
    dsl.description.set_symmetry(Symmetry::Orthotropic)?;
    Ok(())
}

fn treat_isotropic_elastic_behaviour(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    reader.expect(";")?;
    dsl.description.set_elastic_symmetry(Symmetry::Isotropic)?;
    Ok(())
}

fn treat_orthotropic_elastic_behaviour(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    reader.expect(";")?;
    dsl.description.set_elastic_symmetry(Symmetry::Orthotropic)?;
    Ok(())
}

/// A number, or a quoted formula of declared variables.
fn read_material_property(dsl: &BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<MaterialProperty> {
    let is_formula = reader.peek().is_some_and(Token::is_string_literal);
    if !is_formula {
        return Ok(MaterialProperty::Constant(reader.read_f64()?));
    }
    let expression = reader.read_string()?;
    let tokens = lexer::lex(expression)?;
    let data = dsl.description.default_data();
    let mut inputs: Vec<String> = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if !token.is_identifier() {
            continue;
        }
        // function calls
        if tokens.get(i + 1).is_some_and(|next| next.is("(")) {
            continue;
        }
        if !data.is_variable_name(&token.text) {
            return Err(bhvmodel::Error::UnknownVariable {
                name: token.text.clone(),
            }
            .into());
        }
        if !inputs.contains(&token.text) {
            inputs.push(token.text.clone());
        }
    }
    Ok(MaterialProperty::formula(expression, inputs))
}

fn treat_compute_thermal_expansion(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let found = dsl.description.behaviour_type();
    if !(found.is_small_strain() || found.is_finite_strain()) {
        return Err(bhvmodel::Error::BehaviourTypeMismatch {
            expected: BehaviourType::SmallStrain,
            found,
        }
        .into());
    }
    let mut coefficients = Vec::new();
    if reader.consume("{") {
        loop {
            coefficients.push(read_material_property(dsl, reader)?);
            let separator = reader.next()?;
            if separator.is("}") {
                break;
            }
            if !separator.is(",") {
                return Err(DslError::unexpected("`,` or `}`", separator));
            }
        }
    } else {
        coefficients.push(read_material_property(dsl, reader)?);
    }
    reader.expect(";")?;
    dsl.description.set_thermal_expansion(coefficients)?;
    Ok(())
}

fn treat_epsilon(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let hypotheses = dsl.read_hypothesis_restriction(reader)?;
    let epsilon = reader.read_f64()?;
    reader.expect(";")?;
    for h in hypotheses {
        dsl.description
            .set_attribute(h, "epsilon", AttributeValue::Number(epsilon), false)?;
    }
    Ok(())
}

fn treat_use_qt(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let use_qt = reader.read_bool()?;
    reader.expect(";")?;
    dsl.description
        .set_behaviour_attribute("use_qt", AttributeValue::Bool(use_qt), false)?;
    Ok(())
}

fn treat_strain_measure(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let found = dsl.description.behaviour_type();
    if !found.is_small_strain() {
        return Err(bhvmodel::Error::BehaviourTypeMismatch {
            expected: BehaviourType::SmallStrain,
            found,
        }
        .into());
    }
    let token = reader.next()?;
    reader.expect(";")?;
    if !is_valid_identifier(&token.text) || !STRAIN_MEASURES.contains(&token.text.as_str()) {
        return Err(DslError::InvalidValue {
            what: "strain measure",
            value: token.text.clone(),
            line: token.line,
        });
    }
    dsl.description.set_behaviour_attribute(
        "strain_measure",
        AttributeValue::String(token.text.clone()),
        false,
    )?;
    Ok(())
}
