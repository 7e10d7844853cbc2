use bhvmodel::{
    BehaviourDescription, Error, ErrorKind, Hypothesis,
    attribute::{AttributeKind, AttributeValue},
    bounds::{Bounds, BoundsKind},
    description::BehaviourType,
    variable::{VariableCategory, VariableDescription},
};

const H: Hypothesis = Hypothesis::Undefined;

fn real(name: &str) -> VariableDescription {
    VariableDescription::new("real", name, 1, 0)
}

#[test]
fn reserved_names_can_not_be_variables() {
    let mut bd = BehaviourDescription::new();
    bd.reserve_name(H, "young").expect("reserve");
    assert_eq!(
        bd.add_variable(H, VariableCategory::MaterialProperty, real("young")),
        Err(Error::NameAlreadyReserved {
            name: "young".to_string()
        })
    );
    assert_eq!(
        bd.reserve_name(H, "young").map_err(|e| e.kind()),
        Err(ErrorKind::DuplicateDeclaration)
    );
}

#[test]
fn increments_are_reserved() {
    let mut bd = BehaviourDescription::new();
    bd.add_variable(H, VariableCategory::StateVariable, real("p")).expect("p");
    assert!(bd.default_data().is_member_name("dp"));
    assert!(bd.add_variable(H, VariableCategory::LocalVariable, real("dp")).is_err());
    // local variables have no increment
    bd.add_variable(H, VariableCategory::LocalVariable, real("q")).expect("q");
    assert!(!bd.default_data().is_name_reserved("dq"));
}

#[test]
fn glossary_names_are_unique_and_known() {
    let mut bd = BehaviourDescription::new();
    bd.add_variable(H, VariableCategory::StateVariable, real("p")).expect("p");
    bd.add_variable(H, VariableCategory::StateVariable, real("q")).expect("q");
    bd.set_glossary_name(H, "p", "EquivalentPlasticStrain").expect("glossary");
    assert!(matches!(
        bd.set_glossary_name(H, "q", "EquivalentPlasticStrain"),
        Err(Error::GlossaryNameAlreadyUsed { .. })
    ));
    assert!(matches!(
        bd.set_glossary_name(H, "q", "NotInTheGlossary"),
        Err(Error::UnknownGlossaryName { .. })
    ));
    bd.set_entry_name(H, "q", "HardeningVariable").expect("entry");
    assert_eq!(bd.default_data().external_name("q").expect("q"), "HardeningVariable");
}

#[test]
fn attributes_are_typed() {
    let mut bd = BehaviourDescription::new();
    bd.set_attribute(H, "epsilon", AttributeValue::Number(1e-14), false)
        .expect("epsilon");
    assert_eq!(bd.attribute::<f64>(H, "epsilon"), Ok(1e-14));
    assert!(bd.attribute::<bool>(H, "epsilon").is_err());
    assert_eq!(
        bd.set_attribute(H, "epsilon", AttributeValue::Bool(true), true),
        Err(Error::AttributeKindMismatch {
            name: "epsilon".to_string(),
            expected: AttributeKind::Number,
            found: AttributeKind::Bool
        })
    );
    bd.set_attribute(H, "epsilon", AttributeValue::Number(1e-10), true)
        .expect("idempotent");
    assert!(matches!(
        bd.set_attribute(H, "epsilon", AttributeValue::Number(1e-10), false),
        Err(Error::AttributeAlreadyDeclared { .. })
    ));
}

#[test]
fn bounds_of_declared_variables() {
    let mut bd = BehaviourDescription::new();
    bd.add_variable(H, VariableCategory::StateVariable, real("p")).expect("p");
    let positive = Bounds::new("p", Some(0.), None).expect("bounds");
    bd.set_bounds(H, "p", BoundsKind::Physical, positive).expect("physical");
    bd.set_bounds(H, "p", BoundsKind::Value, positive).expect("value");
    assert!(matches!(
        bd.set_bounds(H, "p", BoundsKind::Physical, positive),
        Err(Error::BoundsAlreadyDeclared { .. })
    ));
    assert!(matches!(
        bd.set_bounds(H, "unknown", BoundsKind::Value, positive),
        Err(Error::UnknownVariable { .. })
    ));
}

#[test]
fn parameters_need_defaults() {
    let mut bd = BehaviourDescription::new();
    bd.declare_small_strain_behaviour().expect("small strain");
    bd.set_hypotheses(Hypothesis::all_set(), false).expect("hypotheses");
    bd.add_variable(H, VariableCategory::Parameter, VariableDescription::new("real", "A", 2, 0))
        .expect("A");
    assert_eq!(
        bd.check_consistency(),
        Err(Error::MissingParameterDefault {
            name: "A".to_string()
        })
    );
    assert!(matches!(
        bd.set_parameter_default(H, "A", vec![1.]),
        Err(Error::ParameterDefaultArity { expected: 2, found: 1, .. })
    ));
    bd.set_parameter_default(H, "A", vec![1., 2.]).expect("defaults");
    bd.check_consistency().expect("consistent");
}

#[test]
fn main_variables() {
    let mut bd = BehaviourDescription::new();
    bd.declare_small_strain_behaviour().expect("small strain");
    assert_eq!(bd.behaviour_type(), BehaviourType::SmallStrain);
    for name in ["eto", "deto", "sig"] {
        assert!(bd.default_data().is_member_name(name));
    }
    assert_eq!(
        bd.declare_finite_strain_behaviour(),
        Err(Error::MainVariablesAlreadyDeclared)
    );
    assert!(matches!(
        bd.add_main_variable(bhvmodel::description::MainVariable::finite_strain()),
        Err(Error::BehaviourTypeMismatch { .. })
    ));
}

#[test]
fn metadata_is_set_once() {
    let mut bd = BehaviourDescription::new();
    bd.set_behaviour_name("Norton").expect("name");
    assert_eq!(bd.class_name().as_deref(), Some("Norton"));
    bd.set_material_name("Inconel").expect("material");
    assert_eq!(bd.class_name().as_deref(), Some("Inconel_Norton"));
    assert!(matches!(
        bd.set_behaviour_name("Other"),
        Err(Error::AlreadyDeclared { .. })
    ));
}
