use bhvmodel::{
    BehaviourDescription, Error, Hypothesis,
    description::Symmetry,
    material_property::MaterialProperty,
    variable::{VariableCategory, VariableDescription},
};

fn with_temperature() -> BehaviourDescription {
    let mut bd = BehaviourDescription::new();
    bd.declare_small_strain_behaviour().expect("small strain");
    bd.add_variable(
        Hypothesis::Undefined,
        VariableCategory::ExternalStateVariable,
        VariableDescription::new("temperature", "T", 1, 0).with_glossary_name("Temperature"),
    )
    .expect("temperature");
    bd
}

#[test]
fn temperature_dependent_isotropic_expansion() {
    let mut bd = with_temperature();
    bd.set_thermal_expansion(vec![MaterialProperty::formula("1.e-5*(1+T/1000)", ["T"])])
        .expect("thermal expansion");
    assert_eq!(bd.thermal_expansion().map(<[_]>::len), Some(1));
}

#[test]
fn isotropic_expansion_takes_one_coefficient() {
    for count in [2, 3] {
        let mut bd = with_temperature();
        assert_eq!(
            bd.set_thermal_expansion(vec![MaterialProperty::Constant(1e-5); count]),
            Err(Error::ThermalExpansionArity {
                symmetry: Symmetry::Isotropic,
                expected: 1,
                found: count
            })
        );
        assert!(bd.thermal_expansion().is_none());
        bd.set_thermal_expansion(vec![MaterialProperty::Constant(1e-5)])
            .expect("one coefficient");
    }
}

#[test]
fn orthotropic_expansion_takes_three_coefficients() {
    let mut bd = with_temperature();
    bd.set_symmetry(Symmetry::Orthotropic).expect("symmetry");
    assert_eq!(
        bd.set_thermal_expansion(vec![MaterialProperty::Constant(1e-5)]),
        Err(Error::ThermalExpansionArity {
            symmetry: Symmetry::Orthotropic,
            expected: 3,
            found: 1
        })
    );
    bd.set_thermal_expansion(vec![MaterialProperty::Constant(1e-5); 3])
        .expect("three coefficients");
}

#[test]
fn coefficients_may_only_depend_on_temperature() {
    let mut bd = with_temperature();
    bd.add_variable(
        Hypothesis::Undefined,
        VariableCategory::ExternalStateVariable,
        VariableDescription::new("real", "Phi", 1, 0),
    )
    .expect("Phi");
    assert!(matches!(
        bd.set_thermal_expansion(vec![MaterialProperty::formula("1e-5*Phi", ["Phi"])]),
        Err(Error::ThermalExpansionInputs { .. })
    ));
}

#[test]
fn symmetry_must_agree_with_declared_expansion() {
    let mut bd = with_temperature();
    bd.set_thermal_expansion(vec![MaterialProperty::Constant(2e-5)])
        .expect("isotropic expansion");
    assert!(matches!(
        bd.set_symmetry(Symmetry::Orthotropic),
        Err(Error::SymmetryConflictsWithThermalExpansion { count: 1, .. })
    ));
    assert!(matches!(
        bd.set_thermal_expansion(vec![MaterialProperty::Constant(2e-5)]),
        Err(Error::ThermalExpansionAlreadyDeclared)
    ));
}

#[test]
fn orthotropic_elasticity_needs_orthotropic_behaviour() {
    let mut bd = BehaviourDescription::new();
    assert_eq!(
        bd.set_elastic_symmetry(Symmetry::Orthotropic),
        Err(Error::OrthotropicElasticityOfIsotropicBehaviour)
    );
    bd.set_symmetry(Symmetry::Orthotropic).expect("symmetry");
    assert_eq!(bd.elastic_symmetry(), Symmetry::Orthotropic);
    bd.set_elastic_symmetry(Symmetry::Isotropic).expect("isotropic elasticity");
    assert_eq!(bd.elastic_symmetry(), Symmetry::Isotropic);
}
