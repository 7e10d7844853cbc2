use std::sync::Arc;

use bhvdsl::{DslConfig, DslContext, DslError, compile_str};
use bhvmodel::{
    BehaviourDescription, ErrorKind, Hypothesis,
    bounds::{Bounds, BoundsKind},
    description::{BehaviourType, Symmetry},
    material_property::MaterialProperty,
    variable::VariableCategory,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn context() -> Arc<DslContext> {
    DslContext::standard(DslConfig::default()).expect("standard context")
}

fn compile(src: &str) -> Result<BehaviourDescription, DslError> {
    init_logger();
    compile_str(&context(), src, Some("scenario.mfront"))
}

fn names(bd: &BehaviourDescription, h: Hypothesis, category: VariableCategory) -> Vec<String> {
    bd.variables(h, category)
        .expect("variables")
        .names()
        .map(str::to_string)
        .collect()
}

#[test]
fn small_strain_behaviour() {
    let bd = compile(
        "@DSL Default;\n\
         @Behaviour Norton;\n\
         @ModellingHypothesis Tridimensional;\n\
         @StateVariable real p;\n\
         @Integrator{} { p += 1; }\n",
    )
    .expect("compiles");

    assert_eq!(bd.behaviour_type(), BehaviourType::SmallStrain);
    assert_eq!(bd.class_name().as_deref(), Some("Norton"));
    assert_eq!(bd.hypotheses().iter().copied().collect::<Vec<_>>(), [Hypothesis::Tridimensional]);
    assert_eq!(names(&bd, Hypothesis::Tridimensional, VariableCategory::StateVariable), ["p"]);

    let code = bd.get_code(Hypothesis::Tridimensional, "Integrator").expect("integrator");
    assert!(code.contains("this->p += 1;"), "{code}");
    let block = bd
        .behaviour_data(Hypothesis::Tridimensional)
        .expect("data")
        .code_block("Integrator")
        .expect("block");
    assert!(block.modified_variables().contains("p"));
}

#[test]
fn created_twice() {
    let err = compile(
        "@DSL Default;\n\
         @Behaviour Twice;\n\
         @Integrator{Create} { }\n\
         @Integrator{Create} { }\n",
    )
    .expect_err("block created twice");
    assert!(matches!(
        err.root(),
        DslError::Model(bhvmodel::Error::CodeBlockAlreadyDeclared { name }) if name == "Integrator"
    ));
    assert_eq!(err.kind(), ErrorKind::DuplicateDeclaration);
    assert_eq!(err.line(), Some(4));
}

#[test]
fn orthotropic_thermal_expansion() {
    let header = "@DSL Default;\n@Behaviour Ortho;\n@OrthotropicBehaviour;\n";

    let err = compile(&format!("{header}@ComputeThermalExpansion 1.e-5;\n")).expect_err("one coefficient");
    assert!(matches!(
        err.root(),
        DslError::Model(bhvmodel::Error::ThermalExpansionArity { expected: 3, found: 1, .. })
    ));

    let bd = compile(&format!(
        "{header}@ComputeThermalExpansion {{\"1.e-5*(1+T/1000)\", 2.e-5, 3.e-5}};\n"
    ))
    .expect("three coefficients");
    assert_eq!(bd.symmetry(), Symmetry::Orthotropic);
    let coefficients = bd.thermal_expansion().expect("coefficients");
    assert_eq!(coefficients.len(), 3);
    assert_eq!(coefficients[0], MaterialProperty::formula("1.e-5*(1+T/1000)", ["T"]));
    assert_eq!(coefficients[1], MaterialProperty::Constant(2.0e-5));
}

#[test]
fn thermal_expansion_formulas() {
    let header = "@DSL Default;\n@Behaviour Dilatation;\n@MaterialProperty real E;\n";
    let bd = compile(&format!("{header}@ComputeThermalExpansion \"1.e-5*exp(T/300)\";\n")).expect("compiles");
    assert_eq!(bd.thermal_expansion().expect("alpha")[0].inputs(), ["T"]);

    let err = compile(&format!("{header}@ComputeThermalExpansion \"1.e-5*E\";\n")).expect_err("depends on E");
    assert!(matches!(err.root(), DslError::Model(bhvmodel::Error::ThermalExpansionInputs { .. })));

    let err = compile(&format!("{header}@ComputeThermalExpansion \"1.e-5*Y\";\n")).expect_err("unknown Y");
    assert!(matches!(err.root(), DslError::Model(bhvmodel::Error::UnknownVariable { name }) if name == "Y"));

    let err = compile("@DSL DefaultCZM;\n@ComputeThermalExpansion 1.e-5;\n").expect_err("not strain based");
    assert!(matches!(err.root(), DslError::Model(bhvmodel::Error::BehaviourTypeMismatch { .. })));
}

#[test]
fn parameters() {
    let bd = compile(
        "@DSL Default;\n\
         @Behaviour Params;\n\
         @Parameter A = 2, B[2] = {1, 2.5};\n\
         @Parameter real C;\n\
         C.setDefaultValue(-3.e2);\n",
    )
    .expect("compiles");
    let data = bd.default_data();
    assert_eq!(data.parameter_default("A"), Some(&[2.][..]));
    assert_eq!(data.parameter_default("B"), Some(&[1., 2.5][..]));
    assert_eq!(data.parameter_default("C"), Some(&[-300.][..]));
    assert_eq!(data.variable("B").expect("B").array_size, 2);
    assert_eq!(data.variable("A").expect("A").type_name, "real");

    let err = compile("@DSL Default;\n@Behaviour P;\n@Parameter real C;\n").expect_err("missing default");
    assert!(matches!(err.root(), DslError::Model(bhvmodel::Error::MissingParameterDefault { name }) if name == "C"));

    let err = compile("@DSL Default;\n@Behaviour P;\n@Parameter B[2] = 1;\n").expect_err("wrong arity");
    assert!(matches!(err.root(), DslError::Model(bhvmodel::Error::ParameterDefaultArity { .. })));
}

#[test]
fn bounds() {
    let bd = compile(
        "@DSL Default;\n\
         @Behaviour Bounded;\n\
         @StateVariable real p;\n\
         @MaterialProperty real E;\n\
         @Bounds p in [0:*[;\n\
         @PhysicalBounds E in ]0:1e12];\n",
    )
    .expect("compiles");
    let data = bd.default_data();
    let p = data.bounds("p").expect("p bounds");
    assert_eq!(p.get(BoundsKind::Value), Some(&Bounds { lower: Some(0.), upper: None }));
    assert_eq!(p.get(BoundsKind::Physical), None);
    let e = data.bounds("E").expect("E bounds");
    assert_eq!(e.get(BoundsKind::Physical), Some(&Bounds { lower: Some(0.), upper: Some(1e12) }));

    let err = compile("@DSL Default;\n@Behaviour B;\n@Bounds q in [0:1];\n").expect_err("unknown q");
    assert!(matches!(err.root(), DslError::Model(bhvmodel::Error::UnknownVariable { .. })));

    let err = compile("@DSL Default;\n@Behaviour B;\n@StateVariable real p;\n@Bounds p in [2:1];\n")
        .expect_err("reversed");
    assert!(matches!(err.root(), DslError::Model(bhvmodel::Error::InvalidBounds { .. })));
}

#[test]
fn external_names() {
    let bd = compile(
        "@DSL Default;\n\
         @Behaviour Names;\n\
         @MaterialProperty real young;\n\
         young.setGlossaryName(\"YoungModulus\");\n\
         @StateVariable real p;\n\
         p.setEntryName(\"HardeningVariable\");\n",
    )
    .expect("compiles");
    let data = bd.default_data();
    assert_eq!(data.external_name("young").expect("young"), "YoungModulus");
    assert_eq!(data.external_name("p").expect("p"), "HardeningVariable");
    assert_eq!(data.external_name("T").expect("T"), "Temperature");

    let err = compile("@DSL Default;\n@StateVariable real p;\np.setGlossaryName(\"Nope\");\n")
        .expect_err("not in glossary");
    assert!(matches!(err.root(), DslError::Model(bhvmodel::Error::UnknownGlossaryName { .. })));

    let err = compile("@DSL Default;\n@StateVariable real p;\np.setEntryName(\"Temperature\");\n")
        .expect_err("glossary name as entry name");
    assert!(matches!(err.root(), DslError::Model(bhvmodel::Error::EntryNameIsGlossaryName { .. })));
}

#[test]
fn generic_behaviour() {
    let bd = compile(
        "@DSL DefaultGenericBehaviour;\n\
         @Behaviour Diffusion;\n\
         @Gradient TemperatureGradient gT;\n\
         @Flux HeatFlux j;\n\
         @Integrator { j = 2 * gT; }\n",
    )
    .expect("compiles");
    assert_eq!(bd.behaviour_type(), BehaviourType::General);
    assert_eq!(bd.main_variables().len(), 1);
    assert_eq!(bd.main_variables()[0].driving.name, "gT");
    assert_eq!(
        bd.get_code(Hypothesis::Undefined, "Integrator").expect("code"),
        "this->j = 2 * this->gT;\n"
    );

    let err = compile("@DSL DefaultGenericBehaviour;\n@Gradient G g;\n@Gradient G h;\n").expect_err("two gradients");
    assert!(matches!(err.root(), DslError::PendingGradient { name } if name == "g"));

    let err = compile("@DSL DefaultGenericBehaviour;\n@Gradient G g;\n").expect_err("gradient alone");
    assert!(matches!(err.root(), DslError::PendingGradient { .. }));

    let err = compile("@DSL DefaultGenericBehaviour;\n@Flux F f;\n").expect_err("flux alone");
    assert!(matches!(err.root(), DslError::MissingGradient { name } if name == "f"));

    let err = compile("@DSL Default;\n@Gradient G g;\n").expect_err("strain based");
    assert!(matches!(err.root(), DslError::Model(bhvmodel::Error::BehaviourTypeMismatch { .. })));

    let err = compile("@DSL DefaultGenericBehaviour;\n@Behaviour Empty;\n").expect_err("no main variable");
    assert!(matches!(err.root(), DslError::Model(bhvmodel::Error::MissingBehaviourType)));
}

#[test]
fn default_hypotheses() {
    let bd = compile("@DSL DefaultCZM;\n@Behaviour Interface;\n").expect("compiles");
    assert_eq!(bd.behaviour_type(), BehaviourType::CohesiveZone);
    assert_eq!(bd.hypotheses().len(), 5);
    assert!(!bd.is_hypothesis_supported(Hypothesis::AxisymmetricalGeneralisedPlaneStrain));

    let bd = compile("@DSL DefaultFiniteStrain;\n@Behaviour Large;\n").expect("compiles");
    assert_eq!(bd.hypotheses(), &Hypothesis::all_set());

    let bd = compile("@DSL Default;\n@ModellingHypotheses {\".+\"};\n").expect("compiles");
    assert_eq!(bd.hypotheses(), &Hypothesis::all_set());
}

#[test]
fn specialisations() {
    let bd = compile(
        "@DSL Default;\n\
         @Behaviour Specialised;\n\
         @StateVariable real p;\n\
         @StateVariable<PlaneStress> real etozz;\n\
         @Epsilon<PlaneStress> 1.e-12;\n",
    )
    .expect("compiles");
    assert!(bd.has_specialization(Hypothesis::PlaneStress));
    assert_eq!(names(&bd, Hypothesis::PlaneStress, VariableCategory::StateVariable), ["p", "etozz"]);
    assert_eq!(names(&bd, Hypothesis::PlaneStrain, VariableCategory::StateVariable), ["p"]);
    assert_eq!(bd.attribute::<f64>(Hypothesis::PlaneStress, "epsilon"), Ok(1.0e-12));
    assert!(matches!(
        bd.attribute::<f64>(Hypothesis::Tridimensional, "epsilon"),
        Err(bhvmodel::Error::UnknownAttribute { .. })
    ));

    let err = compile(
        "@DSL Default;\n\
         @StateVariable<PlaneStress> real etozz;\n\
         @ModellingHypothesis Tridimensional;\n",
    )
    .expect_err("specialised but not declared");
    assert!(matches!(
        err.root(),
        DslError::Model(bhvmodel::Error::SpecialisedHypothesisNotDeclared {
            hypothesis: Hypothesis::PlaneStress
        })
    ));
}

#[test]
fn metadata_and_attributes() {
    let bd = compile(
        "@Parser Default;\n\
         @Material Steel;\n\
         @Behaviour Plasticity;\n\
         @Library Lib;\n\
         @Author John Doe;\n\
         @Date 2024;\n\
         @Description { A plastic behaviour. }\n\
         @UseQt true;\n\
         @StrainMeasure Hencky;\n",
    )
    .expect("compiles");
    let metadata = bd.metadata();
    assert_eq!(metadata.dsl.as_deref(), Some("Default"));
    assert_eq!(metadata.author.as_deref(), Some("John Doe"));
    assert_eq!(metadata.library.as_deref(), Some("Lib"));
    assert_eq!(metadata.description.as_deref(), Some("A plastic behaviour."));
    assert_eq!(bd.class_name().as_deref(), Some("Steel_Plasticity"));
    assert_eq!(bd.behaviour_attributes().get::<bool>("use_qt"), Ok(true));
    assert_eq!(bd.behaviour_attributes().get::<String>("strain_measure"), Ok("Hencky".to_string()));

    let err = compile("@DSL Default;\n@StrainMeasure Almansi;\n").expect_err("unknown measure");
    assert!(matches!(err.root(), DslError::InvalidValue { what: "strain measure", .. }));
    assert_eq!(err.kind(), ErrorKind::Syntax);

    let err = compile("@DSL Default;\n@Behaviour A;\n@Behaviour B;\n").expect_err("renamed");
    assert_eq!(err.kind(), ErrorKind::DuplicateDeclaration);
}

#[test]
fn every_hypothesis_restriction() {
    let bd = compile(
        "@DSL Default;\n\
         @StateVariable<\".+\", PlaneStrain> real p;\n\
         @LocalVariable<PlaneStrain, \".+\"> real q;\n",
    )
    .expect("compiles");
    assert!(!bd.has_specialization(Hypothesis::PlaneStrain));
    assert_eq!(names(&bd, Hypothesis::PlaneStrain, VariableCategory::StateVariable), ["p"]);
    assert_eq!(names(&bd, Hypothesis::Tridimensional, VariableCategory::LocalVariable), ["q"]);

    let err = compile("@DSL Default;\n@StateVariable<\".+\", Undefined> real p;\n").expect_err("Undefined");
    assert!(matches!(
        err.root(),
        DslError::Model(bhvmodel::Error::UnknownHypothesis { name }) if name == "Undefined"
    ));
}
