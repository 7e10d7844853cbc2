use std::sync::Arc;

use bhvdsl::{
    BehaviourDsl, DslConfig, DslContext, DslError, DslResult, compile_str,
    dsl::standard_keywords,
    interface::{BehaviourInterface, InterfaceFactory},
    keywords::KeywordRegistry,
    token::{Cursor, TokenReader},
};
use bhvmodel::{BehaviourDescription, ErrorKind, attribute::AttributeValue};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Claims `@Custom` and reads everything up to `;`.
struct Claiming {
    name: &'static str,
}

impl BehaviourInterface for Claiming {
    fn name(&self) -> &str {
        self.name
    }

    fn treat_keyword(
        &mut self,
        description: &mut BehaviourDescription,
        keyword: &str,
        mut reader: TokenReader<'_>,
    ) -> DslResult<Option<Cursor>> {
        if keyword != "@Custom" {
            return Ok(None);
        }
        reader.read_until_semicolon()?;
        description.set_behaviour_attribute(&format!("{}::custom", self.name), AttributeValue::Bool(true), true)?;
        Ok(Some(reader.cursor()))
    }
}

/// Claims `@Custom` but only reads one token.
struct Greedy;

impl BehaviourInterface for Greedy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn treat_keyword(
        &mut self,
        _: &mut BehaviourDescription,
        keyword: &str,
        mut reader: TokenReader<'_>,
    ) -> DslResult<Option<Cursor>> {
        if keyword != "@Custom" {
            return Ok(None);
        }
        reader.next()?;
        Ok(Some(reader.cursor()))
    }
}

/// Claims nothing.
struct Silent;

impl BehaviourInterface for Silent {
    fn name(&self) -> &str {
        "ifaceX"
    }

    fn treat_keyword(
        &mut self,
        _: &mut BehaviourDescription,
        _: &str,
        _: TokenReader<'_>,
    ) -> DslResult<Option<Cursor>> {
        Ok(None)
    }
}

fn factory() -> InterfaceFactory {
    let mut factory = InterfaceFactory::standard();
    factory.register("ifaceX", || Box::new(Silent) as Box<dyn BehaviourInterface>);
    factory.register("ifaceY", || Box::new(Claiming { name: "ifaceY" }) as Box<dyn BehaviourInterface>);
    factory.register("ifaceZ", || Box::new(Claiming { name: "ifaceZ" }) as Box<dyn BehaviourInterface>);
    factory.register("greedy", || Box::new(Greedy) as Box<dyn BehaviourInterface>);
    factory
}

fn context_with(keywords: KeywordRegistry, config: DslConfig) -> Arc<DslContext> {
    DslContext::new(keywords, factory(), config)
}

fn context() -> Arc<DslContext> {
    context_with(standard_keywords().expect("standard keywords"), DslConfig::default())
}

const HEADER: &str = "@DSL Default;\n@Behaviour Test;\n";

#[test]
fn keyword_restricted_to_an_interface_that_does_not_treat_it() {
    init_logger();
    let src = format!("{HEADER}@Custom[ifaceX] 1;\n");
    let err = compile_str(&context(), &src, None).expect_err("ifaceX ignores @Custom");
    match err.root() {
        DslError::KeywordNotTreatedByInterface { keyword, interface } => {
            assert_eq!(keyword, "@Custom");
            assert_eq!(interface, "ifaceX");
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(err.kind(), ErrorKind::Consistency);
    assert_eq!(err.line(), Some(3));
    assert!(
        err.to_string()
            .contains("keyword `@Custom` is not treated by interface `ifaceX`")
    );
}

#[test]
fn keyword_restricted_to_the_interface_that_treats_it() {
    let src = format!("{HEADER}@Custom[ifaceY] 1 2 3;\n@UseQt true;\n");
    let bd = compile_str(&context(), &src, None).expect("compiles");
    assert_eq!(bd.behaviour_attributes().get::<bool>("ifaceY::custom"), Ok(true));
    assert_eq!(bd.behaviour_attributes().get::<bool>("use_qt"), Ok(true));
}

#[test]
fn interfaces_claiming_a_keyword_must_agree() {
    let src = format!("{HEADER}@Interface ifaceY, ifaceZ;\n@Custom a b;\n");
    let bd = compile_str(&context(), &src, None).expect("both interfaces agree");
    assert!(bd.behaviour_attributes().contains("ifaceY::custom"));
    assert!(bd.behaviour_attributes().contains("ifaceZ::custom"));

    let src = format!("{HEADER}@Interface ifaceY, greedy;\n@Custom a b;\n");
    let err = compile_str(&context(), &src, None).expect_err("ambiguous");
    assert!(matches!(err.root(), DslError::AmbiguousKeyword { .. }));
}

#[test]
fn unknown_keywords() {
    let src = format!("{HEADER}@NotAKeyword 12;\n");
    let err = compile_str(&context(), &src, None).expect_err("unknown");
    assert_eq!(err.kind(), ErrorKind::UnknownKeyword);

    let config = DslConfig {
        ignored_keywords: ["@NotAKeyword".to_string()].into(),
        ..Default::default()
    };
    let context = context_with(standard_keywords().expect("keywords"), config);
    let src = format!("@NotAKeyword {{ a; {{ b; }} }} c;\n{HEADER}");
    let bd = compile_str(&context, &src, None).expect("ignored");
    assert_eq!(bd.metadata().behaviour.as_deref(), Some("Test"));
}

#[test]
fn unknown_interface() {
    let src = format!("{HEADER}@Interface nowhere;\n");
    let err = compile_str(&context(), &src, None).expect_err("unknown interface");
    assert!(matches!(err.root(), DslError::UnknownInterface { .. }));
}

fn rename_behaviour(dsl: &mut BehaviourDsl, reader: &mut TokenReader<'_>) -> DslResult<()> {
    let name = reader.read_identifier()?;
    reader.expect(";")?;
    dsl.description_mut().set_behaviour_name(&format!("{name}Renamed"))?;
    Ok(())
}

#[test]
fn registration_rules() {
    let mut keywords = standard_keywords().expect("keywords");
    assert!(matches!(
        keywords.register("@Behaviour", rename_behaviour, false),
        Err(DslError::KeywordAlreadyRegistered { .. })
    ));
    assert!(matches!(
        keywords.register("Behaviour", rename_behaviour, true),
        Err(DslError::InvalidKeywordName { .. })
    ));
    keywords
        .register("@Behaviour", rename_behaviour, true)
        .expect("override");
    keywords.alias("@Law", "@Behaviour").expect("alias");
    keywords.disable("@UseQt").expect("disable");
    assert!(keywords.disable("@UseQt").is_err());
    let context = context_with(keywords, DslConfig::default());

    let bd = compile_str(&context, "@DSL Default;\n@Law Norton;\n", None).expect("alias");
    assert_eq!(bd.metadata().behaviour.as_deref(), Some("NortonRenamed"));

    let err = compile_str(&context, "@DSL Default;\n@UseQt true;\n", None).expect_err("disabled");
    assert!(matches!(err.root(), DslError::UnknownKeyword { keyword } if keyword == "@UseQt"));
}

#[test]
fn standard_aliases() {
    let keywords = standard_keywords().expect("keywords");
    for name in ["@Parser", "@Coef", "@StateVar", "@AuxiliaryStateVar", "@ExternalStateVar"] {
        assert!(keywords.contains(name), "{name}");
    }
}

#[test]
fn handler_errors_name_the_keyword() {
    let err = compile_str(&context(), "@DSL Default;\n\n@Behaviour 12;\n", None).expect_err("not a name");
    match &err {
        DslError::InKeyword { keyword, line, .. } => {
            assert_eq!(keyword, "@Behaviour");
            assert_eq!(*line, 3);
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(err.kind().is_syntax());
}

#[test]
fn generic_interface() {
    let src = format!("{HEADER}@Interface generic;\n@GenerateMTestFileOnFailure true;\n");
    let bd = compile_str(&context(), &src, None).expect("compiles");
    assert_eq!(
        bd.behaviour_attributes()
            .get::<bool>("generic::generate_mtest_file_on_failure"),
        Ok(true)
    );

    let src = format!("{HEADER}@Interface generic;\n@StateVariable real mgis_bv;\n");
    let err = compile_str(&context(), &src, None).expect_err("reserved by the interface");
    assert!(matches!(err.root(), DslError::Model(bhvmodel::Error::NameAlreadyReserved { .. })));
}
