use strum::{Display, EnumIs};
use thiserror::Error;

use crate::{
    attribute::AttributeKind,
    bounds::BoundsKind,
    description::{BehaviourType, Symmetry},
    hypothesis::Hypothesis,
};

/// Coarse classification of every error raised while building a description.
///
/// All of them are fatal: a compilation either fully succeeds or fully fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum ErrorKind {
    /// Malformed token sequence.
    Syntax,
    /// Something was declared more than once.
    DuplicateDeclaration,
    /// Hypothesis, symmetry or typing invariants violated.
    Consistency,
    /// A keyword nobody claims.
    UnknownKeyword,
}

#[derive(Debug, Clone, PartialEq, EnumIs, Error)]
pub enum Error {
    /// The name is already reserved or used by a variable.
    #[error("The name `{name}` is already reserved.")]
    NameAlreadyReserved { name: String },

    /// A variable with the same name already exists in the behaviour data.
    #[error("The variable `{name}` has already been declared.")]
    VariableAlreadyDeclared { name: String },

    /// The glossary name is already carried by another variable.
    #[error(
        "The glossary name `{glossary_name}` can not be given to `{variable}`: it is already used by `{owner}`."
    )]
    GlossaryNameAlreadyUsed {
        glossary_name: String,
        variable: String,
        owner: String,
    },

    /// The entry name is already carried by another variable.
    #[error(
        "The entry name `{entry_name}` can not be given to `{variable}`: it is already used by `{owner}`."
    )]
    EntryNameAlreadyUsed {
        entry_name: String,
        variable: String,
        owner: String,
    },

    /// A variable already has a glossary or an entry name.
    #[error("The variable `{variable}` already has an external name (`{external_name}`).")]
    ExternalNameAlreadyDefined {
        variable: String,
        external_name: String,
    },

    /// Not an entry of the glossary.
    #[error("`{name}` is not a glossary name.")]
    UnknownGlossaryName { name: String },

    /// Entry names must not shadow glossary names.
    #[error("`{name}` is a glossary name and can not be used as an entry name. Use a glossary name instead.")]
    EntryNameIsGlossaryName { name: String },

    /// The identifier is not a valid variable name.
    #[error("`{name}` is not a valid variable name.")]
    InvalidVariableName { name: String },

    /// Arrays must have at least one element.
    #[error("Invalid array size for variable `{name}`: the size must be strictly positive.")]
    InvalidArraySize { name: String },

    /// The variable is not declared in the behaviour data.
    #[error("No variable named `{name}` has been declared.")]
    UnknownVariable { name: String },

    /// The variable is declared in another category than expected.
    #[error("The variable `{name}` is not a {expected}.")]
    UnexpectedVariableCategory { name: String, expected: String },

    /// The named attribute was declared before.
    #[error("The attribute `{name}` has already been declared.")]
    AttributeAlreadyDeclared { name: String },

    /// The named attribute exists with another value kind.
    #[error("The attribute `{name}` holds a value of kind `{found}`, not `{expected}`.")]
    AttributeKindMismatch {
        name: String,
        expected: AttributeKind,
        found: AttributeKind,
    },

    /// No attribute with that name.
    #[error("No attribute named `{name}` has been declared.")]
    UnknownAttribute { name: String },

    /// The code block already exists and the insertion mode forbids overwriting it.
    #[error("The code block `{name}` has already been declared.")]
    CodeBlockAlreadyDeclared { name: String },

    /// No code block with that name.
    #[error("No code block named `{name}` has been declared.")]
    UnknownCodeBlock { name: String },

    /// Bounds of a given kind were already given to a variable.
    #[error("The {kind} of variable `{variable}` have already been declared.")]
    BoundsAlreadyDeclared { variable: String, kind: BoundsKind },

    /// The lower bound is greater than the upper bound.
    #[error("Invalid bounds for variable `{variable}`: the lower bound {lower} is greater than the upper bound {upper}.")]
    InvalidBounds {
        variable: String,
        lower: f64,
        upper: f64,
    },

    /// A parameter already has its default value.
    #[error("The default value of parameter `{name}` has already been declared.")]
    ParameterDefaultAlreadyDeclared { name: String },

    /// The number of default values does not match the array size of a parameter.
    #[error("Parameter `{name}` expects {expected} default value(s), got {found}.")]
    ParameterDefaultArity {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A parameter was never given a default value.
    #[error("No default value has been given to parameter `{name}`.")]
    MissingParameterDefault { name: String },

    /// The name does not denote a modelling hypothesis.
    #[error("`{name}` is not a modelling hypothesis.")]
    UnknownHypothesis { name: String },

    /// The supported modelling hypotheses can only be declared once.
    #[error("The supported modelling hypotheses have already been declared.")]
    HypothesesAlreadyDeclared,

    /// The supported modelling hypotheses were never declared.
    #[error("The supported modelling hypotheses have not been declared yet.")]
    HypothesesNotDeclared,

    /// An empty set of hypotheses was given.
    #[error("An empty set of modelling hypotheses was given.")]
    EmptyHypotheses,

    /// Narrowing the declared hypotheses by the candidate set left nothing.
    #[error("None of the given modelling hypotheses is supported (candidates: {candidates:?}).")]
    EmptyHypothesesIntersection { candidates: Vec<Hypothesis> },

    /// `Undefined` is not a member of a set of declared hypotheses.
    #[error("The `Undefined` hypothesis can not be declared as a supported modelling hypothesis.")]
    UndefinedHypothesisDeclared,

    /// A specialisation exists for a hypothesis absent from the declared set.
    #[error(
        "A specialisation for the modelling hypothesis `{hypothesis}` has been defined, but this hypothesis is not part of the supported ones."
    )]
    SpecialisedHypothesisNotDeclared { hypothesis: Hypothesis },

    /// A hypothesis was looked up before the declaration and is missing from it.
    #[error(
        "The modelling hypothesis `{hypothesis}` has been used before the supported hypotheses were declared, and is not part of them."
    )]
    RequestedHypothesisNotDeclared { hypothesis: Hypothesis },

    /// The hypothesis is not part of the declared hypotheses.
    #[error("The modelling hypothesis `{hypothesis}` is not supported by this behaviour.")]
    UnsupportedHypothesis { hypothesis: Hypothesis },

    /// The main variables were already declared.
    #[error("The main variables of the behaviour have already been declared.")]
    MainVariablesAlreadyDeclared,

    /// A driving variable is declared twice.
    #[error("The driving variable `{name}` has already been declared.")]
    DuplicateMainVariable { name: String },

    /// The operation requires another kind of behaviour.
    #[error("This operation requires a behaviour of type `{expected}`, this one is of type `{found}`.")]
    BehaviourTypeMismatch {
        expected: BehaviourType,
        found: BehaviourType,
    },

    /// No `@DSL` (or equivalent) declared the kind of behaviour.
    #[error("The kind of behaviour (and its main variables) has not been declared.")]
    MissingBehaviourType,

    /// Symmetry can only be set once.
    #[error("The symmetry of the behaviour has already been declared.")]
    SymmetryAlreadyDeclared,

    /// Elastic symmetry can only be set once.
    #[error("The elastic symmetry of the behaviour has already been declared.")]
    ElasticSymmetryAlreadyDeclared,

    /// An isotropic behaviour can not have an orthotropic elasticity.
    #[error("An isotropic behaviour can not have an orthotropic elastic symmetry.")]
    OrthotropicElasticityOfIsotropicBehaviour,

    /// The symmetry conflicts with the thermal expansion already declared.
    #[error("The symmetry `{symmetry}` is incompatible with the {count} thermal expansion coefficient(s) already declared.")]
    SymmetryConflictsWithThermalExpansion { symmetry: Symmetry, count: usize },

    /// Thermal expansion can only be set once.
    #[error("The thermal expansion coefficients have already been declared.")]
    ThermalExpansionAlreadyDeclared,

    /// Wrong number of thermal expansion coefficients for the symmetry.
    #[error("A {symmetry} behaviour expects {expected} thermal expansion coefficient(s), got {found}.")]
    ThermalExpansionArity {
        symmetry: Symmetry,
        expected: usize,
        found: usize,
    },

    /// A thermal expansion coefficient depends on something else than the temperature.
    #[error("Thermal expansion coefficients may only depend on the temperature, got {inputs:?}.")]
    ThermalExpansionInputs { inputs: Vec<String> },

    /// A description-wide property set twice (behaviour name, author, ...).
    #[error("The {what} has already been declared.")]
    AlreadyDeclared { what: &'static str },
}

impl Error {
    /// Where this error sits in the error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            NameAlreadyReserved { .. }
            | VariableAlreadyDeclared { .. }
            | GlossaryNameAlreadyUsed { .. }
            | EntryNameAlreadyUsed { .. }
            | ExternalNameAlreadyDefined { .. }
            | AttributeAlreadyDeclared { .. }
            | CodeBlockAlreadyDeclared { .. }
            | BoundsAlreadyDeclared { .. }
            | ParameterDefaultAlreadyDeclared { .. }
            | HypothesesAlreadyDeclared
            | MainVariablesAlreadyDeclared
            | DuplicateMainVariable { .. }
            | SymmetryAlreadyDeclared
            | ElasticSymmetryAlreadyDeclared
            | ThermalExpansionAlreadyDeclared
            | AlreadyDeclared { .. } => ErrorKind::DuplicateDeclaration,
            _ => ErrorKind::Consistency,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Returns `true` if `name` is usable as a variable name in generated code.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_valid_identifier("p"));
        assert!(is_valid_identifier("_tmp2"));
        assert!(!is_valid_identifier("2p"));
        assert!(!is_valid_identifier("a-b"));
        assert!(!is_valid_identifier(""));
    }
}
