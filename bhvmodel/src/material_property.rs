//! Material properties used as coefficients of the behaviour (thermal
//! expansion, ...).
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MaterialProperty {
    Constant(f64),
    /// An analytic expression of some variables of the behaviour.
    Formula {
        expression: String,
        /// Names of the variables the expression depends on.
        inputs: Vec<String>,
    },
}

impl MaterialProperty {
    pub fn formula(expression: impl Into<String>, inputs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        MaterialProperty::Formula {
            expression: expression.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn inputs(&self) -> &[String] {
        match self {
            MaterialProperty::Constant(_) => &[],
            MaterialProperty::Formula { inputs, .. } => inputs,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, MaterialProperty::Constant(_))
    }
}

impl std::fmt::Display for MaterialProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialProperty::Constant(v) => write!(f, "{v}"),
            MaterialProperty::Formula { expression, .. } => write!(f, "{expression}"),
        }
    }
}
