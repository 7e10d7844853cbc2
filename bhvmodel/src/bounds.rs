//! Bounds on variables.
//!
//! Value bounds are checked on user inputs; physical bounds flag values that
//! make no physical sense. Both kinds are independent and each may be
//! half-open.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs};

use crate::utils::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundsKind {
    #[strum(to_string = "bounds")]
    Value,
    #[strum(to_string = "physical bounds")]
    Physical,
}

/// A closed interval, possibly unbounded on either side.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Bounds {
    /// Build bounds for `variable`, checking that `lower <= upper`.
    pub fn new(variable: &str, lower: Option<f64>, upper: Option<f64>) -> Result<Self> {
        if let (Some(l), Some(u)) = (lower, upper) {
            if l > u {
                return Err(Error::InvalidBounds {
                    variable: variable.to_string(),
                    lower: l,
                    upper: u,
                });
            }
        }
        Ok(Self { lower, upper })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower.is_none_or(|l| value >= l) && self.upper.is_none_or(|u| value <= u)
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.lower {
            Some(l) => write!(f, "[{l}:")?,
            None => write!(f, "]*:")?,
        }
        match self.upper {
            Some(u) => write!(f, "{u}]"),
            None => write!(f, "*["),
        }
    }
}

/// Both kinds of bounds of one variable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VariableBounds {
    pub value: Option<Bounds>,
    pub physical: Option<Bounds>,
}

impl VariableBounds {
    pub fn get(&self, kind: BoundsKind) -> Option<&Bounds> {
        match kind {
            BoundsKind::Value => self.value.as_ref(),
            BoundsKind::Physical => self.physical.as_ref(),
        }
    }

    pub(crate) fn slot(&mut self, kind: BoundsKind) -> &mut Option<Bounds> {
        match kind {
            BoundsKind::Value => &mut self.value,
            BoundsKind::Physical => &mut self.physical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_open_bounds() {
        let b = Bounds::new("p", Some(0.), None).unwrap();
        assert!(b.contains(12.));
        assert!(!b.contains(-1.));
        assert_eq!(b.to_string(), "[0:*[");
    }

    #[test]
    fn reversed_bounds_are_rejected() {
        assert!(Bounds::new("p", Some(1.), Some(0.)).is_err());
    }
}
