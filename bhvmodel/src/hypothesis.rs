//! Modelling hypotheses
//!
//! A modelling hypothesis is a simplification of the full three-dimensional
//! kinematics (plane strain, axisymmetry, ...). A behaviour description keeps one
//! default data set, used by every hypothesis, and may specialise it for some of
//! them. [`Hypothesis::Undefined`] designates that default.
use std::{collections::BTreeSet, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::utils::{Error, Result};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    EnumIs,
    IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Hypothesis {
    /// One-dimensional axisymmetric generalised plane strain.
    AxisymmetricalGeneralisedPlaneStrain,
    /// One-dimensional axisymmetric generalised plane stress.
    AxisymmetricalGeneralisedPlaneStress,
    Axisymmetrical,
    PlaneStress,
    PlaneStrain,
    GeneralisedPlaneStrain,
    #[strum(to_string = "Tridimensional", serialize = "3D")]
    #[cfg_attr(feature = "serde", serde(alias = "3D"))]
    Tridimensional,
    /// Stands for every hypothesis that has not been specialised.
    Undefined,
}

impl Hypothesis {
    /// Parse a hypothesis from its name (`"3D"` is accepted for `Tridimensional`).
    ///
    /// `Undefined` is not a name users can give.
    pub fn parse(name: &str) -> Result<Self> {
        match Hypothesis::from_str(name) {
            Ok(h) if !h.is_undefined() => Ok(h),
            _ => Err(Error::UnknownHypothesis {
                name: name.to_string(),
            }),
        }
    }

    /// Every hypothesis but [`Hypothesis::Undefined`], in order.
    pub fn all() -> impl Iterator<Item = Hypothesis> {
        Hypothesis::iter().filter(|h| !h.is_undefined())
    }

    /// Same as [`Hypothesis::all`], collected into a set.
    pub fn all_set() -> BTreeSet<Hypothesis> {
        Hypothesis::all().collect()
    }

    /// Space dimension of the hypothesis, `None` for [`Hypothesis::Undefined`].
    pub fn space_dimension(self) -> Option<u8> {
        match self {
            Hypothesis::AxisymmetricalGeneralisedPlaneStrain
            | Hypothesis::AxisymmetricalGeneralisedPlaneStress => Some(1),
            Hypothesis::Axisymmetrical
            | Hypothesis::PlaneStress
            | Hypothesis::PlaneStrain
            | Hypothesis::GeneralisedPlaneStrain => Some(2),
            Hypothesis::Tridimensional => Some(3),
            Hypothesis::Undefined => None,
        }
    }

    /// Name of the hypothesis as written in behaviour files.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names_and_aliases() {
        assert_eq!(Hypothesis::parse("PlaneStrain"), Ok(Hypothesis::PlaneStrain));
        assert_eq!(Hypothesis::parse("3D"), Ok(Hypothesis::Tridimensional));
        assert_eq!(
            Hypothesis::parse("Tridimensional"),
            Ok(Hypothesis::Tridimensional)
        );
        assert!(Hypothesis::parse("PlainStrain").is_err());
        assert_eq!(
            Hypothesis::parse("Undefined"),
            Err(Error::UnknownHypothesis {
                name: "Undefined".to_string()
            })
        );
        assert_eq!(Hypothesis::Tridimensional.to_string(), "Tridimensional");
    }

    #[test]
    fn all_skips_undefined() {
        let all = Hypothesis::all_set();
        assert_eq!(all.len(), 7);
        assert!(!all.contains(&Hypothesis::Undefined));
        assert_eq!(Hypothesis::PlaneStress.space_dimension(), Some(2));
        assert_eq!(Hypothesis::Undefined.space_dimension(), None);
    }
}
