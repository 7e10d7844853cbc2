//! Glossary of standard external names.
//!
//! Downstream solvers know a variable by its external name. Glossary names are
//! shared across behaviours, so a variable given one of them is guaranteed to be
//! understood the same way everywhere.
use phf::phf_set;

/// External name of the temperature.
pub const TEMPERATURE: &str = "Temperature";

static GLOSSARY: phf::Set<&'static str> = phf_set! {
    "AxialStrain",
    "AxialStress",
    "BulkModulus",
    "CohesiveForce",
    "Damage",
    "DeformationGradient",
    "ElasticStrain",
    "EquivalentPlasticStrain",
    "EquivalentStrain",
    "EquivalentViscoplasticStrain",
    "HardeningSlope",
    "MassDensity",
    "NormalStiffness",
    "OpeningDisplacement",
    "PlasticStrain",
    "PoissonRatio",
    "Porosity",
    "ReferenceTemperature",
    "ShearModulus",
    "Strain",
    "Stress",
    "TangentialStiffness",
    "Temperature",
    "ThermalExpansion",
    "ViscoplasticStrain",
    "YieldStress",
    "YoungModulus",
};

/// Returns `true` if `name` is an entry of the glossary.
pub fn contains(name: &str) -> bool {
    GLOSSARY.contains(name)
}
