//! Semantic model of mechanical behaviour descriptions.
//!
//! The entry point is [`description::BehaviourDescription`], which keeps the
//! data of a behaviour per modelling hypothesis.
pub mod attribute;
pub mod bounds;
pub mod code;
pub mod data;
pub mod description;
pub mod glossary;
pub mod hypothesis;
pub mod material_property;
pub mod utils;
pub mod variable;

pub use description::BehaviourDescription;
pub use hypothesis::Hypothesis;
pub use utils::{Error, ErrorKind, Result};
