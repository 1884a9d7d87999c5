// models/src/lib.rs

pub mod errors;
pub mod features;
pub mod medical;
pub mod validation;

pub use errors::{FieldError, Loc, ValidationErrors};
pub use features::{FeatureColumn, FeatureTable, FeatureValue, ValueType};
pub use medical::encounter::Encounter;
pub use validation::{validate_batch, validate_value};
