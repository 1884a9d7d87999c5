// lib/src/lib.rs

pub mod classifier;
pub mod errors;
pub mod scoring;

pub use classifier::gradient_boosting::GradientBoostingModel;
pub use classifier::{BinaryClassifier, Label};
pub use errors::ModelError;
pub use scoring::{score_encounters, score_table, Scores};

#[cfg(test)]
pub(crate) const SAMPLE_ARTIFACT_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/readmission_model.json");
