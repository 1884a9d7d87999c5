// lib/src/classifier/mod.rs

pub mod artifact;
pub mod encoder;
pub mod gradient_boosting;

use models::FeatureTable;

use crate::errors::ModelError;

/// Class label as stored in the artifact (0 = not readmitted, 1 = readmitted for the sample model).
pub type Label = i64;

/// A fitted binary classifier. Implementations are immutable after construction and shared
/// across request handlers, hence `Send + Sync`.
pub trait BinaryClassifier: Send + Sync {
    /// One hard label per row, in row order.
    fn predict(&self, table: &FeatureTable) -> Result<Vec<Label>, ModelError>;

    /// One `[negative, positive]` probability pair per row, in row order.
    fn predict_proba(&self, table: &FeatureTable) -> Result<Vec<[f64; 2]>, ModelError>;

    /// The `[negative, positive]` label set.
    fn classes(&self) -> [Label; 2];
}
