// lib/src/scoring.rs

use log::debug;
use models::{Encounter, FeatureTable};
use serde::Serialize;

use crate::classifier::{BinaryClassifier, Label};
use crate::errors::ModelError;

/// Parallel per-record outputs: index `i` of both vectors belongs to input record `i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scores {
    pub predictions: Vec<Label>,
    pub probabilities: Vec<f64>,
}

impl Scores {
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

/// Scores a validated batch. An empty batch never reaches the model.
pub fn score_encounters(model: &dyn BinaryClassifier, encounters: &[Encounter]) -> Result<Scores, ModelError> {
    if encounters.is_empty() {
        return Ok(Scores::default());
    }
    score_table(model, &FeatureTable::from_encounters(encounters))
}

/// Runs both model operations and checks their shape. Any failure fails the whole batch.
pub fn score_table(model: &dyn BinaryClassifier, table: &FeatureTable) -> Result<Scores, ModelError> {
    let rows = table.len();

    let proba = model.predict_proba(table)?;
    ensure_length("probability rows", rows, proba.len())?;
    let probabilities: Vec<f64> = proba.into_iter().map(|[_, positive]| positive).collect();
    if let Some((row, &value)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || !(0.0..=1.0).contains(*p))
    {
        return Err(ModelError::InvalidProbability { row, value });
    }

    let predictions = model.predict(table)?;
    ensure_length("predictions", rows, predictions.len())?;

    debug!("Scored {} rows", rows);
    Ok(Scores { predictions, probabilities })
}

fn ensure_length(output: &'static str, expected: usize, found: usize) -> Result<(), ModelError> {
    if expected != found {
        return Err(ModelError::OutputLength { output, expected, found });
    }
    Ok(())
}
