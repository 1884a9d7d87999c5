// lib/src/classifier/gradient_boosting.rs

use std::fs;
use std::path::Path;

use log::{debug, info};
use models::{FeatureTable, FeatureValue};

use crate::classifier::artifact::{ModelArtifact, NodeSpec, TreeSpec};
use crate::classifier::encoder::ColumnEncoder;
use crate::classifier::{BinaryClassifier, Label};
use crate::errors::ModelError;

/// Gradient-boosted binary tree ensemble with log-loss, i.e.
/// `p1 = sigmoid(init_score + learning_rate * sum(tree leaves))`.
#[derive(Debug, Clone)]
pub struct GradientBoostingModel {
    classes: [Label; 2],
    columns: Vec<String>,
    encoders: Vec<ColumnEncoder>,
    encoded_width: usize,
    init_score: f64,
    learning_rate: f64,
    trees: Vec<TreeSpec>,
}

impl GradientBoostingModel {
    /// Reads and validates the artifact at `path`. Called once at startup.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json_str(&json)?;
        info!(
            "Loaded model artifact from {} ({} trees, {} encoded features)",
            path.display(),
            model.trees.len(),
            model.encoded_width
        );
        Ok(model)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        Self::from_artifact(serde_json::from_str(json)?)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        artifact.validate()?;
        let encoders: Vec<ColumnEncoder> = artifact.features.iter().map(ColumnEncoder::from_spec).collect();
        Ok(GradientBoostingModel {
            classes: artifact.classes,
            columns: encoders.iter().map(|encoder| encoder.column().to_string()).collect(),
            encoded_width: encoders.iter().map(ColumnEncoder::width).sum(),
            encoders,
            init_score: artifact.init_score,
            learning_rate: artifact.learning_rate,
            trees: artifact.trees,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn encoded_width(&self) -> usize {
        self.encoded_width
    }

    fn check_columns(&self, table: &FeatureTable) -> Result<(), ModelError> {
        if table.columns() != self.columns.as_slice() {
            return Err(ModelError::ColumnMismatch {
                expected: self.columns.clone(),
                found: table.columns().to_vec(),
            });
        }
        Ok(())
    }

    fn encode_row(&self, index: usize, row: &[FeatureValue]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.encoders.len() {
            return Err(ModelError::RowWidth {
                row: index,
                expected: self.encoders.len(),
                found: row.len(),
            });
        }
        let mut encoded = Vec::with_capacity(self.encoded_width);
        for (encoder, value) in self.encoders.iter().zip(row) {
            encoder.encode_into(value, &mut encoded)?;
        }
        Ok(encoded)
    }

    fn raw_score(&self, encoded: &[f64]) -> f64 {
        let boosted: f64 = self.trees.iter().map(|tree| leaf_value(tree, encoded)).sum();
        self.init_score + self.learning_rate * boosted
    }

    fn raw_scores(&self, table: &FeatureTable) -> Result<Vec<f64>, ModelError> {
        self.check_columns(table)?;
        debug!("Scoring {} rows against {} trees", table.len(), self.trees.len());
        table
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let encoded = self.encode_row(index, row)?;
                Ok(self.raw_score(&encoded))
            })
            .collect()
    }
}

impl BinaryClassifier for GradientBoostingModel {
    /// A raw score of exactly zero goes to the positive class.
    fn predict(&self, table: &FeatureTable) -> Result<Vec<Label>, ModelError> {
        let [negative, positive] = self.classes;
        Ok(self
            .raw_scores(table)?
            .into_iter()
            .map(|raw| if raw >= 0.0 { positive } else { negative })
            .collect())
    }

    fn predict_proba(&self, table: &FeatureTable) -> Result<Vec<[f64; 2]>, ModelError> {
        Ok(self
            .raw_scores(table)?
            .into_iter()
            .map(sigmoid)
            .map(|p| [1.0 - p, p])
            .collect())
    }

    fn classes(&self) -> [Label; 2] {
        self.classes
    }
}

// Node indices were checked at load time to point strictly forward, so this terminates.
fn leaf_value(tree: &TreeSpec, encoded: &[f64]) -> f64 {
    let mut position = 0;
    loop {
        match tree.nodes[position] {
            NodeSpec::Leaf { value } => return value,
            NodeSpec::Split { feature, threshold, left, right } => {
                position = if encoded[feature] <= threshold { left } else { right };
            }
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
