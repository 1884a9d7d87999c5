// lib/src/classifier/artifact.rs

//! On-disk representation of a fitted gradient-boosted classifier.
//!
//! The artifact is a JSON document exported by the training pipeline. It carries the column
//! encoding (numeric passthrough or one-hot) next to the trees, so the service never has to
//! guess how the model saw its inputs.

use std::collections::HashSet;

use log::warn;
use models::{FeatureColumn, FeatureValue, ValueType};
use serde::{Deserialize, Serialize};

use crate::classifier::Label;
use crate::errors::ModelError;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub classes: [Label; 2],
    pub features: Vec<FeatureSpec>,
    pub init_score: f64,
    pub learning_rate: f64,
    pub trees: Vec<TreeSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "encoding", rename_all = "snake_case")]
pub enum FeatureSpec {
    Numeric {
        name: String,
    },
    OneHot {
        name: String,
        categories: Vec<FeatureValue>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
}

impl FeatureSpec {
    pub fn name(&self) -> &str {
        match self {
            FeatureSpec::Numeric { name } | FeatureSpec::OneHot { name, .. } => name,
        }
    }

    /// Number of encoded columns this feature expands to.
    pub fn width(&self) -> usize {
        match self {
            FeatureSpec::Numeric { .. } => 1,
            FeatureSpec::OneHot { categories, .. } => categories.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<NodeSpec>,
}

/// A split sends `x[feature] <= threshold` to `left`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl ModelArtifact {
    pub fn encoded_width(&self) -> usize {
        self.features.iter().map(FeatureSpec::width).sum()
    }

    /// Checks everything scoring later relies on: the column schema, category lists,
    /// and tree structure. Child indices must point forward, which rules out cycles.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ModelError::InvalidArtifact(format!(
                "unsupported format_version {} (expected {})",
                self.format_version, FORMAT_VERSION
            )));
        }
        if self.classes[0] == self.classes[1] {
            return Err(ModelError::InvalidArtifact(format!(
                "classes must be two distinct labels, got {:?}",
                self.classes
            )));
        }
        if !self.init_score.is_finite() || !self.learning_rate.is_finite() {
            return Err(ModelError::InvalidArtifact(
                "init_score and learning_rate must be finite".to_string(),
            ));
        }

        self.validate_schema()?;
        for spec in &self.features {
            if let FeatureSpec::OneHot { name, categories, .. } = spec {
                validate_categories(name, categories)?;
            }
        }

        let width = self.encoded_width();
        for (index, tree) in self.trees.iter().enumerate() {
            validate_tree(index, tree, width)?;
        }
        Ok(())
    }

    fn validate_schema(&self) -> Result<(), ModelError> {
        let expected = FeatureColumn::names();
        let positions = expected.len().max(self.features.len());
        for position in 0..positions {
            let expected_name = expected.get(position).copied();
            let found_name = self.features.get(position).map(FeatureSpec::name);
            if expected_name != found_name {
                return Err(ModelError::SchemaMismatch {
                    position,
                    expected: expected_name.unwrap_or("<none>").to_string(),
                    found: found_name.unwrap_or("<none>").to_string(),
                });
            }
        }

        for (column, spec) in FeatureColumn::ALL.iter().zip(&self.features) {
            match spec {
                FeatureSpec::Numeric { .. } if column.value_type() == ValueType::Text => {
                    return Err(ModelError::InvalidArtifact(format!(
                        "column '{}' holds text and cannot use numeric encoding",
                        column
                    )));
                }
                FeatureSpec::OneHot { categories, handle_unknown: HandleUnknown::Error, .. }
                    if column.is_optional() && !categories.contains(&FeatureValue::Missing) =>
                {
                    warn!(
                        "Column '{}' may be omitted by clients but the artifact has no null category; such requests will fail scoring",
                        column
                    );
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn validate_categories(name: &str, categories: &[FeatureValue]) -> Result<(), ModelError> {
    if categories.is_empty() {
        return Err(ModelError::InvalidArtifact(format!(
            "one_hot feature '{}' has no categories",
            name
        )));
    }
    let mut seen = HashSet::new();
    for category in categories {
        if !seen.insert(category) {
            return Err(ModelError::InvalidArtifact(format!(
                "one_hot feature '{}' lists category {} twice",
                name, category
            )));
        }
    }
    Ok(())
}

fn validate_tree(index: usize, tree: &TreeSpec, width: usize) -> Result<(), ModelError> {
    let invalid = |reason: String| ModelError::InvalidArtifact(format!("tree {}: {}", index, reason));

    if tree.nodes.is_empty() {
        return Err(invalid("has no nodes".to_string()));
    }
    let len = tree.nodes.len();
    for (position, node) in tree.nodes.iter().enumerate() {
        match *node {
            NodeSpec::Split { feature, threshold, left, right } => {
                if feature >= width {
                    return Err(invalid(format!(
                        "node {} splits on feature {} but the encoded width is {}",
                        position, feature, width
                    )));
                }
                if threshold.is_nan() {
                    return Err(invalid(format!("node {} has a NaN threshold", position)));
                }
                for child in [left, right] {
                    if child <= position || child >= len {
                        return Err(invalid(format!(
                            "node {} points to child {} outside ({}, {})",
                            position, child, position, len
                        )));
                    }
                }
            }
            NodeSpec::Leaf { value } => {
                if !value.is_finite() {
                    return Err(invalid(format!("leaf {} has non-finite value", position)));
                }
            }
        }
    }
    Ok(())
}
