// lib/src/classifier/encoder.rs

use std::collections::HashMap;

use models::FeatureValue;

use crate::classifier::artifact::{FeatureSpec, HandleUnknown};
use crate::errors::ModelError;

/// Expands one table column into its slice of the encoded feature vector.
#[derive(Debug, Clone)]
pub enum ColumnEncoder {
    Numeric {
        column: String,
    },
    OneHot {
        column: String,
        positions: HashMap<FeatureValue, usize>,
        width: usize,
        handle_unknown: HandleUnknown,
    },
}

impl ColumnEncoder {
    pub fn from_spec(spec: &FeatureSpec) -> Self {
        match spec {
            FeatureSpec::Numeric { name } => ColumnEncoder::Numeric { column: name.clone() },
            FeatureSpec::OneHot { name, categories, handle_unknown } => ColumnEncoder::OneHot {
                column: name.clone(),
                positions: categories
                    .iter()
                    .enumerate()
                    .map(|(position, category)| (category.clone(), position))
                    .collect(),
                width: categories.len(),
                handle_unknown: *handle_unknown,
            },
        }
    }

    pub fn column(&self) -> &str {
        match self {
            ColumnEncoder::Numeric { column } | ColumnEncoder::OneHot { column, .. } => column,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            ColumnEncoder::Numeric { .. } => 1,
            ColumnEncoder::OneHot { width, .. } => *width,
        }
    }

    pub fn encode_into(&self, value: &FeatureValue, out: &mut Vec<f64>) -> Result<(), ModelError> {
        match self {
            ColumnEncoder::Numeric { column } => match value {
                FeatureValue::Integer(number) => {
                    out.push(*number as f64);
                    Ok(())
                }
                other => Err(ModelError::NonNumeric {
                    column: column.clone(),
                    value: other.to_string(),
                }),
            },
            ColumnEncoder::OneHot { column, positions, width, handle_unknown } => {
                let start = out.len();
                out.resize(start + width, 0.0);
                match (positions.get(value), handle_unknown) {
                    (Some(&position), _) => {
                        out[start + position] = 1.0;
                        Ok(())
                    }
                    (None, HandleUnknown::Ignore) => Ok(()),
                    (None, HandleUnknown::Error) => Err(ModelError::UnknownCategory {
                        column: column.clone(),
                        value: value.to_string(),
                    }),
                }
            }
        }
    }
}
