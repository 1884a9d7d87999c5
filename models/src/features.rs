// models/src/features.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::medical::encounter::Encounter;

/// Declared wire type of a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Text,
    Integer,
}

/// The model's input columns. `FeatureColumn::ALL` pins the order the model was trained on;
/// rows are always built from it, never from struct field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Race,
    Gender,
    Age,
    AdmissionTypeId,
    DischargeDispositionId,
    AdmissionSourceId,
    TimeInHospital,
    NumLabProcedures,
    NumProcedures,
    NumMedications,
    NumberOutpatient,
    NumberEmergency,
    NumberInpatient,
    NumberDiagnoses,
    A1cResult,
    MaxGluSerum,
    Change,
    DiabetesMed,
    Insulin,
}

impl FeatureColumn {
    pub const COUNT: usize = 19;

    pub const ALL: [FeatureColumn; FeatureColumn::COUNT] = [
        FeatureColumn::Race,
        FeatureColumn::Gender,
        FeatureColumn::Age,
        FeatureColumn::AdmissionTypeId,
        FeatureColumn::DischargeDispositionId,
        FeatureColumn::AdmissionSourceId,
        FeatureColumn::TimeInHospital,
        FeatureColumn::NumLabProcedures,
        FeatureColumn::NumProcedures,
        FeatureColumn::NumMedications,
        FeatureColumn::NumberOutpatient,
        FeatureColumn::NumberEmergency,
        FeatureColumn::NumberInpatient,
        FeatureColumn::NumberDiagnoses,
        FeatureColumn::A1cResult,
        FeatureColumn::MaxGluSerum,
        FeatureColumn::Change,
        FeatureColumn::DiabetesMed,
        FeatureColumn::Insulin,
    ];

    /// JSON field name, which is also the column name the model artifact uses.
    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Race => "race",
            FeatureColumn::Gender => "gender",
            FeatureColumn::Age => "age",
            FeatureColumn::AdmissionTypeId => "admission_type_id",
            FeatureColumn::DischargeDispositionId => "discharge_disposition_id",
            FeatureColumn::AdmissionSourceId => "admission_source_id",
            FeatureColumn::TimeInHospital => "time_in_hospital",
            FeatureColumn::NumLabProcedures => "num_lab_procedures",
            FeatureColumn::NumProcedures => "num_procedures",
            FeatureColumn::NumMedications => "num_medications",
            FeatureColumn::NumberOutpatient => "number_outpatient",
            FeatureColumn::NumberEmergency => "number_emergency",
            FeatureColumn::NumberInpatient => "number_inpatient",
            FeatureColumn::NumberDiagnoses => "number_diagnoses",
            FeatureColumn::A1cResult => "A1Cresult",
            FeatureColumn::MaxGluSerum => "max_glu_serum",
            FeatureColumn::Change => "change",
            FeatureColumn::DiabetesMed => "diabetesMed",
            FeatureColumn::Insulin => "insulin",
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            FeatureColumn::Race
            | FeatureColumn::Gender
            | FeatureColumn::Age
            | FeatureColumn::A1cResult
            | FeatureColumn::MaxGluSerum
            | FeatureColumn::Change
            | FeatureColumn::DiabetesMed
            | FeatureColumn::Insulin => ValueType::Text,
            _ => ValueType::Integer,
        }
    }

    /// Only the two lab-result columns may be absent.
    pub fn is_optional(self) -> bool {
        matches!(self, FeatureColumn::A1cResult | FeatureColumn::MaxGluSerum)
    }

    pub fn names() -> Vec<&'static str> {
        FeatureColumn::ALL.iter().map(|column| column.name()).collect()
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell of the feature table. `Missing` serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Integer(i64),
    Text(String),
    Missing,
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Integer(value) => write!(f, "{}", value),
            FeatureValue::Text(value) => write!(f, "'{}'", value),
            FeatureValue::Missing => f.write_str("null"),
        }
    }
}

impl From<Option<String>> for FeatureValue {
    fn from(value: Option<String>) -> Self {
        value.map(FeatureValue::Text).unwrap_or(FeatureValue::Missing)
    }
}

/// Column names plus one row per record, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<FeatureValue>>,
}

impl FeatureTable {
    pub fn from_encounters(encounters: &[Encounter]) -> Self {
        FeatureTable {
            columns: FeatureColumn::names().into_iter().map(str::to_string).collect(),
            rows: encounters.iter().map(Encounter::feature_row).collect(),
        }
    }

    /// Builds a table with arbitrary columns. Rows are not checked against the column count;
    /// consumers report the mismatch when they score.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Vec<FeatureValue>>) -> Self {
        FeatureTable { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<FeatureValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn should_have_unique_column_names() {
        let names: HashSet<_> = FeatureColumn::names().into_iter().collect();
        assert_eq!(names.len(), FeatureColumn::COUNT);
    }

    #[test]
    fn should_pin_column_order() {
        let names = FeatureColumn::names();
        assert_eq!(names.first(), Some(&"race"));
        assert_eq!(names[3], "admission_type_id");
        assert_eq!(names[14], "A1Cresult");
        assert_eq!(names.last(), Some(&"insulin"));
    }

    #[test]
    fn should_mark_only_lab_results_optional() {
        let optional: Vec<_> = FeatureColumn::ALL
            .iter()
            .filter(|column| column.is_optional())
            .map(|column| column.name())
            .collect();
        assert_eq!(optional, vec!["A1Cresult", "max_glu_serum"]);
    }

    #[test]
    fn should_round_trip_missing_as_null() {
        let value = serde_json::to_value(FeatureValue::Missing).unwrap();
        assert!(value.is_null());
        let back: FeatureValue = serde_json::from_value(serde_json::Value::Null).unwrap();
        assert_eq!(back, FeatureValue::Missing);
    }
}
