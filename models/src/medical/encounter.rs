use serde::{Deserialize, Serialize};

use crate::features::{FeatureColumn, FeatureValue};

/// A single hospital encounter submitted for readmission scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub race: String,
    pub gender: String,
    pub age: String,
    pub admission_type_id: i64,
    pub discharge_disposition_id: i64,
    pub admission_source_id: i64,
    pub time_in_hospital: i64,
    pub num_lab_procedures: i64,
    pub num_procedures: i64,
    pub num_medications: i64,
    pub number_outpatient: i64,
    pub number_emergency: i64,
    pub number_inpatient: i64,
    pub number_diagnoses: i64,
    #[serde(rename = "A1Cresult", default)]
    pub a1c_result: Option<String>,
    #[serde(default)]
    pub max_glu_serum: Option<String>,
    pub change: String,
    #[serde(rename = "diabetesMed")]
    pub diabetes_med: String,
    pub insulin: String,
}

impl Encounter {
    pub fn value(&self, column: FeatureColumn) -> FeatureValue {
        match column {
            FeatureColumn::Race => FeatureValue::Text(self.race.clone()),
            FeatureColumn::Gender => FeatureValue::Text(self.gender.clone()),
            FeatureColumn::Age => FeatureValue::Text(self.age.clone()),
            FeatureColumn::AdmissionTypeId => FeatureValue::Integer(self.admission_type_id),
            FeatureColumn::DischargeDispositionId => FeatureValue::Integer(self.discharge_disposition_id),
            FeatureColumn::AdmissionSourceId => FeatureValue::Integer(self.admission_source_id),
            FeatureColumn::TimeInHospital => FeatureValue::Integer(self.time_in_hospital),
            FeatureColumn::NumLabProcedures => FeatureValue::Integer(self.num_lab_procedures),
            FeatureColumn::NumProcedures => FeatureValue::Integer(self.num_procedures),
            FeatureColumn::NumMedications => FeatureValue::Integer(self.num_medications),
            FeatureColumn::NumberOutpatient => FeatureValue::Integer(self.number_outpatient),
            FeatureColumn::NumberEmergency => FeatureValue::Integer(self.number_emergency),
            FeatureColumn::NumberInpatient => FeatureValue::Integer(self.number_inpatient),
            FeatureColumn::NumberDiagnoses => FeatureValue::Integer(self.number_diagnoses),
            FeatureColumn::A1cResult => self.a1c_result.clone().into(),
            FeatureColumn::MaxGluSerum => self.max_glu_serum.clone().into(),
            FeatureColumn::Change => FeatureValue::Text(self.change.clone()),
            FeatureColumn::DiabetesMed => FeatureValue::Text(self.diabetes_med.clone()),
            FeatureColumn::Insulin => FeatureValue::Text(self.insulin.clone()),
        }
    }

    /// One model input row, ordered by `FeatureColumn::ALL`.
    pub fn feature_row(&self) -> Vec<FeatureValue> {
        FeatureColumn::ALL.iter().map(|&column| self.value(column)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encounter() -> Encounter {
        Encounter {
            race: "Caucasian".to_string(),
            gender: "Female".to_string(),
            age: "[70-80)".to_string(),
            admission_type_id: 1,
            discharge_disposition_id: 3,
            admission_source_id: 7,
            time_in_hospital: 5,
            num_lab_procedures: 44,
            num_procedures: 1,
            num_medications: 16,
            number_outpatient: 0,
            number_emergency: 0,
            number_inpatient: 2,
            number_diagnoses: 9,
            a1c_result: None,
            max_glu_serum: Some("Norm".to_string()),
            change: "Ch".to_string(),
            diabetes_med: "Yes".to_string(),
            insulin: "Steady".to_string(),
        }
    }

    #[test]
    fn should_build_row_in_column_order() {
        let row = encounter().feature_row();
        assert_eq!(row.len(), FeatureColumn::COUNT);
        assert_eq!(row[0], FeatureValue::Text("Caucasian".to_string()));
        assert_eq!(row[4], FeatureValue::Integer(3));
        assert_eq!(row[12], FeatureValue::Integer(2));
        assert_eq!(row[14], FeatureValue::Missing);
        assert_eq!(row[15], FeatureValue::Text("Norm".to_string()));
        assert_eq!(row[17], FeatureValue::Text("Yes".to_string()));
    }

    #[test]
    fn should_match_value_types() {
        let encounter = encounter();
        for column in FeatureColumn::ALL {
            let value = encounter.value(column);
            match column.value_type() {
                crate::ValueType::Integer => assert!(matches!(value, FeatureValue::Integer(_)), "{}", column),
                crate::ValueType::Text => assert!(
                    matches!(value, FeatureValue::Text(_) | FeatureValue::Missing),
                    "{}",
                    column
                ),
            }
        }
    }

    #[test]
    fn should_serialize_wire_field_names() {
        let value = serde_json::to_value(encounter()).unwrap();
        assert!(value.get("A1Cresult").is_some());
        assert_eq!(value["diabetesMed"], "Yes");
        assert!(value.get("diabetes_med").is_none());
    }
}
