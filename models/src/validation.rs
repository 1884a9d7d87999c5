// models/src/validation.rs

//! Turns a raw request body into typed encounters.
//!
//! Coercion is deliberately shallow: integer columns take integers, integral floats and
//! numeric strings; text columns take strings and numbers. Values are never checked
//! against a vocabulary. Every error in the batch is collected and the batch fails as a whole.

use serde_json::{Map, Value};

use crate::errors::{FieldError, Loc, ValidationErrors};
use crate::features::FeatureColumn;
use crate::medical::encounter::Encounter;

const BODY: &str = "body";

/// Parses and validates a JSON request body holding an array of encounters.
pub fn validate_batch(body: &[u8]) -> Result<Vec<Encounter>, ValidationErrors> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        ValidationErrors::single(FieldError::json_decode(vec![BODY.into()], e.to_string()))
    })?;
    validate_value(&value)
}

/// Validates an already parsed JSON value.
pub fn validate_value(value: &Value) -> Result<Vec<Encounter>, ValidationErrors> {
    let items = value
        .as_array()
        .ok_or_else(|| ValidationErrors::single(FieldError::not_a_list(vec![BODY.into()])))?;

    let mut encounters = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match parse_encounter(index, item) {
            Ok(encounter) => encounters.push(encounter),
            Err(mut item_errors) => errors.append(&mut item_errors),
        }
    }

    if errors.is_empty() {
        Ok(encounters)
    } else {
        Err(ValidationErrors(errors))
    }
}

fn parse_encounter(index: usize, item: &Value) -> Result<Encounter, Vec<FieldError>> {
    let object = item
        .as_object()
        .ok_or_else(|| vec![FieldError::not_a_dict(vec![BODY.into(), index.into()])])?;

    let mut fields = FieldReader { object, index, errors: Vec::new() };
    let encounter = Encounter {
        race: fields.text(FeatureColumn::Race),
        gender: fields.text(FeatureColumn::Gender),
        age: fields.text(FeatureColumn::Age),
        admission_type_id: fields.integer(FeatureColumn::AdmissionTypeId),
        discharge_disposition_id: fields.integer(FeatureColumn::DischargeDispositionId),
        admission_source_id: fields.integer(FeatureColumn::AdmissionSourceId),
        time_in_hospital: fields.integer(FeatureColumn::TimeInHospital),
        num_lab_procedures: fields.integer(FeatureColumn::NumLabProcedures),
        num_procedures: fields.integer(FeatureColumn::NumProcedures),
        num_medications: fields.integer(FeatureColumn::NumMedications),
        number_outpatient: fields.integer(FeatureColumn::NumberOutpatient),
        number_emergency: fields.integer(FeatureColumn::NumberEmergency),
        number_inpatient: fields.integer(FeatureColumn::NumberInpatient),
        number_diagnoses: fields.integer(FeatureColumn::NumberDiagnoses),
        a1c_result: fields.optional_text(FeatureColumn::A1cResult),
        max_glu_serum: fields.optional_text(FeatureColumn::MaxGluSerum),
        change: fields.text(FeatureColumn::Change),
        diabetes_med: fields.text(FeatureColumn::DiabetesMed),
        insulin: fields.text(FeatureColumn::Insulin),
    };

    if fields.errors.is_empty() {
        Ok(encounter)
    } else {
        Err(fields.errors)
    }
}

// Reads one object field by field, recording failures instead of stopping at the first.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    index: usize,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    fn loc(&self, column: FeatureColumn) -> Vec<Loc> {
        vec![BODY.into(), self.index.into(), column.name().into()]
    }

    fn reject(&mut self, column: FeatureColumn, error: fn(Vec<Loc>) -> FieldError) {
        let loc = self.loc(column);
        self.errors.push(error(loc));
    }

    fn required(&mut self, column: FeatureColumn) -> Option<&'a Value> {
        let object: &'a Map<String, Value> = self.object;
        match object.get(column.name()) {
            None => {
                self.reject(column, FieldError::missing);
                None
            }
            Some(Value::Null) => {
                self.reject(column, FieldError::none_not_allowed);
                None
            }
            Some(value) => Some(value),
        }
    }

    fn text(&mut self, column: FeatureColumn) -> String {
        let Some(value) = self.required(column) else {
            return String::new();
        };
        coerce_text(value).unwrap_or_else(|| {
            self.reject(column, FieldError::not_a_str);
            String::new()
        })
    }

    fn optional_text(&mut self, column: FeatureColumn) -> Option<String> {
        let object: &'a Map<String, Value> = self.object;
        match object.get(column.name()) {
            None | Some(Value::Null) => None,
            Some(value) => {
                let text = coerce_text(value);
                if text.is_none() {
                    self.reject(column, FieldError::not_a_str);
                }
                text
            }
        }
    }

    fn integer(&mut self, column: FeatureColumn) -> i64 {
        let Some(value) = self.required(column) else {
            return 0;
        };
        coerce_integer(value).unwrap_or_else(|| {
            self.reject(column, FieldError::not_an_integer);
            0
        })
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        _ => None,
    }
}

// Booleans count as 0/1 and finite floats truncate toward zero. Values outside i64 are rejected.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .map(f64::trunc)
                .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "race": "AfricanAmerican",
            "gender": "Male",
            "age": "[60-70)",
            "admission_type_id": 1,
            "discharge_disposition_id": 1,
            "admission_source_id": 7,
            "time_in_hospital": 3,
            "num_lab_procedures": 41,
            "num_procedures": 0,
            "num_medications": 11,
            "number_outpatient": 0,
            "number_emergency": 0,
            "number_inpatient": 1,
            "number_diagnoses": 7,
            "change": "No",
            "diabetesMed": "Yes",
            "insulin": "Up"
        })
    }

    fn kinds(errors: &ValidationErrors) -> Vec<&'static str> {
        errors.errors().iter().map(|e| e.kind).collect()
    }

    #[test]
    fn should_accept_empty_batch() {
        let encounters = validate_batch(b"[]").unwrap();
        assert!(encounters.is_empty());
    }

    #[test]
    fn should_default_optional_fields_to_none() {
        let encounters = validate_value(&json!([record()])).unwrap();
        assert_eq!(encounters.len(), 1);
        assert_eq!(encounters[0].a1c_result, None);
        assert_eq!(encounters[0].max_glu_serum, None);
        assert_eq!(encounters[0].diabetes_med, "Yes");
    }

    #[test]
    fn should_treat_null_optional_as_absent() {
        let mut item = record();
        item["A1Cresult"] = Value::Null;
        item["max_glu_serum"] = json!(">200");
        let encounters = validate_value(&json!([item])).unwrap();
        assert_eq!(encounters[0].a1c_result, None);
        assert_eq!(encounters[0].max_glu_serum.as_deref(), Some(">200"));
    }

    #[test]
    fn should_ignore_unknown_fields() {
        let mut item = record();
        item["encounter_id"] = json!(2278392);
        item["readmitted"] = json!("NO");
        assert!(validate_value(&json!([item])).is_ok());
    }

    #[test]
    fn should_coerce_numeric_strings_and_integral_floats() {
        let mut item = record();
        item["time_in_hospital"] = json!(" 12 ");
        item["num_medications"] = json!(18.0);
        item["race"] = json!(5);
        let encounters = validate_value(&json!([item])).unwrap();
        assert_eq!(encounters[0].time_in_hospital, 12);
        assert_eq!(encounters[0].num_medications, 18);
        assert_eq!(encounters[0].race, "5");
    }

    #[test]
    fn should_reject_missing_required_field() {
        let mut item = record();
        item.as_object_mut().unwrap().remove("age");
        let errors = validate_value(&json!([item])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].loc, vec![Loc::from("body"), Loc::Index(0), Loc::from("age")]);
        assert_eq!(kinds(&errors), vec!["value_error.missing"]);
    }

    #[test]
    fn should_reject_non_numeric_integer_field() {
        let mut item = record();
        item["time_in_hospital"] = json!("not-a-number");
        let errors = validate_value(&json!([item])).unwrap_err();
        assert_eq!(kinds(&errors), vec!["type_error.integer"]);
    }

    #[test]
    fn should_truncate_fractional_floats_and_count_booleans() {
        let mut item = record();
        item["num_procedures"] = json!(1.5);
        item["num_lab_procedures"] = json!(-2.9);
        item["number_outpatient"] = json!(true);
        item["number_emergency"] = json!(false);
        item["change"] = json!(false);
        let encounters = validate_value(&json!([item])).unwrap();
        assert_eq!(encounters[0].num_procedures, 1);
        assert_eq!(encounters[0].num_lab_procedures, -2);
        assert_eq!(encounters[0].number_outpatient, 1);
        assert_eq!(encounters[0].number_emergency, 0);
        assert_eq!(encounters[0].change, "False");
    }

    #[test]
    fn should_reject_integers_outside_i64() {
        let mut item = record();
        item["num_medications"] = json!(1e30);
        item["number_diagnoses"] = json!(u64::MAX);
        item["time_in_hospital"] = json!("18446744073709551615");
        item["num_procedures"] = json!("1.5");
        let errors = validate_value(&json!([item])).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(kinds(&errors).iter().all(|kind| *kind == "type_error.integer"));
    }

    #[test]
    fn should_reject_null_required_and_non_string_text() {
        let mut item = record();
        item["gender"] = Value::Null;
        item["insulin"] = json!(["Up"]);
        item["A1Cresult"] = json!({"value": ">7"});
        let errors = validate_value(&json!([item])).unwrap_err();
        assert_eq!(
            kinds(&errors),
            vec!["type_error.none.not_allowed", "type_error.str", "type_error.str"]
        );
    }

    #[test]
    fn should_fail_whole_batch_and_report_every_item() {
        let mut bad = record();
        bad.as_object_mut().unwrap().remove("race");
        let errors = validate_value(&json!([record(), bad, 7])).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.errors()[0].loc[1], Loc::Index(1));
        assert_eq!(errors.errors()[1].kind, "type_error.dict");
        assert_eq!(errors.errors()[1].loc, vec![Loc::from("body"), Loc::Index(2)]);
    }

    #[test]
    fn should_reject_non_array_and_malformed_body() {
        let errors = validate_value(&record()).unwrap_err();
        assert_eq!(kinds(&errors), vec!["type_error.list"]);

        let errors = validate_batch(b"[{\"race\": ").unwrap_err();
        assert_eq!(kinds(&errors), vec!["value_error.jsondecode"]);
    }
}
