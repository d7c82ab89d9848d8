//! Input validation for inbound sensor payloads
//!
//! Only shape and type are checked. Any finite JSON number is accepted for
//! every field, including negative or physically implausible readings.

use crate::error::{FieldError, ValidationErrors};
use crate::models::SensorReading;
use crate::schema::{FEATURE_NAMES, NUM_FEATURES};
use serde_json::Value;

/// Parse and validate a raw request body
pub fn validate_body(body: &[u8]) -> Result<SensorReading, ValidationErrors> {
    let payload: Value = serde_json::from_slice(body).map_err(|e| ValidationErrors {
        errors: vec![FieldError::invalid_body(format!("JSON decode error: {}", e))],
    })?;
    validate_payload(&payload)
}

/// Validate a decoded JSON payload, collecting every field error
pub fn validate_payload(payload: &Value) -> Result<SensorReading, ValidationErrors> {
    let object = payload.as_object().ok_or_else(|| ValidationErrors {
        errors: vec![FieldError::invalid_body(format!(
            "Input should be an object, got {}",
            json_type(payload)
        ))],
    })?;

    let mut values = [0.0; NUM_FEATURES];
    let mut errors = Vec::new();

    for (i, name) in FEATURE_NAMES.iter().enumerate() {
        match object.get(*name) {
            None => errors.push(FieldError::missing(name)),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => values[i] = v,
                _ => errors.push(FieldError::not_a_number(name, "an out-of-range number")),
            },
            Some(other) => errors.push(FieldError::not_a_number(name, json_type(other))),
        }
    }

    if errors.is_empty() {
        Ok(SensorReading::from_values(values))
    } else {
        Err(ValidationErrors { errors })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldErrorKind;
    use crate::scenarios::DemoScenario;
    use serde_json::json;

    fn valid_payload() -> Value {
        serde_json::to_value(DemoScenario::Normal.reading()).unwrap()
    }

    #[test]
    fn test_valid_payload_accepted() {
        let reading = validate_payload(&valid_payload()).unwrap();
        assert_eq!(reading, DemoScenario::Normal.reading());
    }

    #[test]
    fn test_integers_accepted_as_numbers() {
        let mut payload = valid_payload();
        payload["Shaft_RPM"] = json!(950);
        let reading = validate_payload(&payload).unwrap();
        assert_eq!(reading.Shaft_RPM, 950.0);
    }

    #[test]
    fn test_each_missing_field_is_reported() {
        for name in FEATURE_NAMES {
            let mut payload = valid_payload();
            payload.as_object_mut().unwrap().remove(name);

            let err = validate_payload(&payload).unwrap_err();
            assert_eq!(err.errors.len(), 1);
            assert_eq!(err.errors[0].field, name);
            assert_eq!(err.errors[0].kind, FieldErrorKind::Missing);
        }
    }

    #[test]
    fn test_each_non_numeric_field_is_reported() {
        for name in FEATURE_NAMES {
            let mut payload = valid_payload();
            payload[name] = json!("invalid");

            let err = validate_payload(&payload).unwrap_err();
            assert_eq!(err.errors.len(), 1);
            assert_eq!(err.errors[0].field, name);
            assert_eq!(err.errors[0].kind, FieldErrorKind::NotANumber);
        }
    }

    #[test]
    fn test_null_and_bool_are_not_numbers() {
        let mut payload = valid_payload();
        payload["Oil_Temp"] = Value::Null;
        payload["Oil_Pressure"] = json!(true);

        let err = validate_payload(&payload).unwrap_err();
        let fields: Vec<&str> = err.fields().collect();
        assert_eq!(fields, vec!["Oil_Temp", "Oil_Pressure"]);
    }

    #[test]
    fn test_all_errors_collected() {
        let err = validate_payload(&json!({})).unwrap_err();
        assert_eq!(err.errors.len(), NUM_FEATURES);
    }

    #[test]
    fn test_implausible_values_accepted() {
        let mut payload = valid_payload();
        payload["Shaft_RPM"] = json!(-500.0);
        payload["Oil_Temp"] = json!(1.0e6);
        assert!(validate_payload(&payload).is_ok());
    }

    #[test]
    fn test_extra_fields_ignored() {
        let mut payload = valid_payload();
        payload["Vessel"] = json!("MV Example");
        assert!(validate_payload(&payload).is_ok());
    }

    #[test]
    fn test_non_object_rejected() {
        let err = validate_payload(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.errors[0].kind, FieldErrorKind::InvalidBody);
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = validate_body(b"{\"Shaft_RPM\": ").unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].field, "body");
    }
}
