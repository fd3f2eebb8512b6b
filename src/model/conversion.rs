//! Conversion request and result records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A request to convert flat input data into one resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    /// Resource type key selecting the template (case-insensitive)
    #[serde(default)]
    pub resource_type: String,

    /// Flat key/value input; `None` when the field was missing
    #[serde(default)]
    pub input_data: Option<Map<String, JsonValue>>,

    /// Run the resource validator before serializing
    #[serde(default)]
    pub validate: bool,
}

impl ConversionRequest {
    /// Create a request without validation
    pub fn new(resource_type: impl Into<String>, input_data: Map<String, JsonValue>) -> Self {
        Self {
            resource_type: resource_type.into(),
            input_data: Some(input_data),
            validate: false,
        }
    }

    /// Toggle validation
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Field-level checks, one `"<field>: <message>"` entry per violation
    pub fn field_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.resource_type.trim().is_empty() {
            errors.push("resourceType: Resource type is required".to_string());
        }
        if self.input_data.is_none() {
            errors.push("inputData: Input data is required".to_string());
        }
        errors
    }
}

/// Outcome of one conversion; built once and never mutated afterwards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// Whether the pipeline reached DONE
    pub success: bool,
    /// Type tag of the produced resource
    pub resource_type: Option<String>,
    /// Identifier of the produced resource
    pub resource_id: Option<String>,
    /// Serialized resource text
    pub output: Option<String>,
    /// Error messages, in the order they were reported
    #[serde(default)]
    pub errors: Vec<String>,
    /// Warning messages, in the order they were reported
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ConversionResult {
    /// Successful conversion
    pub fn succeeded(
        resource_type: String,
        resource_id: Option<String>,
        output: String,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            success: true,
            resource_type: Some(resource_type),
            resource_id,
            output: Some(output),
            errors: Vec::new(),
            warnings,
        }
    }

    /// Failed conversion carrying every error message
    pub fn failed(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            resource_type: None,
            resource_id: None,
            output: None,
            errors,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: ConversionRequest =
            serde_json::from_value(json!({"resourceType": "Patient", "inputData": {"a": 1}}))
                .unwrap();
        assert_eq!(request.resource_type, "Patient");
        assert!(!request.validate);
        assert!(request.field_errors().is_empty());
    }

    #[test]
    fn test_request_field_errors() {
        let request: ConversionRequest =
            serde_json::from_value(json!({"resourceType": "  "})).unwrap();
        assert_eq!(
            request.field_errors(),
            vec![
                "resourceType: Resource type is required",
                "inputData: Input data is required"
            ]
        );
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ConversionResult::failed(vec!["boom".into()], vec![]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], json!(false));
        assert_eq!(json["resourceType"], JsonValue::Null);
        assert_eq!(json["errors"], json!(["boom"]));
    }
}
