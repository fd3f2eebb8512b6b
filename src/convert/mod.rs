//! Conversion orchestrator
//!
//! Runs one request through `RENDER -> PARSE -> (VALIDATE) -> SERIALIZE`,
//! stopping at the first failing stage. Every failure, panics included, comes
//! back as a failed [`ConversionResult`].

#![warn(missing_docs)]

mod resource;
mod validation;

pub use resource::{JsonResourceCodec, Resource, ResourceError, ResourceParser, ResourceSerializer};
pub use validation::{
    ResourceValidator, Severity, StructuralValidator, ValidationMessage, ValidationResult,
};

use crate::error::{ConversionError, Result};
use crate::model::{ConversionRequest, ConversionResult, context_from_json};
use crate::renderer::TemplateRenderer;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Drives conversions through the renderer and the resource collaborators
#[derive(Clone)]
pub struct ConversionService {
    renderer: TemplateRenderer,
    parser: Arc<dyn ResourceParser>,
    serializer: Arc<dyn ResourceSerializer>,
    validator: Arc<dyn ResourceValidator>,
}

impl ConversionService {
    /// Create a service from its collaborators
    pub fn new(
        renderer: TemplateRenderer,
        parser: Arc<dyn ResourceParser>,
        serializer: Arc<dyn ResourceSerializer>,
        validator: Arc<dyn ResourceValidator>,
    ) -> Self {
        Self {
            renderer,
            parser,
            serializer,
            validator,
        }
    }

    /// Create a service using the JSON codec and the structural validator
    pub fn with_defaults(renderer: TemplateRenderer, pretty_print: bool) -> Self {
        let codec = Arc::new(JsonResourceCodec::new(pretty_print));
        Self::new(
            renderer,
            codec.clone(),
            codec,
            Arc::new(StructuralValidator),
        )
    }

    /// Convert one request; never panics and never returns an error
    pub fn convert(&self, request: &ConversionRequest) -> ConversionResult {
        log::info!(
            "Converting {} resource (validate: {})",
            request.resource_type,
            request.validate
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(request)));
        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(error)) => {
                log::error!("Conversion of {} failed: {error}", request.resource_type);
                ConversionResult::failed(error.errors(), error.warnings())
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown cause".to_string());
                log::error!("Conversion of {} panicked: {reason}", request.resource_type);
                ConversionResult::failed(
                    vec![format!("Internal error during conversion: {reason}")],
                    Vec::new(),
                )
            }
        }
    }

    fn run(&self, request: &ConversionRequest) -> Result<ConversionResult> {
        let field_errors = request.field_errors();
        if !field_errors.is_empty() {
            return Err(ConversionError::InvalidRequest(field_errors));
        }
        let input = request.input_data.clone().unwrap_or_default();

        let rendered = self
            .renderer
            .render(&request.resource_type, &context_from_json(input))?;

        let resource = self.parser.parse(&rendered)?;

        let mut warnings = Vec::new();
        if request.validate {
            let validation = self.validator.validate(&resource);
            if !validation.is_successful() {
                return Err(ConversionError::ValidationFailed {
                    messages: validation.messages(),
                    warnings: validation.warnings(),
                });
            }
            warnings = validation.warnings();
        }

        let output = self.serializer.serialize(&resource)?;

        log::debug!(
            "Converted {} resource {}",
            resource.resource_type(),
            resource.id().unwrap_or("<no id>")
        );
        Ok(ConversionResult::succeeded(
            resource.resource_type().to_string(),
            resource.id().map(str::to_string),
            output,
            warnings,
        ))
    }

    /// Renderer used for the RENDER stage
    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemplateCacheConfig;
    use crate::registry::create_standard_registry;
    use crate::store::{InMemorySource, TemplateStore};
    use serde_json::{Map, json};

    const PATIENT: &str = r#"{
  "resourceType": "Patient",
  "id": "{{ id }}",
  "gender": {% if gender %}"{{ gender | fhir_code: 'gender' }}"{% else %}null{% endif %}
}"#;

    fn service_with(
        source: InMemorySource,
        validator: Arc<dyn ResourceValidator>,
    ) -> ConversionService {
        let store = TemplateStore::new(
            Arc::new(source),
            Arc::new(create_standard_registry()),
            &TemplateCacheConfig::testing(),
        );
        let codec = Arc::new(JsonResourceCodec::new(false));
        ConversionService::new(
            TemplateRenderer::new(Arc::new(store)),
            codec.clone(),
            codec,
            validator,
        )
    }

    fn service() -> ConversionService {
        service_with(
            InMemorySource::new()
                .with_template("patient", PATIENT)
                .with_template("broken", "{ not json")
                .with_template("malformed", "{% for %}")
                .with_template("strict", r#"{"resourceType": "Basic", "id": "{{ missing }}"}"#),
            Arc::new(StructuralValidator),
        )
    }

    fn input(value: serde_json::Value) -> Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_done() {
        let request = ConversionRequest::new("Patient", input(json!({"id": "p1", "gender": "F"})));
        let result = service().convert(&request);

        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.resource_type.as_deref(), Some("Patient"));
        assert_eq!(result.resource_id.as_deref(), Some("p1"));
        assert_eq!(
            result.output.as_deref(),
            Some(r#"{"resourceType":"Patient","id":"p1","gender":"female"}"#)
        );
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_render_failures() {
        let result = service().convert(&ConversionRequest::new("Spaceship", Map::new()));
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Template not found for resource type 'Spaceship'"));

        let result = service().convert(&ConversionRequest::new("malformed", Map::new()));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("is malformed"));

        let result = service().convert(&ConversionRequest::new("strict", Map::new()));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Failed to render template for resource type 'strict'"));
    }

    #[test]
    fn test_parse_failure() {
        let result = service().convert(&ConversionRequest::new("broken", Map::new()));
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Failed to parse resource"));
        assert_eq!(result.output, None);
    }

    #[test]
    fn test_validation_failure_reports_every_message() {
        let request = ConversionRequest::new("Patient", input(json!({"id": "p1", "gender": "X"})))
            .with_validation(true);
        let result = service().convert(&request);

        assert!(!result.success);
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors[0].starts_with("Patient.gender:"));
        assert_eq!(
            result.warnings,
            vec!["Patient: dom-6: A resource should have narrative for robust management"]
        );
    }

    #[test]
    fn test_validation_success_carries_warnings() {
        let request = ConversionRequest::new("Patient", input(json!({"id": "p1", "gender": "M"})))
            .with_validation(true);
        let result = service().convert(&request);

        assert!(result.success);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_request() {
        let request = ConversionRequest {
            resource_type: " ".to_string(),
            input_data: None,
            validate: false,
        };
        let result = service().convert(&request);
        assert_eq!(
            result.errors,
            vec![
                "resourceType: Resource type is required",
                "inputData: Input data is required",
            ]
        );
    }

    struct PanickingValidator;

    impl ResourceValidator for PanickingValidator {
        fn validate(&self, _resource: &Resource) -> ValidationResult {
            panic!("validator exploded")
        }
    }

    #[test]
    fn test_panics_become_failed_results() {
        let service = service_with(
            InMemorySource::new().with_template("patient", PATIENT),
            Arc::new(PanickingValidator),
        );
        let request =
            ConversionRequest::new("Patient", input(json!({"id": "p1"}))).with_validation(true);
        let result = service.convert(&request);

        assert!(!result.success);
        assert_eq!(
            result.errors,
            vec!["Internal error during conversion: validator exploded"]
        );
    }
}
