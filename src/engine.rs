//! Converter engine - the main entry point for resource conversion

use crate::config::ConverterConfig;
use crate::convert::ConversionService;
use crate::error::Result;
use crate::model::{ConversionRequest, ConversionResult, Context};
use crate::registry::{Filter, create_registry_with_tables};
use crate::renderer::TemplateRenderer;
use crate::store::{FileSystemSource, TemplateSource, TemplateStore};
use futures::future::join_all;
use std::sync::Arc;

/// Wires configuration, filter registry, template store, renderer and
/// conversion service together
#[derive(Clone)]
pub struct ConverterEngine {
    config: Arc<ConverterConfig>,
    service: ConversionService,
}

impl Default for ConverterEngine {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}

impl ConverterEngine {
    /// Create an engine reading templates from `config.templates_dir`
    pub fn new(config: ConverterConfig) -> Self {
        let source = FileSystemSource::new(&config.templates_dir, &config.template_extension);
        Self::with_source(config, Arc::new(source))
    }

    /// Create an engine over a custom template source
    pub fn with_source(config: ConverterConfig, source: Arc<dyn TemplateSource>) -> Self {
        let registry = Arc::new(create_registry_with_tables(config.filter_tables.clone()));
        let store = Arc::new(TemplateStore::new(source, registry, &config.cache));
        let renderer = TemplateRenderer::new(store);
        let service = ConversionService::with_defaults(renderer, config.pretty_print);

        log::debug!(
            "Converter engine ready (cache: {} entries, ttl: {:?})",
            config.cache.max_entries,
            config.cache.ttl
        );
        Self {
            config: Arc::new(config),
            service,
        }
    }

    /// Create an engine around an already assembled service
    pub fn with_service(config: ConverterConfig, service: ConversionService) -> Self {
        Self {
            config: Arc::new(config),
            service,
        }
    }

    /// Convert one request
    pub fn convert(&self, request: &ConversionRequest) -> ConversionResult {
        self.service.convert(request)
    }

    /// Convert requests concurrently on the blocking pool, results in request order
    pub async fn convert_all(&self, requests: Vec<ConversionRequest>) -> Vec<ConversionResult> {
        let tasks = requests.into_iter().map(|request| {
            let service = self.service.clone();
            tokio::task::spawn_blocking(move || service.convert(&request))
        });

        join_all(tasks)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|e| {
                    log::error!("Conversion task failed: {e}");
                    ConversionResult::failed(
                        vec![format!("Internal error during conversion: {e}")],
                        Vec::new(),
                    )
                })
            })
            .collect()
    }

    /// Render the template for `resource_type` without parsing the result
    pub fn render(&self, resource_type: &str, input: &Context) -> Result<String> {
        Ok(self.service.renderer().render(resource_type, input)?)
    }

    /// Render with additional filters, bypassing the template cache
    pub fn render_with_filters(
        &self,
        resource_type: &str,
        input: &Context,
        filters: &[Arc<dyn Filter>],
    ) -> Result<String> {
        Ok(self
            .service
            .renderer()
            .render_with_filters(resource_type, input, filters)?)
    }

    /// Resource types with a template available
    pub fn available_templates(&self) -> Vec<String> {
        self.service.renderer().store().available_templates()
    }

    /// The underlying conversion service
    pub fn service(&self) -> &ConversionService {
        &self.service
    }

    /// Active configuration
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySource;
    use serde_json::Map;

    fn engine() -> ConverterEngine {
        let source = InMemorySource::new().with_template(
            "condition",
            r#"{"resourceType": "Condition", "id": {% if id %}"{{ id }}"{% else %}"{{ uuid }}"{% endif %}}"#,
        );
        ConverterEngine::with_source(ConverterConfig::default(), Arc::new(source))
    }

    #[test]
    fn test_render_and_templates() {
        let engine = engine();
        let mut input = Context::new();
        input.insert("id".to_string(), "c1".into());

        assert_eq!(
            engine.render("Condition", &input).unwrap(),
            r#"{"resourceType": "Condition", "id": "c1"}"#
        );
        assert_eq!(engine.available_templates(), vec!["condition"]);
        assert!(engine.render("Patient", &input).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_convert_all_keeps_order() {
        let engine = engine();
        let requests = vec![
            ConversionRequest::new("Condition", Map::new()),
            ConversionRequest::new("Unknown", Map::new()),
            ConversionRequest::new("condition", Map::new()),
        ];

        let results = engine.convert_all(requests).await;
        let success: Vec<bool> = results.iter().map(|r| r.success).collect();
        assert_eq!(success, vec![true, false, true]);
    }
}
