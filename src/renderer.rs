//! Template renderer
//!
//! Renders cached templates, or ad-hoc template text, against a context
//! extended with generated `uuid` and `now` fields.

use crate::model::{Context, Value};
use crate::registry::Filter;
use crate::store::{TemplateError, TemplateStore};
use chrono::{SecondsFormat, Utc};
use liquid::Template;
use liquid_core::model::to_object;
use std::sync::Arc;
use uuid::Uuid;

/// Label used in errors for templates rendered from text
const INLINE_TEMPLATE: &str = "inline";

/// Renders resource templates through the shared template store
#[derive(Clone)]
pub struct TemplateRenderer {
    store: Arc<TemplateStore>,
}

impl TemplateRenderer {
    /// Create a renderer over a template store
    pub fn new(store: Arc<TemplateStore>) -> Self {
        Self { store }
    }

    /// Render the cached template for `resource_type`
    pub fn render(&self, resource_type: &str, input: &Context) -> Result<String, TemplateError> {
        let template = self.store.get(resource_type)?;
        let rendered = render_template(&template, resource_type, input)?;
        log::debug!("Rendered {resource_type} template:\n{rendered}");
        Ok(rendered)
    }

    /// Render the template for `resource_type` with additional filters
    ///
    /// The source is read and parsed again on every call and the result is
    /// never cached, so `filters` only affect this render. Filters named like
    /// a registered one replace it.
    pub fn render_with_filters(
        &self,
        resource_type: &str,
        input: &Context,
        filters: &[Arc<dyn Filter>],
    ) -> Result<String, TemplateError> {
        let text = self.store.read_source(resource_type)?;
        let template = self.store.parse(resource_type, &text, filters)?;
        render_template(&template, resource_type, input)
    }

    /// Render template text directly, bypassing the store
    pub fn render_source(&self, text: &str, input: &Context) -> Result<String, TemplateError> {
        let template = self.store.parse(INLINE_TEMPLATE, text, &[])?;
        render_template(&template, INLINE_TEMPLATE, input)
    }

    /// Underlying template store
    pub fn store(&self) -> &Arc<TemplateStore> {
        &self.store
    }
}

fn render_template(
    template: &Template,
    resource_type: &str,
    input: &Context,
) -> Result<String, TemplateError> {
    let failed = |e: liquid_core::Error| TemplateError::Render {
        resource_type: resource_type.to_string(),
        message: e.to_string(),
    };
    let globals = to_object(&with_generated_fields(input)).map_err(failed)?;
    template.render(&globals).map_err(failed)
}

/// Copy of `input` with `uuid` and `now` set, overriding caller values
fn with_generated_fields(input: &Context) -> Context {
    let mut context = input.clone();
    context.insert(
        "uuid".to_string(),
        Value::String(Uuid::new_v4().to_string()),
    );
    context.insert(
        "now".to_string(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    context
}
