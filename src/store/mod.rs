//! Template store
//!
//! Read-through cache of parsed templates keyed by resource type. Templates are
//! loaded from a [`TemplateSource`], parsed by liquid with the registry's
//! filters and shared as `Arc<Template>` until evicted.

#![warn(missing_docs)]

mod cache;
mod source;

pub use cache::{CacheStats, TtlCache};
pub use source::{FileSystemSource, InMemorySource, TemplateSource};

use crate::config::TemplateCacheConfig;
use crate::registry::{Filter, FilterRegistry};
use liquid::Template;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while obtaining a template
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// The template source could not be located or read
    #[error("Template not found for resource type '{resource_type}': {reason}")]
    NotFound {
        /// Requested resource type
        resource_type: String,
        /// Why the lookup failed
        reason: String,
    },

    /// The template source is not valid template syntax
    #[error("Template for resource type '{resource_type}' is malformed: {message}")]
    Parse {
        /// Requested resource type
        resource_type: String,
        /// Syntax error reported by the parser
        message: String,
    },

    /// The template failed while rendering, e.g. on an undefined variable
    #[error("Failed to render template for resource type '{resource_type}': {message}")]
    Render {
        /// Requested resource type
        resource_type: String,
        /// Error reported by the renderer
        message: String,
    },
}

/// Normalize a resource type into a template key
///
/// Keys are trimmed and lower-cased. Empty keys and anything that could
/// address a path outside the source are rejected.
pub fn template_key(resource_type: &str) -> Result<String, TemplateError> {
    let key = resource_type.trim().to_lowercase();
    let reason = if key.is_empty() {
        Some("resource type is empty")
    } else if key.contains(['/', '\\']) || key.contains("..") {
        Some("resource type is not a valid template key")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(TemplateError::NotFound {
            resource_type: resource_type.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(key),
    }
}

/// Cached access to parsed templates
pub struct TemplateStore {
    source: Arc<dyn TemplateSource>,
    registry: Arc<FilterRegistry>,
    cache: TtlCache<String, Arc<Template>>,
}

impl TemplateStore {
    /// Create a store over `source`, parsing with `registry`
    pub fn new(
        source: Arc<dyn TemplateSource>,
        registry: Arc<FilterRegistry>,
        config: &TemplateCacheConfig,
    ) -> Self {
        Self {
            source,
            registry,
            cache: TtlCache::new(config.max_entries, config.ttl),
        }
    }

    /// Get the parsed template for a resource type
    ///
    /// Repeated calls within the cache bounds return the same `Arc` without
    /// touching the source again.
    pub fn get(&self, resource_type: &str) -> Result<Arc<Template>, TemplateError> {
        let key = template_key(resource_type)?;
        self.cache.get_or_load(&key, || self.load(resource_type, &key))
    }

    fn load(&self, resource_type: &str, key: &str) -> Result<Arc<Template>, TemplateError> {
        log::debug!("Template cache miss for '{key}', loading {}", self.source.describe(key));

        let text = self.read_source(resource_type)?;
        let template = self.parse(resource_type, &text, &[])?;

        log::debug!("Loaded template '{key}' ({} bytes)", text.len());
        Ok(Arc::new(template))
    }

    /// Read the template text for a resource type, bypassing the cache
    pub fn read_source(&self, resource_type: &str) -> Result<String, TemplateError> {
        let key = template_key(resource_type)?;
        self.source.read(&key).map_err(|e| TemplateError::NotFound {
            resource_type: resource_type.to_string(),
            reason: format!("{}: {e}", self.source.describe(&key)),
        })
    }

    /// Parse template text with the registry's filters plus `extra`
    ///
    /// `resource_type` only labels errors; nothing is cached.
    pub fn parse(
        &self,
        resource_type: &str,
        text: &str,
        extra: &[Arc<dyn Filter>],
    ) -> Result<Template, TemplateError> {
        let malformed = |e: liquid_core::Error| TemplateError::Parse {
            resource_type: resource_type.to_string(),
            message: e.to_string(),
        };
        self.registry
            .template_parser_with(extra)
            .map_err(malformed)?
            .parse(text)
            .map_err(malformed)
    }

    /// Resource-type keys the source can serve
    pub fn available_templates(&self) -> Vec<String> {
        self.source.list()
    }

    /// Drop one cached template; returns whether it was cached
    pub fn invalidate(&self, resource_type: &str) -> bool {
        template_key(resource_type).is_ok_and(|key| self.cache.invalidate(&key))
    }

    /// Drop every cached template
    pub fn clear(&self) {
        self.cache.clear();
        log::debug!("Template cache cleared");
    }

    /// Number of cached templates
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Cache statistics
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Registry whose filters templates are parsed with
    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }
}
