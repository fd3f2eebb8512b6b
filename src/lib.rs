//! Template-driven conversion of flat clinical data into FHIR resources
//!
//! Input key/value data is rendered through a per-resource-type Liquid
//! template. Filters such as `fhir_date`, `fhir_phone` or `fhir_identifier`
//! normalize individual fields; the rendered JSON is then parsed, optionally
//! validated and serialized.
//!
//! ```no_run
//! use octofhir_converter::{ConversionRequest, ConverterConfig, ConverterEngine};
//! use serde_json::json;
//!
//! let engine = ConverterEngine::new(ConverterConfig::default());
//! let input = json!({"id": "p1", "family_name": "Doe", "gender": "F"});
//! let request = ConversionRequest::new("Patient", input.as_object().cloned().unwrap_or_default());
//! let result = engine.convert(&request);
//! println!("{}", result.output.unwrap_or_default());
//! ```

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod model;
pub mod registry;
pub mod renderer;
pub mod store;

// Re-export main types
pub use config::{ConverterConfig, TemplateCacheConfig};
pub use convert::ConversionService;
pub use engine::ConverterEngine;
pub use error::{ConversionError, Result};
pub use model::{ConversionRequest, ConversionResult, Context, Value};
pub use registry::{Filter, FilterRegistry, FilterTables, create_standard_registry};
pub use renderer::TemplateRenderer;
pub use store::{TemplateError, TemplateStore};
