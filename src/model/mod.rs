//! Data model: template values, render contexts and conversion records

#![warn(missing_docs)]

pub mod conversion;
pub mod value;

pub use conversion::{ConversionRequest, ConversionResult};
pub use value::{Context, Value, ValueMap, context_from_json};
