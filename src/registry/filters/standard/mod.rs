//! General purpose filters the liquid standard library does not provide

mod json;
mod string;

pub use json::JsonFilter;
pub use string::StringFilter;

use crate::registry::filter::FilterRegistry;

/// Register all general purpose filters
pub fn register_standard_filters(registry: &mut FilterRegistry) {
    registry.register(JsonFilter);
    registry.register(StringFilter);
}
