//! Filter registry for template pipes
//!
//! Filters are registered once at startup and shared read-only by every
//! render afterwards. Mapping tables are configuration data handed in here.
//! The liquid standard library (`default`, `upcase`, `join`, ...) is added on
//! top when a template parser is built.

#![warn(missing_docs)]

pub mod filter;
pub mod filters;
pub mod pipe;
pub mod tables;

pub use filter::{Filter, FilterNotFound, FilterRegistry};
pub use pipe::PipeFilter;
pub use tables::FilterTables;

use std::sync::Arc;

/// Create a registry with all built-in filters and the default mapping tables
pub fn create_standard_registry() -> FilterRegistry {
    create_registry_with_tables(FilterTables::default())
}

/// Create a registry with all built-in filters over the given mapping tables
pub fn create_registry_with_tables(tables: FilterTables) -> FilterRegistry {
    let mut registry = FilterRegistry::new();

    filters::register_standard_filters(&mut registry);
    filters::register_fhir_filters(&mut registry, Arc::new(tables));

    log::debug!("Filter registry ready with {} filters", registry.len());
    registry
}
