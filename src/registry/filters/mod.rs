//! Filter implementations for the template pipe operator

pub mod fhir;
pub mod standard;

pub use fhir::register_fhir_filters;
pub use standard::register_standard_filters;
