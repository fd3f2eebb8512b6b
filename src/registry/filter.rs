//! Filter trait and the process-wide filter registry

use crate::model::Value;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A named, pure transformation applied through the template pipe operator
///
/// Filters never fail. Input they cannot interpret is returned as the
/// best-effort value, usually the input itself.
pub trait Filter: Send + Sync {
    /// Name used in templates (`value | name: 'arg'`)
    fn name(&self) -> &str;

    /// Apply the filter to `value` with the evaluated pipe arguments
    fn apply(&self, value: &Value, params: &[Value]) -> Value;

    /// Get filter documentation
    fn documentation(&self) -> &str {
        ""
    }
}

/// Lookup of a name no filter was registered under
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown filter '{name}'")]
pub struct FilterNotFound {
    /// Requested filter name
    pub name: String,
}

/// Registry of filters, keyed by unique name
///
/// Populated once at startup and shared read-only afterwards.
#[derive(Default, Clone)]
pub struct FilterRegistry {
    filters: FxHashMap<String, Arc<dyn Filter>>,
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.filter_names())
            .finish()
    }
}

impl FilterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter under its own name
    pub fn register<F: Filter + 'static>(&mut self, filter: F) {
        self.register_arc(Arc::new(filter));
    }

    /// Register an already shared filter
    pub fn register_arc(&mut self, filter: Arc<dyn Filter>) {
        let name = filter.name().to_string();
        if self.filters.insert(name.clone(), filter).is_some() {
            log::warn!("Filter '{name}' registered twice, keeping the latest");
        }
    }

    /// Find a filter by name
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Filter>, FilterNotFound> {
        self.filters
            .get(name)
            .cloned()
            .ok_or_else(|| FilterNotFound {
                name: name.to_string(),
            })
    }

    /// Check if a filter exists
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered filters, in no particular order
    pub fn filters(&self) -> impl Iterator<Item = &Arc<dyn Filter>> {
        self.filters.values()
    }

    /// Registered names, sorted
    pub fn filter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if no filters are registered
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Text of the parameter at `index`; `None` when absent or nil
pub(crate) fn param_text(params: &[Value], index: usize) -> Option<String> {
    match params.get(index) {
        None | Some(Value::Nil) => None,
        Some(value) => Some(value.to_text()),
    }
}
