// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Converter configuration
//!
//! Every field has a default, so a configuration file only needs the
//! settings it changes.

use crate::registry::FilterTables;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Cannot read configuration file '{path}': {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON
    #[error("Invalid configuration in '{path}': {source}")]
    Json {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// A setting has an unusable value
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Configuration for the parsed template cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateCacheConfig {
    /// Maximum number of resident templates, evicted least recently used
    pub max_entries: usize,

    /// Optional TTL measured from insertion, serialized as whole seconds
    #[serde(with = "ttl_seconds")]
    pub ttl: Option<Duration>,
}

impl TemplateCacheConfig {
    /// Create a cache configuration with custom settings
    pub fn new(max_entries: usize, ttl: Option<Duration>) -> Self {
        Self { max_entries, ttl }
    }

    /// Create a configuration for testing
    pub fn testing() -> Self {
        Self {
            max_entries: 10,
            ttl: Some(Duration::from_millis(100)), // Very short TTL for tests
        }
    }
}

impl Default for TemplateCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl: Some(Duration::from_secs(600)),
        }
    }
}

/// Top-level converter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConverterConfig {
    /// Directory holding one template file per resource type
    pub templates_dir: PathBuf,

    /// Template file extension, without the dot
    pub template_extension: String,

    /// Pretty-print serialized resources
    pub pretty_print: bool,

    /// Template cache bounds
    pub cache: TemplateCacheConfig,

    /// Mapping tables handed to the FHIR filters
    pub filter_tables: FilterTables,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            template_extension: "liquid".to_string(),
            pretty_print: true,
            cache: TemplateCacheConfig::default(),
            filter_tables: FilterTables::default(),
        }
    }
}

impl ConverterConfig {
    /// Load a configuration file; missing fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!("Loaded converter configuration from {}", path.display());
        Ok(config)
    }

    /// Check settings that deserialization alone cannot rule out
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid(
                "cache.maxEntries must be greater than 0".to_string(),
            ));
        }
        if self.template_extension.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "templateExtension must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

mod ttl_seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(ttl: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match ttl {
            Some(ttl) => s.serialize_some(&ttl.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}
