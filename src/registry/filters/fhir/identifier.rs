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

//! fhir_identifier filter

use crate::model::{Value, ValueMap};
use crate::registry::filter::{Filter, param_text};
use crate::registry::tables::FilterTables;
use std::sync::Arc;

const DEFAULT_TYPE: &str = "MRN";

/// fhir_identifier filter - `value | fhir_identifier: 'SSN'`
///
/// The type defaults to `MRN`. Nine-digit SSNs are formatted `ddd-dd-dddd`.
pub struct IdentifierFilter {
    tables: Arc<FilterTables>,
}

impl IdentifierFilter {
    /// Create the filter over shared tables
    pub fn new(tables: Arc<FilterTables>) -> Self {
        Self { tables }
    }
}

impl Filter for IdentifierFilter {
    fn name(&self) -> &str {
        "fhir_identifier"
    }

    fn documentation(&self) -> &str {
        "Wraps the value as {system, value}; the system is chosen by identifier type \
         (SSN, MRN, DL, PASSPORT)."
    }

    fn apply(&self, value: &Value, params: &[Value]) -> Value {
        if value.is_nil() {
            return Value::Nil;
        }

        let kind = param_text(params, 0)
            .unwrap_or_else(|| DEFAULT_TYPE.to_string())
            .to_uppercase();
        let mut raw = value.to_text();
        if kind == "SSN" {
            raw = format_ssn(raw);
        }

        let mut identifier = ValueMap::new();
        identifier.insert(
            "system".to_string(),
            Value::string(self.tables.identifier_system(&kind)),
        );
        identifier.insert("value".to_string(), Value::String(raw));
        Value::Map(identifier)
    }
}

/// `123456789` becomes `123-45-6789`; anything else is kept as is
pub fn format_ssn(raw: String) -> String {
    if raw.len() == 9 && raw.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &raw[..3], &raw[3..5], &raw[5..])
    } else {
        raw
    }
}
