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

//! fhir_unit filter

use crate::model::{Value, ValueMap};
use crate::registry::filter::Filter;
use crate::registry::tables::FilterTables;
use std::sync::Arc;

/// fhir_unit filter - `'mmHg' | fhir_unit` gives `{unit, system, code}`
pub struct UnitFilter {
    tables: Arc<FilterTables>,
}

impl UnitFilter {
    /// Create the filter over shared tables
    pub fn new(tables: Arc<FilterTables>) -> Self {
        Self { tables }
    }
}

impl Filter for UnitFilter {
    fn name(&self) -> &str {
        "fhir_unit"
    }

    fn documentation(&self) -> &str {
        "Builds a UCUM quantity unit; unmapped units use the input text as the code."
    }

    fn apply(&self, value: &Value, _params: &[Value]) -> Value {
        if value.is_nil() {
            return Value::Nil;
        }

        let unit = value.to_text();
        let code = self
            .tables
            .unit_code(&unit)
            .map(str::to_string)
            .unwrap_or_else(|| unit.clone());

        let mut quantity = ValueMap::new();
        quantity.insert("unit".to_string(), Value::String(unit));
        quantity.insert(
            "system".to_string(),
            Value::string(self.tables.unit_system.as_str()),
        );
        quantity.insert("code".to_string(), Value::String(code));
        Value::Map(quantity)
    }
}
