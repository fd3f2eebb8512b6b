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

//! fhir_code filter

use crate::model::Value;
use crate::registry::filter::{Filter, param_text};
use crate::registry::tables::FilterTables;
use std::sync::Arc;

/// fhir_code filter - `gender | fhir_code: 'gender'`
///
/// Maps a local code through the named table. Unknown tables and codes leave
/// the value unchanged.
pub struct CodeFilter {
    tables: Arc<FilterTables>,
}

impl CodeFilter {
    /// Create the filter over shared tables
    pub fn new(tables: Arc<FilterTables>) -> Self {
        Self { tables }
    }
}

impl Filter for CodeFilter {
    fn name(&self) -> &str {
        "fhir_code"
    }

    fn documentation(&self) -> &str {
        "Maps a local code to a FHIR code using the table named by the first argument."
    }

    fn apply(&self, value: &Value, params: &[Value]) -> Value {
        if value.is_nil() {
            return Value::Nil;
        }
        let Some(table) = param_text(params, 0) else {
            return value.clone();
        };

        match self.tables.code(&table, &value.to_text()) {
            Some(mapped) => Value::string(mapped),
            None => value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("M", "gender", Value::string("male"))]
    #[case("F", "gender", Value::string("female"))]
    #[case("X", "gender", Value::string("X"))]
    #[case("W", "marital", Value::string("W"))]
    #[case("M", "religion", Value::string("M"))]
    fn test_code_lookup(#[case] code: &str, #[case] table: &str, #[case] expected: Value) {
        let filter = CodeFilter::new(Arc::default());
        assert_eq!(filter.apply(&Value::string(code), &[Value::string(table)]), expected);
    }

    #[test]
    fn test_missing_table_param() {
        let filter = CodeFilter::new(Arc::default());
        assert_eq!(filter.apply(&Value::string("M"), &[]), Value::string("M"));
        assert_eq!(filter.apply(&Value::Nil, &[Value::string("gender")]), Value::Nil);
    }
}
