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

//! json filter

use crate::model::Value;
use crate::registry::filter::Filter;

/// json filter - serializes any value as JSON text
///
/// Unlike plain interpolation, strings come out quoted and escaped, which is
/// what templates producing JSON documents need.
pub struct JsonFilter;

impl Filter for JsonFilter {
    fn name(&self) -> &str {
        "json"
    }

    fn documentation(&self) -> &str {
        "Serializes the value as JSON: strings quoted, nil as null, lists and maps as compact JSON."
    }

    fn apply(&self, value: &Value, _params: &[Value]) -> Value {
        Value::String(value.to_json().to_string())
    }
}
