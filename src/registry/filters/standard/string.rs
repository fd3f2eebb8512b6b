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

//! string filter

use crate::model::Value;
use crate::registry::filter::Filter;

/// string filter - scalars become their text form, so `42 | string | json`
/// gives `"42"`
///
/// Nil stays nil. Lists and maps become compact JSON text.
pub struct StringFilter;

impl Filter for StringFilter {
    fn name(&self) -> &str {
        "string"
    }

    fn documentation(&self) -> &str {
        "Converts the value to text; nil is kept."
    }

    fn apply(&self, value: &Value, _params: &[Value]) -> Value {
        match value {
            Value::Nil => Value::Nil,
            Value::String(_) => value.clone(),
            other => Value::String(other.to_text()),
        }
    }
}
