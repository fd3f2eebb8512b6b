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

//! fhir_reference filter

use crate::model::Value;
use crate::registry::filter::{Filter, param_text};
use url::Url;

/// fhir_reference filter - `patient_id | fhir_reference: 'Patient'`
///
/// Bare ids become `Type/id`. Values that already contain a `/` or parse as
/// an http(s) URL are returned unchanged.
pub struct ReferenceFilter;

impl Filter for ReferenceFilter {
    fn name(&self) -> &str {
        "fhir_reference"
    }

    fn documentation(&self) -> &str {
        "Turns a bare id into a relative reference, e.g. '123' | fhir_reference: 'Patient' \
         gives 'Patient/123'."
    }

    fn apply(&self, value: &Value, params: &[Value]) -> Value {
        if value.is_nil() {
            return Value::Nil;
        }

        let id = value.to_text();
        if id.contains('/') || is_absolute_http(&id) {
            return Value::String(id);
        }

        let resource_type = param_text(params, 0).unwrap_or_else(|| "Resource".to_string());
        Value::String(format!("{resource_type}/{id}"))
    }
}

fn is_absolute_http(text: &str) -> bool {
    Url::parse(text).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}
