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

//! fhir_phone filter - builds a ContactPoint from a raw phone number

use crate::model::{Value, ValueMap};
use crate::registry::filter::{Filter, param_text};

/// fhir_phone filter - `value | fhir_phone: 'home'`
pub struct PhoneFilter;

impl Filter for PhoneFilter {
    fn name(&self) -> &str {
        "fhir_phone"
    }

    fn documentation(&self) -> &str {
        "Normalizes a phone number into {system: phone, value, use}. Ten digit numbers \
         (or eleven with a leading 1) are formatted as (XXX) XXX-XXXX."
    }

    fn apply(&self, value: &Value, params: &[Value]) -> Value {
        if value.is_nil() {
            return Value::Nil;
        }

        let use_code = param_text(params, 0).unwrap_or_else(|| "home".to_string());

        let mut contact = ValueMap::new();
        contact.insert("system".to_string(), Value::string("phone"));
        contact.insert("value".to_string(), Value::String(format_phone(&value.to_text())));
        contact.insert("use".to_string(), Value::String(use_code));
        Value::Map(contact)
    }
}

/// Format a North American number, or return the cleaned text
///
/// Applying it twice yields the same result as applying it once.
pub fn format_phone(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    let all_digits = cleaned.bytes().all(|b| b.is_ascii_digit());
    let digits = match cleaned.len() {
        10 if all_digits => &cleaned[..],
        11 if all_digits && cleaned.starts_with('1') => &cleaned[1..],
        _ => return cleaned,
    };

    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}
