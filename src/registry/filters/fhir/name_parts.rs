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

//! fhir_name_parts filter

use crate::model::{Value, ValueMap};
use crate::registry::filter::Filter;

/// fhir_name_parts filter - splits a full name into family and given parts
///
/// The last whitespace-separated token is the family name and every earlier
/// token is a given name. Blank input yields an empty map.
pub struct NamePartsFilter;

impl Filter for NamePartsFilter {
    fn name(&self) -> &str {
        "fhir_name_parts"
    }

    fn documentation(&self) -> &str {
        "Splits a full name into {family, given}: last token is the family name."
    }

    fn apply(&self, value: &Value, _params: &[Value]) -> Value {
        if value.is_nil() {
            return Value::Nil;
        }

        let text = value.to_text();
        let parts: Vec<&str> = text.split_whitespace().collect();
        let mut name = ValueMap::new();

        match parts.split_last() {
            None => {}
            Some((only, [])) => {
                name.insert("family".to_string(), Value::string(*only));
            }
            Some((family, given)) => {
                name.insert("family".to_string(), Value::string(*family));
                name.insert(
                    "given".to_string(),
                    Value::List(given.iter().map(|g| Value::string(*g)).collect()),
                );
            }
        }

        Value::Map(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn split(name: &str) -> Value {
        NamePartsFilter.apply(&Value::string(name), &[])
    }

    #[test]
    fn test_full_name() {
        let name = split("John Michael Doe");
        assert_eq!(name.get("family"), Some(&Value::string("Doe")));
        assert_eq!(
            name.get("given"),
            Some(&Value::List(vec![Value::string("John"), Value::string("Michael")]))
        );
    }

    #[test]
    fn test_single_token_has_no_given() {
        let name = split("  Cher ");
        assert_eq!(name.get("family"), Some(&Value::string("Cher")));
        assert_eq!(name.get("given"), None);
    }

    #[test]
    fn test_blank_name_is_empty_map() {
        assert_eq!(split("   "), Value::Map(ValueMap::new()));
        assert_eq!(NamePartsFilter.apply(&Value::Nil, &[]), Value::Nil);
    }
}
