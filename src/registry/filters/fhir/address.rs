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

//! fhir_address filter

use crate::model::{Value, ValueMap};
use crate::registry::filter::Filter;

const FIELDS: [&str; 3] = ["city", "state", "postalCode"];
const COUNTRY: &str = "US";

/// fhir_address filter - splits `"street, city, state, zip"` into an Address
///
/// Segments past the postal code are ignored and `country` is always `US`.
/// Non-string values pass through untouched.
pub struct AddressFilter;

impl Filter for AddressFilter {
    fn name(&self) -> &str {
        "fhir_address"
    }

    fn documentation(&self) -> &str {
        "Parses a comma separated address into {line, city, state, postalCode, country: US}."
    }

    fn apply(&self, value: &Value, _params: &[Value]) -> Value {
        let Some(text) = value.as_str() else {
            return value.clone();
        };

        let mut segments: Vec<&str> = text.split(',').map(str::trim).collect();
        while segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }

        let mut address = ValueMap::new();
        if let Some((street, rest)) = segments.split_first() {
            address.insert(
                "line".to_string(),
                Value::List(vec![Value::string(*street)]),
            );
            for (field, segment) in FIELDS.iter().zip(rest) {
                address.insert(field.to_string(), Value::string(*segment));
            }
        }
        address.insert("country".to_string(), Value::string(COUNTRY));

        Value::Map(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Value {
        AddressFilter.apply(&Value::string(text), &[])
    }

    #[test]
    fn test_full_address() {
        let address = parse("123 Main St,Boston,MA,02101");
        assert_eq!(
            address.get("line"),
            Some(&Value::List(vec![Value::string("123 Main St")]))
        );
        assert_eq!(address.get("city"), Some(&Value::string("Boston")));
        assert_eq!(address.get("state"), Some(&Value::string("MA")));
        assert_eq!(address.get("postalCode"), Some(&Value::string("02101")));
        assert_eq!(address.get("country"), Some(&Value::string("US")));
    }

    #[test]
    fn test_extra_segments_are_ignored() {
        let address = parse("1 Rue Lepic, Paris, IDF, 75018, France");
        assert_eq!(address.get("postalCode"), Some(&Value::string("75018")));
        assert_eq!(address.get("country"), Some(&Value::string("US")));
        assert_eq!(address.as_map().unwrap().len(), 5);
    }

    #[test]
    fn test_partial_address() {
        let address = parse("42 Elm Rd, Springfield,");
        let map = address.as_map().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("city"), Some(&Value::string("Springfield")));
        assert_eq!(map.get("state"), None);
    }

    #[test]
    fn test_blank_address_only_has_country() {
        let address = parse("  ");
        assert_eq!(address.as_map().unwrap().len(), 1);
        assert_eq!(address.get("country"), Some(&Value::string("US")));
    }

    #[test]
    fn test_non_string_passes_through() {
        let list = Value::List(vec![Value::string("a")]);
        assert_eq!(AddressFilter.apply(&list, &[]), list);
        assert_eq!(AddressFilter.apply(&Value::Nil, &[]), Value::Nil);
    }
}
