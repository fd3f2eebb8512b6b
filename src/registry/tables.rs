//! Static mapping tables used by the FHIR filters

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Read-only lookup tables handed to the filters at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterTables {
    /// Code tables selected by the `fhir_code` parameter (`gender`, `marital`, ...)
    pub code_tables: FxHashMap<String, FxHashMap<String, String>>,

    /// Identifier type (uppercase) to system URI
    pub identifier_systems: FxHashMap<String, String>,

    /// System URI for identifier types missing from `identifier_systems`
    pub identifier_fallback_system: String,

    /// Unit name to UCUM code, case-sensitive
    pub units: FxHashMap<String, String>,

    /// Code system URI stamped on every quantity
    pub unit_system: String,
}

impl FilterTables {
    /// Look up `code` in the table named `table`
    pub fn code(&self, table: &str, code: &str) -> Option<&str> {
        self.code_tables
            .get(table)
            .and_then(|t| t.get(code))
            .map(String::as_str)
    }

    /// System URI for an identifier type; falls back for unknown types
    pub fn identifier_system(&self, kind: &str) -> &str {
        self.identifier_systems
            .get(&kind.to_uppercase())
            .map(String::as_str)
            .unwrap_or(&self.identifier_fallback_system)
    }

    /// UCUM code for a unit name, if mapped
    pub fn unit_code(&self, unit: &str) -> Option<&str> {
        self.units.get(unit).map(String::as_str)
    }
}

fn table(pairs: &[(&str, &str)]) -> FxHashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for FilterTables {
    fn default() -> Self {
        let mut code_tables = FxHashMap::default();
        code_tables.insert(
            "gender".to_string(),
            table(&[("M", "male"), ("F", "female"), ("O", "other"), ("U", "unknown")]),
        );
        code_tables.insert(
            "marital".to_string(),
            table(&[("S", "S"), ("M", "M"), ("D", "D"), ("W", "W")]),
        );

        Self {
            code_tables,
            identifier_systems: table(&[
                ("SSN", "http://hl7.org/fhir/sid/us-ssn"),
                ("MRN", "urn:oid:1.2.3.4.5.6.7"),
                ("DL", "urn:oid:2.16.840.1.113883.4.3.25"),
                ("PASSPORT", "http://hl7.org/fhir/sid/passport-USA"),
            ]),
            identifier_fallback_system: "urn:oid:1.2.3.4.5".to_string(),
            units: table(&[
                ("mg", "mg"),
                ("milligram", "mg"),
                ("g", "g"),
                ("gram", "g"),
                ("ml", "mL"),
                ("milliliter", "mL"),
                ("mmHg", "mm[Hg]"),
                ("bpm", "/min"),
            ]),
            unit_system: "http://unitsofmeasure.org".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let tables = FilterTables::default();
        assert_eq!(tables.code("gender", "F"), Some("female"));
        assert_eq!(tables.code("marital", "W"), Some("W"));
        assert_eq!(tables.code("religion", "X"), None);
        assert_eq!(tables.identifier_system("ssn"), "http://hl7.org/fhir/sid/us-ssn");
        assert_eq!(tables.identifier_system("NPI"), "urn:oid:1.2.3.4.5");
        assert_eq!(tables.unit_code("mmHg"), Some("mm[Hg]"));
        assert_eq!(tables.unit_code("MG"), None);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tables: FilterTables =
            serde_json::from_str(r#"{"unitSystem": "urn:example:units"}"#).unwrap();
        assert_eq!(tables.unit_system, "urn:example:units");
        // Fields not present fall back to the struct default, not to empty tables
        assert_eq!(tables.unit_code("bpm"), Some("/min"));
    }
}
