//! Resource validation

use super::resource::Resource;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::fmt;

static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-.]{1,64}$").expect("valid id pattern"));

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}(-(0[1-9]|1[0-2])(-(0[1-9]|[12]\d|3[01]))?)?$").expect("valid date pattern")
});

const KNOWN_TYPES: &[&str] = &[
    "AllergyIntolerance",
    "Bundle",
    "Condition",
    "DiagnosticReport",
    "Encounter",
    "Immunization",
    "Medication",
    "MedicationRequest",
    "Observation",
    "Organization",
    "Patient",
    "Practitioner",
    "Procedure",
];

const GENDER_CODES: &[&str] = &["male", "female", "other", "unknown"];

/// Message severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The resource cannot be processed at all
    Fatal,
    /// The resource violates a rule
    Error,
    /// Possible problem
    Warning,
    /// Informational note
    Information,
}

impl Severity {
    /// Whether this severity makes validation unsuccessful
    pub fn is_failure(self) -> bool {
        matches!(self, Severity::Fatal | Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Fatal => "FATAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Information => "INFORMATION",
        })
    }
}

/// One validator finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    /// Severity
    pub severity: Severity,
    /// Element path the message is about
    pub location: String,
    /// Human-readable text
    pub text: String,
}

impl ValidationMessage {
    /// Create a message
    pub fn new(severity: Severity, location: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity,
            location: location.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.text)
    }
}

/// Outcome of validating one resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    entries: Vec<ValidationMessage>,
}

impl ValidationResult {
    /// Wrap validator messages, keeping their order
    pub fn new(entries: Vec<ValidationMessage>) -> Self {
        Self { entries }
    }

    /// True unless some message is FATAL or ERROR
    pub fn is_successful(&self) -> bool {
        !self.entries.iter().any(|m| m.severity.is_failure())
    }

    /// Raw messages
    pub fn entries(&self) -> &[ValidationMessage] {
        &self.entries
    }

    /// Every message, formatted
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// FATAL and ERROR messages, formatted
    pub fn errors(&self) -> Vec<String> {
        self.select(Severity::is_failure)
    }

    /// WARNING messages, formatted
    pub fn warnings(&self) -> Vec<String> {
        self.select(|s| s == Severity::Warning)
    }

    /// INFORMATION messages, formatted
    pub fn information(&self) -> Vec<String> {
        self.select(|s| s == Severity::Information)
    }

    fn select(&self, keep: impl Fn(Severity) -> bool) -> Vec<String> {
        self.entries
            .iter()
            .filter(|m| keep(m.severity))
            .map(ToString::to_string)
            .collect()
    }
}

/// Checks a parsed resource
pub trait ResourceValidator: Send + Sync {
    /// Validate a resource
    fn validate(&self, resource: &Resource) -> ValidationResult;
}

/// Structural checks over the base resource definitions
///
/// Covers the resource types the bundled templates produce: required
/// elements, id syntax, Patient code sets and narrative presence.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    fn required_elements(resource_type: &str) -> &'static [&'static str] {
        match resource_type {
            "Observation" => &["status", "code"],
            "Encounter" => &["status", "class"],
            "MedicationRequest" => &["status", "intent", "subject"],
            "Condition" => &["subject"],
            _ => &[],
        }
    }

    fn check_patient(resource: &Resource, messages: &mut Vec<ValidationMessage>) {
        match resource.element("gender") {
            Some(JsonValue::String(code)) if GENDER_CODES.contains(&code.as_str()) => {}
            Some(other) => messages.push(ValidationMessage::new(
                Severity::Error,
                "Patient.gender",
                format!(
                    "The value provided ({}) is not in the value set 'AdministrativeGender'",
                    display_json(other)
                ),
            )),
            None => {}
        }

        match resource.element("birthDate") {
            Some(JsonValue::String(date)) if DATE_PATTERN.is_match(date) => {}
            Some(other) => messages.push(ValidationMessage::new(
                Severity::Error,
                "Patient.birthDate",
                format!("Not a valid date ({})", display_json(other)),
            )),
            None => {}
        }
    }
}

impl ResourceValidator for StructuralValidator {
    fn validate(&self, resource: &Resource) -> ValidationResult {
        let resource_type = resource.resource_type();
        let mut messages = Vec::new();

        if !KNOWN_TYPES.contains(&resource_type) {
            messages.push(ValidationMessage::new(
                Severity::Fatal,
                resource_type,
                format!("Unknown resource type '{resource_type}'"),
            ));
            return ValidationResult::new(messages);
        }

        if let Some(id) = resource.id() {
            if !ID_PATTERN.is_match(id) {
                messages.push(ValidationMessage::new(
                    Severity::Error,
                    format!("{resource_type}.id"),
                    format!("Invalid Resource id '{id}'"),
                ));
            }
        }

        for element in Self::required_elements(resource_type) {
            if resource.element(element).is_none() {
                messages.push(ValidationMessage::new(
                    Severity::Error,
                    resource_type,
                    format!("{resource_type}.{element}: minimum required = 1, but only found 0"),
                ));
            }
        }

        if resource_type == "Patient" {
            Self::check_patient(resource, &mut messages);
        }

        if resource.element("text").is_none() {
            messages.push(ValidationMessage::new(
                Severity::Warning,
                resource_type,
                "dom-6: A resource should have narrative for robust management",
            ));
        }

        let has_profile = resource
            .element("meta")
            .and_then(|meta| meta.get("profile"))
            .is_some();
        if !has_profile {
            messages.push(ValidationMessage::new(
                Severity::Information,
                resource_type,
                "No profile declared; checked against the base definition only",
            ));
        }

        ValidationResult::new(messages)
    }
}

fn display_json(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
