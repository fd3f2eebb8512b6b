//! Error types for resource conversion
//!
//! One variant per failure the conversion pipeline can report. Every variant
//! turns into `errors` entries of a failed conversion result.

use crate::convert::ResourceError;
use crate::store::TemplateError;
use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Comprehensive error type for conversion operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// No template source for the requested resource type
    #[error("Template not found for resource type '{resource_type}': {reason}")]
    TemplateNotFound {
        /// Requested resource type
        resource_type: String,
        /// Human-readable reason
        reason: String,
    },

    /// The template source has syntax errors
    #[error("Template for resource type '{resource_type}' is malformed: {message}")]
    TemplateParse {
        /// Requested resource type
        resource_type: String,
        /// Syntax error with its location
        message: String,
    },

    /// The template failed while rendering
    #[error("Failed to render template for resource type '{resource_type}': {message}")]
    TemplateRender {
        /// Requested resource type
        resource_type: String,
        /// Renderer error message
        message: String,
    },

    /// Rendered text rejected by the resource parser
    #[error("Failed to parse resource: {message}")]
    Parse {
        /// Human-readable error message
        message: String,
    },

    /// The validator reported the resource as unsuccessful
    #[error("Validation failed with {} message(s)", messages.len())]
    ValidationFailed {
        /// Every validator message, formatted `<location>: <text>`
        messages: Vec<String>,
        /// The warning partition of `messages`
        warnings: Vec<String>,
    },

    /// The serializer could not produce output
    #[error("Failed to serialize resource: {message}")]
    Serialization {
        /// Human-readable error message
        message: String,
    },

    /// Request fields failed validation before rendering
    #[error("Invalid request: {}", .0.join("; "))]
    InvalidRequest(Vec<String>),
}

impl ConversionError {
    /// Entries for the `errors` list of a failed result
    ///
    /// Validation and request failures surface every message; everything else
    /// is a single message.
    pub fn errors(&self) -> Vec<String> {
        match self {
            ConversionError::ValidationFailed { messages, .. } => messages.clone(),
            ConversionError::InvalidRequest(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Entries for the `warnings` list of a failed result
    pub fn warnings(&self) -> Vec<String> {
        match self {
            ConversionError::ValidationFailed { warnings, .. } => warnings.clone(),
            _ => Vec::new(),
        }
    }
}

impl From<TemplateError> for ConversionError {
    fn from(error: TemplateError) -> Self {
        match error {
            TemplateError::NotFound {
                resource_type,
                reason,
            } => ConversionError::TemplateNotFound {
                resource_type,
                reason,
            },
            TemplateError::Parse {
                resource_type,
                message,
            } => ConversionError::TemplateParse {
                resource_type,
                message,
            },
            TemplateError::Render {
                resource_type,
                message,
            } => ConversionError::TemplateRender {
                resource_type,
                message,
            },
        }
    }
}

impl From<ResourceError> for ConversionError {
    fn from(error: ResourceError) -> Self {
        match error {
            ResourceError::Parse(message) => ConversionError::Parse { message },
            ResourceError::Serialization(message) => ConversionError::Serialization { message },
        }
    }
}
