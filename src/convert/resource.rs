//! Parsed resources and the JSON resource codec

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Errors raised by resource parsers and serializers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// Rendered text is not an acceptable resource
    #[error("{0}")]
    Parse(String),

    /// The resource could not be written out
    #[error("{0}")]
    Serialization(String),
}

/// A parsed resource: type tag, optional id and the full element tree
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    resource_type: String,
    id: Option<String>,
    content: Map<String, JsonValue>,
}

impl Resource {
    /// Assemble a resource from its parts
    pub fn new(
        resource_type: impl Into<String>,
        id: Option<String>,
        content: Map<String, JsonValue>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            id,
            content,
        }
    }

    /// Resource type tag, e.g. `Patient`
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Logical id, if the resource has one
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Element tree, including `resourceType` and `id`
    pub fn content(&self) -> &Map<String, JsonValue> {
        &self.content
    }

    /// Top-level element by name
    pub fn element(&self, name: &str) -> Option<&JsonValue> {
        self.content.get(name)
    }
}

/// Turns rendered template text into a resource
pub trait ResourceParser: Send + Sync {
    /// Parse rendered text
    fn parse(&self, text: &str) -> Result<Resource, ResourceError>;
}

/// Turns a resource back into text
pub trait ResourceSerializer: Send + Sync {
    /// Serialize a resource
    fn serialize(&self, resource: &Resource) -> Result<String, ResourceError>;
}

/// FHIR JSON parser and serializer
///
/// Parsing drops empty elements (`null`, `""`, `[]`, `{}`) recursively, so a
/// template may emit optional fields unconditionally.
#[derive(Debug, Clone, Copy)]
pub struct JsonResourceCodec {
    pretty: bool,
}

impl JsonResourceCodec {
    /// Create a codec; `pretty` selects indented output
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl Default for JsonResourceCodec {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ResourceParser for JsonResourceCodec {
    fn parse(&self, text: &str) -> Result<Resource, ResourceError> {
        let json: JsonValue =
            serde_json::from_str(text).map_err(|e| ResourceError::Parse(e.to_string()))?;

        let JsonValue::Object(object) = json else {
            return Err(ResourceError::Parse(format!(
                "expected a JSON object, found {}",
                json_kind(&json)
            )));
        };

        let content = prune_object(object);
        let resource_type = match content.get("resourceType") {
            Some(JsonValue::String(kind)) => kind.clone(),
            Some(other) => {
                return Err(ResourceError::Parse(format!(
                    "resourceType must be a string, found {}",
                    json_kind(other)
                )));
            }
            None => return Err(ResourceError::Parse("missing resourceType".to_string())),
        };
        let id = match content.get("id") {
            Some(JsonValue::String(id)) => Some(id.clone()),
            Some(other) => {
                return Err(ResourceError::Parse(format!(
                    "id must be a string, found {}",
                    json_kind(other)
                )));
            }
            None => None,
        };

        Ok(Resource {
            resource_type,
            id,
            content,
        })
    }
}

impl ResourceSerializer for JsonResourceCodec {
    fn serialize(&self, resource: &Resource) -> Result<String, ResourceError> {
        let result = if self.pretty {
            serde_json::to_string_pretty(&resource.content)
        } else {
            serde_json::to_string(&resource.content)
        };
        result.map_err(|e| ResourceError::Serialization(e.to_string()))
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

fn prune_object(object: Map<String, JsonValue>) -> Map<String, JsonValue> {
    object
        .into_iter()
        .filter_map(|(key, value)| prune(value).map(|value| (key, value)))
        .collect()
}

/// `None` when the value is empty after pruning its children
fn prune(value: JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::Array(items) => {
            let items: Vec<JsonValue> = items.into_iter().filter_map(prune).collect();
            (!items.is_empty()).then_some(JsonValue::Array(items))
        }
        JsonValue::Object(object) => {
            let object = prune_object(object);
            (!object.is_empty()).then_some(JsonValue::Object(object))
        }
        other => Some(other),
    }
}
