//! Serializers turn model instances into JSON for API responses.
//!
//! All implementations must be `Send + Sync` so views can share them.

use std::fmt;
use std::sync::Arc;

use brackets_core::{DjangoError, DjangoResult};
use serde_json::{Map, Value};

/// Converts an instance into its API representation.
pub trait Serializer: Send + Sync {
    /// A name for error messages and logs.
    fn name(&self) -> &str;

    /// Serializes one instance.
    fn serialize(&self, instance: &Value) -> DjangoResult<Value>;
}

/// A shared serializer class.
pub type SerializerRef = Arc<dyn Serializer>;

impl fmt::Debug for dyn Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("name", &self.name())
            .finish()
    }
}

/// Picks a fixed list of fields out of JSON objects.
///
/// Arrays are serialized element by element. Fields missing from an
/// instance come out as `null`.
///
/// # Examples
///
/// ```
/// use brackets_rest::{FieldSerializer, Serializer};
/// use serde_json::json;
///
/// let serializer = FieldSerializer::new("ArticleSerializer", &["id", "title"]);
/// let out = serializer
///     .serialize(&json!({"id": 7, "title": "Hi", "body": "..."}))
///     .unwrap();
/// assert_eq!(out, json!({"id": 7, "title": "Hi"}));
/// ```
#[derive(Debug, Clone)]
pub struct FieldSerializer {
    name: String,
    fields: Vec<String>,
}

impl FieldSerializer {
    pub fn new(name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            fields: fields.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Wraps this serializer in an [`Arc`].
    pub fn into_ref(self) -> SerializerRef {
        Arc::new(self)
    }

    fn serialize_object(&self, object: &Map<String, Value>) -> Value {
        let picked: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.clone(), object.get(field).cloned().unwrap_or(Value::Null)))
            .collect();
        Value::Object(picked)
    }
}

impl Serializer for FieldSerializer {
    fn name(&self) -> &str {
        &self.name
    }

    /// # Errors
    ///
    /// Returns [`DjangoError::SerializationError`] for anything other than
    /// an object or an array of objects.
    fn serialize(&self, instance: &Value) -> DjangoResult<Value> {
        match instance {
            Value::Object(object) => Ok(self.serialize_object(object)),
            Value::Array(items) => items
                .iter()
                .map(|item| self.serialize(item))
                .collect::<DjangoResult<Vec<_>>>()
                .map(Value::Array),
            other => Err(DjangoError::SerializationError(format!(
                "{} expects a JSON object, got `{other}`",
                self.name
            ))),
        }
    }
}
