//! Structured-output contract handed to every model call of a run.

use serde_json::{Map, Value, json};
use std::collections::HashMap;

use crate::features::FeatureDescriptor;

pub const SCHEMA_TITLE: &str = "DynamicFeatureModel";
pub const SCHEMA_DESCRIPTION: &str = "Features contained in the creative writing text";

/// One named field of the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub description: String,
    pub levels: Vec<String>,
}

/// Record type with one field per feature, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    fields: Vec<SchemaField>,
}

impl FeatureSchema {
    pub fn from_descriptors(descriptors: &[FeatureDescriptor]) -> Self {
        let fields = descriptors
            .iter()
            .map(|d| SchemaField {
                name: d.identity().to_string(),
                description: d.description(),
                levels: d.levels().as_slice().to_vec(),
            })
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// JSON Schema object. Every field is "one of levels, or any string".
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let property = if field.levels.is_empty() {
                json!({
                    "description": field.description,
                    "type": "string"
                })
            } else {
                json!({
                    "description": field.description,
                    "anyOf": [
                        {"type": "string", "enum": field.levels},
                        {"type": "string"}
                    ]
                })
            };
            properties.insert(field.name.clone(), property);
        }
        json!({
            "title": SCHEMA_TITLE,
            "description": SCHEMA_DESCRIPTION,
            "type": "object",
            "properties": properties,
            "required": self.field_names(),
            "additionalProperties": false
        })
    }

    /// Prompt text asking for a JSON object matching the schema, for providers
    /// without native structured output.
    pub fn format_instructions(&self) -> String {
        let schema = serde_json::to_string(&self.to_json_schema()).unwrap_or_default();
        format!(
            "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
             As an example, for the schema {{\"properties\": {{\"foo\": {{\"title\": \"Foo\", \"description\": \"a list of strings\", \"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}}\n\
             the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance of the schema. \
             The object {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not well-formatted.\n\n\
             Here is the output schema:\n```\n{}\n```\n\
             Respond with the JSON object only.",
            schema
        )
    }
}

/// A model's answer: field name to answered string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredAnswer {
    values: HashMap<String, String>,
}

impl StructuredAnswer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read a JSON object. Scalars are stringified; null fields are left out.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut answer = Self::new();
        for (key, v) in object {
            match v {
                Value::Null => {}
                Value::String(s) => answer.insert(key.clone(), s.clone()),
                other => answer.insert(key.clone(), other.to_string()),
            }
        }
        Some(answer)
    }
}
