//! Resource type definitions.
//!
//! A [`ResourceType`] composes one main [`Schema`](super::Schema) with zero
//! or more extension schemas. Each extension lives in the resource document
//! as a top-level object keyed by the extension's schema URI.

use super::registry::ResourceTypeRegistry;
use super::types::Schema;
use super::validation::ResponseContext;
use crate::error::{ScimResult, ValidationError, ValidationResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A SCIM resource type as described by RFC 7643 section 6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceType {
    /// Server unique id, usually equal to the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Resource type name, e.g. `User`
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Endpoint relative to the service base URL, e.g. `/Users`
    pub endpoint: String,
    /// URI of the main schema
    pub schema: String,
    /// Extension schemas in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema_extensions: Vec<SchemaExtension>,
}

/// An extension schema attached to a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaExtension {
    /// URI of the extension schema
    pub schema: String,
    /// Whether resources of this type must carry the extension
    pub required: bool,
}

impl ResourceType {
    /// Build a resource type from a resource type document.
    ///
    /// The document is validated against the ResourceType meta-schema
    /// before it is deserialized.
    pub fn from_document(document: &Value) -> ValidationResult<Self> {
        let registry = ResourceTypeRegistry::new();
        let validated = registry.validate_document_for_response(
            Schema::resource_type_meta_schema(),
            document,
            &ResponseContext::default(),
        )?;
        let resource_type: ResourceType = serde_json::from_value(validated.into_value())
            .map_err(|e| ValidationError::invalid_definition("schemaExtensions", e.to_string()))?;

        let mut seen = Vec::with_capacity(resource_type.schema_extensions.len());
        for extension in &resource_type.schema_extensions {
            if extension.schema == resource_type.schema || seen.contains(&&extension.schema) {
                return Err(ValidationError::invalid_definition(
                    "schemaExtensions.schema",
                    format!("schema '{}' is declared more than once", extension.schema),
                ));
            }
            seen.push(&extension.schema);
        }
        Ok(resource_type)
    }

    /// Build a resource type from a JSON string.
    pub fn from_json_str(content: &str) -> ScimResult<Self> {
        let document: Value = serde_json::from_str(content)?;
        Ok(Self::from_document(&document)?)
    }

    /// Find a declared extension by its schema URI.
    pub fn extension(&self, schema_id: &str) -> Option<&SchemaExtension> {
        self.schema_extensions
            .iter()
            .find(|extension| extension.schema == schema_id)
    }

    /// Whether `schema_id` is the main schema or one of the extensions.
    pub fn declares_schema(&self, schema_id: &str) -> bool {
        self.schema == schema_id || self.extension(schema_id).is_some()
    }
}
