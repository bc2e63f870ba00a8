//! Core schema type definitions for SCIM resources.
//!
//! This module contains the data structures that describe SCIM schemas and
//! their attribute characteristics as specified in RFC 7643 section 7. A
//! [`Schema`] is built once from a schema document and is immutable
//! afterwards.

use super::embedded;
use super::registry::ResourceTypeRegistry;
use super::validation::ResponseContext;
use crate::error::{ScimResult, ValidationError, ValidationResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Identifier of the meta-schema describing schema documents.
pub const SCHEMA_SCHEMA_URI: &str = "urn:ietf:params:scim:schemas:core:2.0:Schema";
/// Identifier of the meta-schema describing resource type documents.
pub const RESOURCE_TYPE_SCHEMA_URI: &str = "urn:ietf:params:scim:schemas:core:2.0:ResourceType";
/// Core User schema identifier.
pub const USER_SCHEMA_URI: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
/// Core Group schema identifier.
pub const GROUP_SCHEMA_URI: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";
/// Enterprise User extension identifier.
pub const ENTERPRISE_USER_SCHEMA_URI: &str =
    "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

/// A SCIM schema definition.
///
/// Represents a complete schema with its metadata and attribute definitions.
/// Each schema defines the structure and validation rules for a resource
/// type like User or Group, or for an extension attached to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Unique schema identifier (URI)
    pub id: String,
    /// Human-readable schema name
    #[serde(default)]
    pub name: String,
    /// Schema description
    #[serde(default)]
    pub description: String,
    /// List of attribute definitions
    pub attributes: Vec<AttributeDefinition>,
}

impl Schema {
    /// Build a schema from a schema document.
    ///
    /// The document is first validated against the SCIM meta-schema, the same
    /// way resource documents are validated against their schemas, so a
    /// malformed schema document fails with a [`ValidationError`].
    pub fn from_document(document: &Value) -> ValidationResult<Self> {
        let registry = ResourceTypeRegistry::new();
        let validated = registry.validate_document_for_response(
            Self::meta_schema(),
            document,
            &ResponseContext::default(),
        )?;
        let schema: Schema = serde_json::from_value(validated.into_value())
            .map_err(|e| ValidationError::invalid_definition("attributes", e.to_string()))?;
        schema.check_definitions()?;
        Ok(schema)
    }

    /// Build a schema from a JSON string.
    pub fn from_json_str(content: &str) -> ScimResult<Self> {
        let document: Value = serde_json::from_str(content)?;
        Ok(Self::from_document(&document)?)
    }

    /// Load a schema from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ScimResult<Self> {
        let content = fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    /// The meta-schema describing schema documents.
    ///
    /// It is parsed once without validation; that it validates its own
    /// document is covered by the test suite.
    pub fn meta_schema() -> &'static Schema {
        static META_SCHEMA: OnceLock<Schema> = OnceLock::new();
        META_SCHEMA.get_or_init(|| {
            serde_json::from_str(embedded::meta_schema())
                .expect("embedded meta-schema must be a valid schema definition")
        })
    }

    /// The meta-schema describing resource type documents.
    pub fn resource_type_meta_schema() -> &'static Schema {
        static RESOURCE_TYPE_META_SCHEMA: OnceLock<Schema> = OnceLock::new();
        RESOURCE_TYPE_META_SCHEMA.get_or_init(|| {
            Schema::from_json_str(embedded::resource_type_meta_schema())
                .expect("embedded resource type meta-schema must validate")
        })
    }

    /// Find a top-level attribute by its exact name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Check the structural invariants of every attribute definition.
    fn check_definitions(&self) -> ValidationResult<()> {
        check_siblings(&self.attributes, "")
    }
}

fn check_siblings(attributes: &[AttributeDefinition], parent: &str) -> ValidationResult<()> {
    let mut seen = HashSet::new();
    for attr in attributes {
        let path = if parent.is_empty() {
            attr.name.clone()
        } else {
            format!("{}.{}", parent, attr.name)
        };
        if attr.name.is_empty() {
            return Err(ValidationError::invalid_definition(
                path,
                "attribute name cannot be empty",
            ));
        }
        if !seen.insert(attr.name.as_str()) {
            return Err(ValidationError::invalid_definition(
                path,
                "attribute name is declared more than once",
            ));
        }
        match (attr.is_complex(), attr.sub_attributes.is_empty()) {
            (true, true) => {
                return Err(ValidationError::invalid_definition(
                    path,
                    "complex attributes must declare sub-attributes",
                ));
            }
            (false, false) => {
                return Err(ValidationError::invalid_definition(
                    path,
                    "only complex attributes may declare sub-attributes",
                ));
            }
            _ => {}
        }
        check_siblings(&attr.sub_attributes, &path)?;
    }
    Ok(())
}

/// Definition of a SCIM attribute.
///
/// Defines all characteristics of an attribute including type,
/// constraints, and validation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    /// Attribute name
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Data type of the attribute
    #[serde(rename = "type")]
    pub data_type: AttributeType,
    /// Whether this attribute can have multiple values
    pub multi_valued: bool,
    /// Whether this attribute is required
    #[serde(default)]
    pub required: bool,
    /// Whether string comparison is case-sensitive
    #[serde(default)]
    pub case_exact: bool,
    /// Mutability characteristics
    #[serde(default)]
    pub mutability: Mutability,
    /// How the attribute is returned in responses
    #[serde(default)]
    pub returned: Returned,
    /// Uniqueness constraints
    #[serde(default)]
    pub uniqueness: Uniqueness,
    /// Closed set of accepted values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub canonical_values: Vec<String>,
    /// Accepted reference kinds for reference attributes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_types: Vec<String>,
    /// Sub-attributes for complex types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_attributes: Vec<AttributeDefinition>,
}

impl Default for AttributeDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            data_type: AttributeType::String,
            multi_valued: false,
            required: false,
            case_exact: false,
            mutability: Mutability::ReadWrite,
            returned: Returned::Default,
            uniqueness: Uniqueness::None,
            canonical_values: Vec::new(),
            reference_types: Vec::new(),
            sub_attributes: Vec::new(),
        }
    }
}

impl AttributeDefinition {
    pub fn is_complex(&self) -> bool {
        self.data_type == AttributeType::Complex
    }

    /// Find a direct sub-attribute by its exact name.
    pub fn sub_attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.sub_attributes.iter().find(|attr| attr.name == name)
    }

    /// Whether elements of this attribute carry a boolean `primary` flag.
    pub fn has_primary_sub_attribute(&self) -> bool {
        self.multi_valued
            && self
                .sub_attribute("primary")
                .is_some_and(|primary| primary.data_type == AttributeType::Boolean)
    }
}

/// SCIM attribute data types.
///
/// Represents the valid data types for SCIM attributes as defined in RFC 7643.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    /// String value
    #[default]
    String,
    /// Boolean value
    Boolean,
    /// Decimal number
    Decimal,
    /// Integer number
    Integer,
    /// xsd:dateTime timestamp
    DateTime,
    /// Binary data (base64 encoded)
    Binary,
    /// URI or resource reference
    Reference,
    /// Complex attribute with sub-attributes
    Complex,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::DateTime => "dateTime",
            Self::Binary => "binary",
            Self::Reference => "reference",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute mutability characteristics.
///
/// Defines whether and how an attribute can be modified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Mutability {
    /// Read-only attribute (managed by server)
    ReadOnly,
    /// Read-write attribute (can be modified by clients)
    #[default]
    ReadWrite,
    /// Immutable attribute (set once, never modified)
    Immutable,
    /// Write-only attribute (passwords, etc.)
    WriteOnly,
}

/// When an attribute is returned in responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Returned {
    /// Always returned, regardless of attribute filters
    Always,
    /// Never returned
    Never,
    /// Returned unless excluded
    #[default]
    Default,
    /// Returned only when requested or just set by the client
    Request,
}

/// Attribute uniqueness constraints.
///
/// Defines the scope of uniqueness for attribute values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Uniqueness {
    /// No uniqueness constraint
    #[default]
    None,
    /// Unique within the server
    Server,
    /// Globally unique
    Global,
}
