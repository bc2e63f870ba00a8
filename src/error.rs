//! Error types for SCIM schema validation.
//!
//! Every rule the validation engine enforces surfaces as a [`ValidationError`],
//! the single failure channel of the engine. Timestamp parsing produces a
//! [`FormatError`] which is carried inside [`ValidationError::InvalidDateTimeFormat`].
//! [`ScimError`] adds the failures of loading documents from disk or text.

/// Main error type for loading and registering SCIM schemas.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// Validation errors when a document doesn't conform to its schema
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors reading schema or resource type documents from disk
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A schema named by a resource type was not supplied
    #[error("Schema not found: {schema_id}")]
    SchemaNotFound { schema_id: String },
}

/// Category of a validation failure.
///
/// All categories share the [`ValidationError`] channel; the category only
/// tells callers which family of rules was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Missing required attributes, wrong JSON kinds, array/scalar mismatches
    Structural,
    /// Canonical values, uniqueness, primary exclusivity, references, timestamps
    Constraint,
    /// `schemas` attribute problems and failed schema lookups
    SchemaResolution,
}

/// Failure of the timestamp parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid xsd:dateTime: {reason}")]
pub struct FormatError {
    /// The rejected input
    pub value: String,
    /// Why it was rejected
    pub reason: String,
}

impl FormatError {
    pub fn new(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Validation errors for schema compliance checking.
///
/// These errors occur when document data doesn't conform to the schema,
/// providing the attribute path and the rule that was violated.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The document or extension node is not a JSON object
    #[error("Document '{attribute}' must be a JSON object")]
    DocumentNotAnObject { attribute: String },

    /// Required attribute is missing or null
    #[error("Required attribute '{attribute}' is missing")]
    MissingRequiredAttribute { attribute: String },

    /// Attribute value doesn't match expected type
    #[error("Attribute '{attribute}' has invalid type, expected {expected}, got {actual}")]
    InvalidDataType {
        attribute: String,
        expected: String,
        actual: String,
    },

    /// Multi-valued attribute provided as a value that cannot be coerced
    #[error("Attribute '{attribute}' must be multi-valued (array)")]
    ExpectedMultiValue { attribute: String },

    /// Single-valued attribute provided as array
    #[error("Attribute '{attribute}' must be single-valued (not array)")]
    ExpectedSingleValue { attribute: String },

    /// Attribute not declared by any active schema (strict mode only)
    #[error("Unknown attribute '{attribute}' in schema '{schema_id}'")]
    UnknownAttribute {
        attribute: String,
        schema_id: String,
    },

    /// Document nests deeper than the configured limit
    #[error("Attribute '{attribute}' exceeds the maximum nesting depth of {max_depth}")]
    NestingTooDeep { attribute: String, max_depth: usize },

    /// Schema document is well-formed JSON but violates attribute definition rules
    #[error("Invalid definition for attribute '{attribute}': {details}")]
    InvalidSchemaDefinition { attribute: String, details: String },

    /// Required extension object is missing
    #[error("Missing required extension '{schema_id}'")]
    MissingRequiredExtension { schema_id: String },

    /// Invalid value for attribute with canonical values
    #[error("Attribute '{attribute}' has invalid value '{value}', allowed values: {allowed:?}")]
    InvalidCanonicalValue {
        attribute: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Duplicate element in a multi-valued attribute declared unique
    #[error("Attribute '{attribute}' violates uniqueness constraint with value '{value}'")]
    UniquenessViolation { attribute: String, value: String },

    /// Multiple primary values in multi-valued attribute
    #[error("Attribute '{attribute}' cannot have multiple primary values")]
    MultiplePrimaryValues { attribute: String },

    /// Reference value accepted by none of the declared reference types
    #[error(
        "Attribute '{attribute}' has invalid reference '{value}', accepted reference types: {reference_types:?}"
    )]
    InvalidReference {
        attribute: String,
        value: String,
        reference_types: Vec<String>,
    },

    /// Invalid datetime format
    #[error("Attribute '{attribute}' has invalid datetime format: {source}")]
    InvalidDateTimeFormat {
        attribute: String,
        #[source]
        source: FormatError,
    },

    /// Invalid binary data
    #[error("Attribute '{attribute}' has invalid binary data: {details}")]
    InvalidBinaryData { attribute: String, details: String },

    /// Missing schemas attribute
    #[error("Missing required 'schemas' attribute")]
    MissingSchemas,

    /// The schemas attribute is not an array of strings
    #[error("'schemas' attribute must be an array of schema URIs")]
    InvalidSchemasAttribute,

    /// The schemas attribute doesn't name the schema the document is validated against
    #[error("'schemas' attribute does not contain '{schema_id}', found {found:?}")]
    SchemaNotDeclared { schema_id: String, found: Vec<String> },

    /// Unknown schema URI
    #[error("Unknown schema URI: {uri}")]
    UnknownSchemaUri { uri: String },

    /// A resource type names a main schema that doesn't match the schema document
    #[error("Resource type '{resource_type}' expects schema '{expected}' but got '{actual}'")]
    SchemaMismatch {
        resource_type: String,
        expected: String,
        actual: String,
    },

    /// General validation error with custom message
    #[error("Validation failed: {message}")]
    Custom { message: String },
}

impl ValidationError {
    /// Create a missing required attribute error
    pub fn missing_required(attribute: impl Into<String>) -> Self {
        Self::MissingRequiredAttribute {
            attribute: attribute.into(),
        }
    }

    /// Create an invalid type error
    pub fn invalid_type(
        attribute: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::InvalidDataType {
            attribute: attribute.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a schema definition error
    pub fn invalid_definition(attribute: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidSchemaDefinition {
            attribute: attribute.into(),
            details: details.into(),
        }
    }

    /// Create a custom validation error
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }

    /// The family of rules this error belongs to.
    pub fn kind(&self) -> ViolationKind {
        match self {
            Self::DocumentNotAnObject { .. }
            | Self::MissingRequiredAttribute { .. }
            | Self::InvalidDataType { .. }
            | Self::ExpectedMultiValue { .. }
            | Self::ExpectedSingleValue { .. }
            | Self::UnknownAttribute { .. }
            | Self::NestingTooDeep { .. }
            | Self::InvalidSchemaDefinition { .. }
            | Self::MissingRequiredExtension { .. }
            | Self::Custom { .. } => ViolationKind::Structural,
            Self::InvalidCanonicalValue { .. }
            | Self::UniquenessViolation { .. }
            | Self::MultiplePrimaryValues { .. }
            | Self::InvalidReference { .. }
            | Self::InvalidDateTimeFormat { .. }
            | Self::InvalidBinaryData { .. } => ViolationKind::Constraint,
            Self::MissingSchemas
            | Self::InvalidSchemasAttribute
            | Self::SchemaNotDeclared { .. }
            | Self::UnknownSchemaUri { .. }
            | Self::SchemaMismatch { .. } => ViolationKind::SchemaResolution,
        }
    }

    /// The offending attribute path, when the error is tied to one.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Self::DocumentNotAnObject { attribute }
            | Self::MissingRequiredAttribute { attribute }
            | Self::InvalidDataType { attribute, .. }
            | Self::ExpectedMultiValue { attribute }
            | Self::ExpectedSingleValue { attribute }
            | Self::UnknownAttribute { attribute, .. }
            | Self::NestingTooDeep { attribute, .. }
            | Self::InvalidSchemaDefinition { attribute, .. }
            | Self::InvalidCanonicalValue { attribute, .. }
            | Self::UniquenessViolation { attribute, .. }
            | Self::MultiplePrimaryValues { attribute }
            | Self::InvalidReference { attribute, .. }
            | Self::InvalidDateTimeFormat { attribute, .. }
            | Self::InvalidBinaryData { attribute, .. } => Some(attribute),
            Self::MissingSchemas | Self::InvalidSchemasAttribute | Self::SchemaNotDeclared { .. } => {
                Some("schemas")
            }
            Self::MissingRequiredExtension { schema_id } => Some(schema_id),
            Self::UnknownSchemaUri { .. } | Self::SchemaMismatch { .. } | Self::Custom { .. } => {
                None
            }
        }
    }
}

// Result type aliases for convenience
pub type ScimResult<T> = Result<T, ScimError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
