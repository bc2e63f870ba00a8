//! Schema definitions and validation for SCIM resources.
//!
//! This module provides the resource type registry and the validation engine
//! implementing RFC 7643 attribute characteristics and RFC 7644 attribute
//! selection.
//!
//! # Key Types
//!
//! - [`Schema`] - SCIM schema definition with attributes and metadata
//! - [`ResourceType`] - A main schema composed with extension schemas
//! - [`ResourceTypeRegistry`] - Registry of schemas and resource types, and
//!   home of the request / response validation entry points
//! - [`ValidatedDocument`] - Validation output annotated with SCIM names
//!
//! # Examples
//!
//! ```rust
//! use scim_schema_validator::schema::{HttpMethod, ResourceTypeRegistry};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ResourceTypeRegistry::with_core_resource_types()?;
//! let user = registry.resource_type("User").expect("User is registered");
//!
//! let request = json!({
//!     "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!     "id": "ignored",
//!     "userName": "bjensen"
//! });
//! let validated = registry.validate_document_for_request(&user, &request, HttpMethod::Post)?;
//! assert!(validated.get("id").is_none());
//! # Ok(())
//! # }
//! ```

pub mod constraints;
pub mod datetime;
pub mod document;
pub mod embedded;
pub mod path;
pub mod registry;
pub mod resource_type;
pub mod types;
pub mod validation;


// Re-export the main types for convenience
pub use document::ValidatedDocument;
pub use path::{AttributeSelection, ResolvedSelection, ResolvedSelector};
pub use registry::ResourceTypeRegistry;
pub use resource_type::{ResourceType, SchemaExtension};
pub use types::{
    AttributeDefinition, AttributeType, Mutability, Returned, Schema, Uniqueness,
    ENTERPRISE_USER_SCHEMA_URI, GROUP_SCHEMA_URI, RESOURCE_TYPE_SCHEMA_URI, SCHEMA_SCHEMA_URI,
    USER_SCHEMA_URI,
};
pub use validation::{HttpMethod, ResponseContext, ValidationTarget};
