//! Schema-driven validation for SCIM 2.0 resources.
//!
//! Validates incoming SCIM documents against their schemas and shapes
//! outgoing documents according to each attribute's declared visibility.
//! Schemas are themselves validated by the same engine against the SCIM
//! meta-schema.
//!
//! # Core Components
//!
//! - [`ResourceTypeRegistry`] - Schemas and resource types, plus the
//!   request and response validation entry points
//! - [`Schema`] / [`ResourceType`] - Parsed, immutable definitions
//! - [`ValidationError`] - The single failure channel of the engine
//!
//! # Quick Start
//!
//! ```rust
//! use scim_schema_validator::{ResourceTypeRegistry, ResponseContext};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ResourceTypeRegistry::with_core_resource_types()?;
//! let user = registry.resource_type("User").expect("User is registered");
//!
//! let stored = json!({
//!     "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!     "id": "2819c223-7f76-453a-919d-413861904646",
//!     "userName": "bjensen",
//!     "password": "t1meMa$heen"
//! });
//! let response = registry.validate_document_for_response(&user, &stored, &ResponseContext::default())?;
//! assert!(response.get("password").is_none());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod schema;

// Re-export commonly used types for convenience
pub use config::ValidatorConfig;
pub use error::{FormatError, ScimError, ScimResult, ValidationError, ValidationResult, ViolationKind};
pub use schema::{
    AttributeDefinition, HttpMethod, ResourceType, ResourceTypeRegistry, ResponseContext, Schema,
    ValidatedDocument,
};
