//! Value constraints declared by attribute characteristics.
//!
//! These checks run after a value has passed its type check: canonical
//! values, reference kinds, uniqueness within a multi-valued attribute and
//! exclusivity of the `primary` flag.

use super::registry::ResourceTypeRegistry;
use super::types::{AttributeDefinition, Uniqueness};
use crate::error::{ValidationError, ValidationResult};

use serde_json::Value;
use url::Url;

/// Reference kind accepting absolute URIs and server-relative paths.
pub const REFERENCE_URI: &str = "uri";
/// Reference kind accepting any string.
pub const REFERENCE_EXTERNAL: &str = "external";

/// Fail unless `value` is one of the declared canonical values.
///
/// Comparison is literal, whatever `caseExact` says. Non-string values are
/// compared by their JSON text.
pub fn check_canonical_value(
    attribute: &AttributeDefinition,
    path: &str,
    value: &Value,
) -> ValidationResult<()> {
    if attribute.canonical_values.is_empty() {
        return Ok(());
    }
    let literal = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if attribute.canonical_values.contains(&literal) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCanonicalValue {
            attribute: path.to_string(),
            value: literal,
            allowed: attribute.canonical_values.clone(),
        })
    }
}

/// Fail unless one of the declared reference types accepts `value`.
///
/// Reference types are tried in declaration order. `uri` accepts anything
/// [`Url`] parses plus server-relative paths such as `/Users/2819c223`,
/// `external` accepts any string and every other token must name a
/// registered resource type.
pub fn check_reference(
    registry: &ResourceTypeRegistry,
    attribute: &AttributeDefinition,
    path: &str,
    value: &str,
) -> ValidationResult<()> {
    if attribute.reference_types.is_empty() {
        return Ok(());
    }
    let accepted = attribute
        .reference_types
        .iter()
        .any(|kind| match kind.as_str() {
            REFERENCE_URI => is_uri(value),
            REFERENCE_EXTERNAL => true,
            resource_type => registry.contains_resource_type(resource_type),
        });
    if accepted {
        Ok(())
    } else {
        Err(ValidationError::InvalidReference {
            attribute: path.to_string(),
            value: value.to_string(),
            reference_types: attribute.reference_types.clone(),
        })
    }
}

fn is_uri(value: &str) -> bool {
    Url::parse(value).is_ok()
        || (value.starts_with('/') && !value.chars().any(char::is_whitespace))
}

/// Fail if a multi-valued attribute declared unique repeats an element.
///
/// Simple elements compare by literal equality and complex elements by
/// full structural equality.
pub fn check_unique_elements(
    attribute: &AttributeDefinition,
    path: &str,
    elements: &[Value],
) -> ValidationResult<()> {
    if !attribute.multi_valued || attribute.uniqueness == Uniqueness::None {
        return Ok(());
    }
    for (index, element) in elements.iter().enumerate() {
        if elements[..index].contains(element) {
            let value = match element {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(ValidationError::UniquenessViolation {
                attribute: path.to_string(),
                value,
            });
        }
    }
    Ok(())
}

/// Fail if more than one element of a multi-valued complex attribute has
/// `primary` set to `true`.
pub fn check_single_primary(
    attribute: &AttributeDefinition,
    path: &str,
    elements: &[Value],
) -> ValidationResult<()> {
    if !attribute.has_primary_sub_attribute() {
        return Ok(());
    }
    let primaries = elements
        .iter()
        .filter(|element| element.get("primary") == Some(&Value::Bool(true)))
        .count();
    if primaries > 1 {
        Err(ValidationError::MultiplePrimaryValues {
            attribute: path.to_string(),
        })
    } else {
        Ok(())
    }
}
