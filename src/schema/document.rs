//! Output of the validation engine.
//!
//! A [`ValidatedDocument`] owns the sanitized or filtered JSON tree and
//! remembers, for every node, which SCIM attribute it was resolved from.
//! Nodes are addressed by JSON pointer (RFC 6901), the same addressing
//! [`Value::pointer`] uses.

use super::types::{AttributeDefinition, Schema};

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ops::Deref;

/// A JSON document produced by request or response validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument {
    value: Value,
    names: BTreeMap<String, String>,
}

impl ValidatedDocument {
    /// Annotate a resource document whose top level is described by `main`
    /// and whose extension objects are described by `extensions`.
    pub(crate) fn for_resource(value: Value, main: &Schema, extensions: &[&Schema]) -> Self {
        let mut names = BTreeMap::new();
        names.insert(String::new(), main.id.clone());
        if let Value::Object(object) = &value {
            for (key, child) in object {
                let pointer = child_pointer("", key);
                if let Some(extension) = extensions.iter().find(|schema| schema.id == *key) {
                    names.insert(pointer.clone(), extension.id.clone());
                    if let Value::Object(members) = child {
                        annotate_members(
                            &mut names,
                            members,
                            &extension.attributes,
                            &extension.id,
                            "",
                            &pointer,
                        );
                    }
                } else if let Some(attribute) = main.attribute(key) {
                    annotate_attribute(&mut names, child, attribute, &main.id, key, &pointer);
                } else {
                    annotate_plain(&mut names, child, key, &pointer);
                }
            }
        }
        Self { value, names }
    }

    /// Annotate a bare extension object.
    pub(crate) fn for_extension(value: Value, extension: &Schema) -> Self {
        let mut names = BTreeMap::new();
        names.insert(String::new(), extension.id.clone());
        if let Value::Object(members) = &value {
            annotate_members(
                &mut names,
                members,
                &extension.attributes,
                &extension.id,
                "",
                "",
            );
        }
        Self { value, names }
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// The SCIM name of the node at `pointer`.
    ///
    /// Attributes are named `<schema URI>:<dot path>`, the root and
    /// extension objects by their schema URI, and the `schemas` and `meta`
    /// nodes by their plain path. Elements of a multi-valued attribute
    /// carry the attribute's name.
    pub fn scim_node_name(&self, pointer: &str) -> Option<&str> {
        self.names.get(pointer).map(String::as_str)
    }

    /// All annotated nodes as `(pointer, name)` pairs, in pointer order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names
            .iter()
            .map(|(pointer, name)| (pointer.as_str(), name.as_str()))
    }
}

impl Deref for ValidatedDocument {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.value
    }
}

impl From<ValidatedDocument> for Value {
    fn from(document: ValidatedDocument) -> Self {
        document.value
    }
}

fn annotate_members(
    names: &mut BTreeMap<String, String>,
    members: &Map<String, Value>,
    attributes: &[AttributeDefinition],
    schema_id: &str,
    parent_path: &str,
    parent_pointer: &str,
) {
    for (key, child) in members {
        let Some(attribute) = attributes.iter().find(|attribute| attribute.name == *key) else {
            continue;
        };
        let path = if parent_path.is_empty() {
            key.clone()
        } else {
            format!("{parent_path}.{key}")
        };
        let pointer = child_pointer(parent_pointer, key);
        annotate_attribute(names, child, attribute, schema_id, &path, &pointer);
    }
}

fn annotate_attribute(
    names: &mut BTreeMap<String, String>,
    value: &Value,
    attribute: &AttributeDefinition,
    schema_id: &str,
    path: &str,
    pointer: &str,
) {
    let name = format!("{schema_id}:{path}");
    names.insert(pointer.to_string(), name.clone());
    match value {
        Value::Array(elements) => {
            for (index, element) in elements.iter().enumerate() {
                let element_pointer = format!("{pointer}/{index}");
                names.insert(element_pointer.clone(), name.clone());
                if let Value::Object(members) = element {
                    annotate_members(
                        names,
                        members,
                        &attribute.sub_attributes,
                        schema_id,
                        path,
                        &element_pointer,
                    );
                }
            }
        }
        Value::Object(members) => {
            annotate_members(
                names,
                members,
                &attribute.sub_attributes,
                schema_id,
                path,
                pointer,
            );
        }
        _ => {}
    }
}

/// Names nodes outside any schema, such as `schemas` and `meta`.
fn annotate_plain(names: &mut BTreeMap<String, String>, value: &Value, path: &str, pointer: &str) {
    names.insert(pointer.to_string(), path.to_string());
    match value {
        Value::Array(elements) => {
            for index in 0..elements.len() {
                names.insert(format!("{pointer}/{index}"), path.to_string());
            }
        }
        Value::Object(members) => {
            for (key, child) in members {
                annotate_plain(
                    names,
                    child,
                    &format!("{path}.{key}"),
                    &child_pointer(pointer, key),
                );
            }
        }
        _ => {}
    }
}

fn child_pointer(parent: &str, key: &str) -> String {
    format!("{}/{}", parent, key.replace('~', "~0").replace('/', "~1"))
}
