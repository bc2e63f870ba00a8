//! Test data builders for creating valid and invalid SCIM documents.
//!
//! Builders start from a valid document and apply one modification at a
//! time, so each test states exactly which rule it breaks.

use super::fixtures::rfc_examples;
use super::modify_json;
use scim_schema_validator::schema::{ENTERPRISE_USER_SCHEMA_URI, SCHEMA_SCHEMA_URI, USER_SCHEMA_URI};
use serde_json::{Value, json};

/// Builder for User resources with fluent API for creating test data
#[derive(Debug, Clone)]
pub struct UserBuilder {
    data: Value,
}

impl UserBuilder {
    /// Create a new UserBuilder with minimal valid User data
    pub fn new() -> Self {
        Self {
            data: rfc_examples::user_minimal(),
        }
    }

    /// Create a UserBuilder with RFC 7643 Section 8.2 full example
    pub fn new_full() -> Self {
        Self {
            data: rfc_examples::user_full(),
        }
    }

    /// Create a UserBuilder with the enterprise extension attached
    pub fn new_enterprise() -> Self {
        Self {
            data: rfc_examples::user_enterprise(),
        }
    }

    pub fn without_schemas(self) -> Self {
        self.without("schemas")
    }

    pub fn with_schemas(mut self, schemas: &[&str]) -> Self {
        self.data["schemas"] = json!(schemas);
        self
    }

    pub fn without_id(self) -> Self {
        self.without("id")
    }

    pub fn without_username(self) -> Self {
        self.without("userName")
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.data["userName"] = json!(username);
        self
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.data["displayName"] = json!(display_name);
        self
    }

    /// Append an email, creating the array when needed
    pub fn with_email(mut self, email: &str, email_type: &str, primary: bool) -> Self {
        let mut entry = json!({"value": email, "type": email_type});
        if primary {
            entry["primary"] = json!(true);
        }
        match self.data.get_mut("emails").and_then(Value::as_array_mut) {
            Some(emails) => emails.push(entry),
            None => self.data["emails"] = json!([entry]),
        }
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.data["password"] = json!(password);
        self
    }

    /// Set an enterprise extension attribute, attaching the extension
    pub fn with_enterprise(mut self, attribute: &str, value: Value) -> Self {
        let schemas = self.data["schemas"].as_array_mut().expect("schemas must be an array");
        if !schemas.iter().any(|id| id == ENTERPRISE_USER_SCHEMA_URI) {
            schemas.push(json!(ENTERPRISE_USER_SCHEMA_URI));
        }
        if !self.data[ENTERPRISE_USER_SCHEMA_URI].is_object() {
            self.data[ENTERPRISE_USER_SCHEMA_URI] = json!({});
        }
        self.data[ENTERPRISE_USER_SCHEMA_URI][attribute] = value;
        self
    }

    /// Set any member by dot path
    pub fn with(mut self, path: &str, value: Value) -> Self {
        self.data = modify_json(self.data, path, Some(value));
        self
    }

    /// Remove any member by dot path
    pub fn without(mut self, path: &str) -> Self {
        self.data = modify_json(self.data, path, None);
        self
    }

    pub fn build(self) -> Value {
        self.data
    }
}

impl Default for UserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for schema documents
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    data: Value,
}

impl SchemaBuilder {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            data: json!({
                "schemas": [SCHEMA_SCHEMA_URI],
                "id": id,
                "name": name,
                "attributes": []
            }),
        }
    }

    /// Start from a copy of an existing schema document
    pub fn from_document(document: Value) -> Self {
        Self { data: document }
    }

    /// Schema with a single required `userName`, declared as the core User
    pub fn new_user_schema() -> Self {
        Self::new(USER_SCHEMA_URI, "User").with_attribute(json!({
            "name": "userName",
            "type": "string",
            "multiValued": false,
            "required": true,
            "caseExact": false,
            "mutability": "readWrite",
            "returned": "default",
            "uniqueness": "server"
        }))
    }

    pub fn with_attribute(mut self, attribute: Value) -> Self {
        self.data["attributes"]
            .as_array_mut()
            .expect("attributes must be an array")
            .push(attribute);
        self
    }

    /// Simple single-valued attribute with default characteristics
    pub fn with_simple(self, name: &str, data_type: &str) -> Self {
        self.with_attribute(json!({
            "name": name,
            "type": data_type,
            "multiValued": false
        }))
    }

    /// Overwrite characteristics of the top-level attribute `name`
    pub fn with_characteristics(mut self, name: &str, characteristics: Value) -> Self {
        let attribute = self.data["attributes"]
            .as_array_mut()
            .and_then(|attributes| attributes.iter_mut().find(|a| a["name"] == name))
            .unwrap_or_else(|| panic!("no attribute {name}"));
        for (key, value) in characteristics.as_object().expect("characteristics must be an object") {
            attribute[key] = value.clone();
        }
        self
    }

    pub fn build(self) -> Value {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_builder_modifications() {
        let user = UserBuilder::new()
            .with_display_name("Babs")
            .with_email("bjensen@example.com", "work", true)
            .without("meta.version")
            .build();
        assert_eq!(user["displayName"], "Babs");
        assert_eq!(user["emails"][0]["primary"], true);
        assert!(user["meta"].get("version").is_none());
    }

    #[test]
    fn test_user_builder_attaches_enterprise_extension() {
        let user = UserBuilder::new()
            .with_enterprise("employeeNumber", json!("701984"))
            .build();
        assert_eq!(user["schemas"].as_array().unwrap().len(), 2);
        assert_eq!(user[ENTERPRISE_USER_SCHEMA_URI]["employeeNumber"], "701984");
    }

    #[test]
    fn test_schema_builder() {
        let schema = SchemaBuilder::new("urn:example:Thing", "Thing")
            .with_simple("label", "string")
            .with_characteristics("label", json!({"required": true}))
            .build();
        assert_eq!(schema["attributes"][0]["required"], true);
    }
}
