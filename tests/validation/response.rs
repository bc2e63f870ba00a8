//! Response validation tests.
//!
//! Server output is shaped by each attribute's `returned` characteristic and
//! by the `attributes` / `excludedAttributes` query parameters.

use super::*;
use scim_schema_validator::schema::{ENTERPRISE_USER_SCHEMA_URI, USER_SCHEMA_URI};
use scim_schema_validator::{HttpMethod, ResponseContext, ValidationError};
use serde_json::json;

#[test]
fn test_default_response_keeps_default_and_always_attributes() {
    let registry = core_registry();
    let user_type = registry.resource_type("User").unwrap();
    let stored = rfc_examples::user_full();

    let response = assert_validation_success!(registry.validate_document_for_response(
        &user_type,
        &stored,
        &ResponseContext::default()
    ));

    assert!(response.get("password").is_none());
    for kept in ["id", "userName", "name", "emails", "groups", "meta"] {
        assert_eq!(response[kept], stored[kept], "{kept}");
    }
    assert_eq!(response["schemas"], stored["schemas"]);
}

#[test]
fn test_response_requires_id() {
    let registry = core_registry();
    let group_type = registry.resource_type("Group").unwrap();
    let group = modify_json(rfc_examples::group_basic(), "id", None);
    let result = registry.validate_document_for_response(&group_type, &group, &ResponseContext::default());
    assert_validation_error!(
        result,
        ValidationError::MissingRequiredAttribute { attribute } if attribute == "id"
    );
}

#[test]
fn test_attributes_narrow_the_response() {
    let registry = core_registry();
    let user_type = registry.resource_type("User").unwrap();
    let response = registry
        .validate_document_for_response(
            &user_type,
            &rfc_examples::user_full(),
            &ResponseContext::new().with_attributes("userName, name.familyName"),
        )
        .unwrap();

    let mut keys: Vec<&str> = response.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["id", "meta", "name", "schemas", "userName"]);
    assert_eq!(response["name"], json!({"familyName": "Jensen"}));
}

#[test]
fn test_selecting_a_parent_returns_all_children() {
    let registry = core_registry();
    let response = registry
        .validate_document_for_response(
            &user_schema(),
            &rfc_examples::user_full(),
            &ResponseContext::new().with_attributes("emails"),
        )
        .unwrap();
    assert_eq!(response["emails"], rfc_examples::user_full()["emails"]);
    assert!(response.get("name").is_none());
}

#[test]
fn test_fully_qualified_selector() {
    let registry = core_registry();
    let selector = format!("{USER_SCHEMA_URI}:name.givenName");
    let response = registry
        .validate_document_for_response(
            &user_schema(),
            &rfc_examples::user_full(),
            &ResponseContext::new().with_attributes(&selector),
        )
        .unwrap();
    assert_eq!(response["name"], json!({"givenName": "Barbara"}));
}

#[test]
fn test_selector_matching_nothing_returns_always_attributes() {
    let registry = core_registry();
    let response = registry
        .validate_document_for_response(
            &user_schema(),
            &rfc_examples::user_full(),
            &ResponseContext::new().with_attributes("doesNotExist"),
        )
        .unwrap();
    let mut keys: Vec<&str> = response.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["id", "meta", "schemas"]);
}

#[test]
fn test_malformed_selectors_are_ignored() {
    let registry = core_registry();
    let response = registry
        .validate_document_for_response(
            &user_schema(),
            &rfc_examples::user_full(),
            &ResponseContext::new().with_attributes("user name,,displayName"),
        )
        .unwrap();
    assert_eq!(response["displayName"], json!("Babs Jensen"));
    assert!(response.get("userName").is_none());
}

#[test]
fn test_excluded_attributes_remove_default_attributes() {
    let registry = core_registry();
    let response = registry
        .validate_document_for_response(
            &user_schema(),
            &rfc_examples::user_full(),
            &ResponseContext::new().with_excluded_attributes("emails,name.formatted,id"),
        )
        .unwrap();
    assert!(response.get("emails").is_none());
    assert!(response["name"].get("formatted").is_none());
    assert_eq!(response["name"]["givenName"], json!("Barbara"));
    assert!(response.get("id").is_some(), "always attributes cannot be excluded");
}

#[test]
fn test_attributes_take_precedence_over_excluded_attributes() {
    let registry = core_registry();
    let response = registry
        .validate_document_for_response(
            &user_schema(),
            &rfc_examples::user_full(),
            &ResponseContext::new()
                .with_attributes("displayName")
                .with_excluded_attributes("displayName"),
        )
        .unwrap();
    assert_eq!(response["displayName"], json!("Babs Jensen"));
}

#[test]
fn test_request_attribute_echoed_after_write() {
    let registry = core_registry();
    let schema = SchemaBuilder::from_document(parse_user_schema())
        .with_characteristics("nickName", json!({"returned": "request"}))
        .build();
    let schema = scim_schema_validator::Schema::from_document(&schema).unwrap();
    let stored = rfc_examples::user_full();

    let plain = registry
        .validate_document_for_response(&schema, &stored, &ResponseContext::default())
        .unwrap();
    assert!(plain.get("nickName").is_none());

    let request = registry
        .validate_document_for_request(&schema, &stored, HttpMethod::Put)
        .unwrap();
    let echoed = registry
        .validate_document_for_response(
            &schema,
            &stored,
            &ResponseContext::new().with_validated_request(&request),
        )
        .unwrap();
    assert_eq!(echoed["nickName"], json!("Babs"));
}

#[test]
fn test_request_attribute_excluded_is_still_echoed() {
    let registry = core_registry();
    let schema = SchemaBuilder::from_document(parse_user_schema())
        .with_characteristics("nickName", json!({"returned": "request"}))
        .build();
    let schema = scim_schema_validator::Schema::from_document(&schema).unwrap();
    let stored = rfc_examples::user_full();
    let request = json!({"schemas": [USER_SCHEMA_URI], "userName": "x", "nickName": "Babs"});
    let echoed = registry
        .validate_document_for_response(
            &schema,
            &stored,
            &ResponseContext::new()
                .with_validated_request(&request)
                .with_excluded_attributes("nickName"),
        )
        .unwrap();
    assert_eq!(echoed["nickName"], json!("Babs"));
}

#[test]
fn test_response_is_idempotent() {
    let registry = core_registry();
    let user_type = registry.resource_type("User").unwrap();
    let context = ResponseContext::new().with_excluded_attributes("userName,name");
    let once = registry
        .validate_document_for_response(&user_type, &rfc_examples::user_enterprise(), &context)
        .unwrap();
    let twice = registry
        .validate_document_for_response(&user_type, &once, &context)
        .unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_bare_uri_excludes_extension_and_its_declaration() {
    let registry = core_registry();
    let user_type = registry.resource_type("User").unwrap();
    let response = registry
        .validate_document_for_response(
            &user_type,
            &rfc_examples::user_enterprise(),
            &ResponseContext::new().with_excluded_attributes(ENTERPRISE_USER_SCHEMA_URI),
        )
        .unwrap();
    assert!(response.get(ENTERPRISE_USER_SCHEMA_URI).is_none());
    assert_eq!(response["schemas"], json!([USER_SCHEMA_URI]));
    assert_eq!(response["userName"], json!("bjensen@example.com"));
}

#[test]
fn test_bare_uri_selects_only_that_schema() {
    let registry = core_registry();
    let user_type = registry.resource_type("User").unwrap();
    let response = registry
        .validate_document_for_response(
            &user_type,
            &rfc_examples::user_enterprise(),
            &ResponseContext::new().with_attributes(ENTERPRISE_USER_SCHEMA_URI),
        )
        .unwrap();
    assert!(response.get("userName").is_none());
    assert_eq!(
        response[ENTERPRISE_USER_SCHEMA_URI]["employeeNumber"],
        json!("701984")
    );
    assert!(response.get("id").is_some());
}

#[test]
fn test_write_only_attribute_is_never_returned() {
    let registry = core_registry();
    let schema = SchemaBuilder::from_document(parse_user_schema())
        .with_characteristics("password", json!({"returned": "always"}))
        .build();
    let schema = scim_schema_validator::Schema::from_document(&schema).unwrap();
    let response = registry
        .validate_document_for_response(
            &schema,
            &rfc_examples::user_full(),
            &ResponseContext::new().with_attributes("password"),
        )
        .unwrap();
    assert!(response.get("password").is_none());
}

fn parse_user_schema() -> serde_json::Value {
    crate::common::parse(scim_schema_validator::schema::embedded::core_user_schema())
}
