//! Property-based tests for the validation engine.
//!
//! Uses proptest to generate documents and attribute selections, checking
//! invariants that must hold for every input the engine accepts.

use super::*;
use proptest::prelude::*;
use scim_schema_validator::schema::{ENTERPRISE_USER_SCHEMA_URI, USER_SCHEMA_URI};
use scim_schema_validator::{HttpMethod, ResponseContext};
use serde_json::{Value, json};

const SELECTORS: &[&str] = &[
    "userName",
    "name",
    "name.givenName",
    "emails",
    "emails.value",
    "displayName",
    "nickName",
    "groups.display",
    "urn:ietf:params:scim:schemas:core:2.0:User:title",
    "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User",
    "employeeNumber",
    "manager.displayName",
    "bogus",
];

/// Comma-joined subset of the known selectors, or no parameter at all
fn selection_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(
        prop::sample::subsequence(SELECTORS.to_vec(), 1..4).prop_map(|chosen| chosen.join(",")),
    )
}

fn method_strategy() -> impl Strategy<Value = HttpMethod> {
    prop::sample::select(vec![HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch])
}

/// Names that are not declared anywhere in the User resource type
fn unknown_name_strategy() -> impl Strategy<Value = String> {
    "x[A-Za-z]{2,10}".prop_filter("must not be a declared attribute", |name| {
        user_schema().attribute(name).is_none()
    })
}

fn json_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<String>().prop_map(|s| json!(s)),
        any::<i32>().prop_map(|n| json!(n)),
        any::<bool>().prop_map(|b| json!(b)),
        Just(json!({"key": "value"})),
        Just(json!(["item1", "item2"])),
    ]
}

prop_compose! {
    fn user_strategy()
        (user_name in "[a-z]{1,12}@example\\.com",
         display_name in prop::option::of("[A-Za-z ]{1,30}"),
         id in "[0-9a-f]{8}",
         password in prop::option::of("[ -~]{1,20}"),
         emails in prop::collection::vec("[a-z]{1,8}@[a-z]{1,8}\\.org", 0..4),
         enterprise in any::<bool>())
        -> Value {
        let mut user = rfc_examples::user_minimal();
        user["id"] = json!(id);
        user["userName"] = json!(user_name);
        if let Some(display_name) = display_name {
            user["displayName"] = json!(display_name);
        }
        if let Some(password) = password {
            user["password"] = json!(password);
        }
        let mut unique = emails.clone();
        unique.sort();
        unique.dedup();
        if !unique.is_empty() {
            user["emails"] = json!(unique.iter().map(|value| json!({"value": value})).collect::<Vec<_>>());
        }
        user["groups"] = json!([{"value": id, "display": "Tour Guides"}]);
        if enterprise {
            user["schemas"] = json!([USER_SCHEMA_URI, ENTERPRISE_USER_SCHEMA_URI]);
            user[ENTERPRISE_USER_SCHEMA_URI] = json!({
                "employeeNumber": id,
                "manager": {"value": "26118915", "displayName": "John Smith"}
            });
        }
        user
    }
}

proptest! {
    #[test]
    fn test_response_validation_is_idempotent(
        user in user_strategy(),
        attributes in selection_strategy(),
        excluded in selection_strategy(),
    ) {
        let registry = core_registry();
        let user_type = registry.resource_type("User").unwrap();
        let mut context = ResponseContext::new();
        if let Some(attributes) = attributes.as_deref() {
            context = context.with_attributes(attributes);
        }
        if let Some(excluded) = excluded.as_deref() {
            context = context.with_excluded_attributes(excluded);
        }

        let once = registry.validate_document_for_response(&user_type, &user, &context).unwrap();
        let twice = registry.validate_document_for_response(&user_type, &once, &context).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_request_validation_is_idempotent(user in user_strategy(), method in method_strategy()) {
        let registry = core_registry();
        let user_type = registry.resource_type("User").unwrap();
        let once = registry.validate_document_for_request(&user_type, &user, method).unwrap();
        let twice = registry.validate_document_for_request(&user_type, &once, method).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_attributes_never_survive(
        user in user_strategy(),
        name in unknown_name_strategy(),
        value in json_value_strategy(),
    ) {
        let registry = core_registry();
        let user_type = registry.resource_type("User").unwrap();
        let mut input = user;
        input[name.as_str()] = value.clone();
        input["name"] = json!({"givenName": "Barbara", name.as_str(): value});

        let request = registry.validate_document_for_request(&user_type, &input, HttpMethod::Post).unwrap();
        prop_assert!(request.get(&name).is_none());
        prop_assert!(request["name"].get(&name).is_none());

        let response = registry
            .validate_document_for_response(&user_type, &input, &ResponseContext::default())
            .unwrap();
        prop_assert!(response.get(&name).is_none());
        prop_assert!(response["name"].get(&name).is_none());
    }

    #[test]
    fn test_read_only_attributes_never_reach_requests(user in user_strategy(), method in method_strategy()) {
        let registry = core_registry();
        let user_type = registry.resource_type("User").unwrap();
        let request = registry.validate_document_for_request(&user_type, &user, method).unwrap();
        prop_assert!(request.get("id").is_none());
        prop_assert!(request.get("groups").is_none());
        prop_assert!(request.get("meta").is_none());
        if let Some(extension) = request.get(ENTERPRISE_USER_SCHEMA_URI) {
            prop_assert!(extension["manager"].get("displayName").is_none());
        }
    }

    #[test]
    fn test_never_returned_attributes_never_reach_responses(
        user in user_strategy(),
        attributes in selection_strategy(),
    ) {
        let registry = core_registry();
        let user_type = registry.resource_type("User").unwrap();
        let selection = attributes.map(|a| format!("{a},password"));
        let mut context = ResponseContext::new();
        if let Some(selection) = selection.as_deref() {
            context = context.with_attributes(selection);
        }
        let response = registry.validate_document_for_response(&user_type, &user, &context).unwrap();
        prop_assert!(response.get("password").is_none());
        prop_assert!(response.get("id").is_some());
    }

    #[test]
    fn test_every_output_node_is_named(user in user_strategy()) {
        let registry = core_registry();
        let user_type = registry.resource_type("User").unwrap();
        let response = registry
            .validate_document_for_response(&user_type, &user, &ResponseContext::default())
            .unwrap();
        for (pointer, name) in response.nodes() {
            prop_assert!(response.pointer(pointer).is_some());
            prop_assert!(!name.is_empty());
        }
    }
}
