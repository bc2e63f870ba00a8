//! Test fixtures for resources and schema documents.
//!
//! Resource fixtures follow the examples of RFC 7643 section 8. Schema
//! fixtures describe a small custom resource type used to exercise
//! characteristics the core schemas do not declare.

use serde_json::Value;
use std::path::{Path, PathBuf};

/// A scratch directory under the system temp dir, removed on drop.
pub struct FixtureDir {
    path: PathBuf,
}

impl FixtureDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("scim-fixtures-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path)
            .unwrap_or_else(|e| panic!("Failed to create {}: {}", path.display(), e));
        Self { path }
    }

    /// Write `document` as pretty JSON and return its path.
    pub fn write(&self, file_name: &str, document: &Value) -> PathBuf {
        let path = self.path.join(file_name);
        let content = serde_json::to_string_pretty(document).expect("fixture must serialize");
        std::fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Failed to write fixture {}: {}", path.display(), e));
        path
    }

    /// Write raw text, for malformed-document tests.
    pub fn write_raw(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.path.join(file_name);
        std::fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Failed to write fixture {}: {}", path.display(), e));
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FixtureDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// RFC 7643 examples as constants for easy reference
pub mod rfc_examples {
    use serde_json::{Value, json};

    /// RFC 7643 Section 8.1 - Minimal User representation
    pub fn user_minimal() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "id": "2819c223-7f76-453a-919d-413861904646",
            "userName": "bjensen@example.com",
            "meta": {
                "resourceType": "User",
                "created": "2010-01-23T04:56:22Z",
                "lastModified": "2011-05-13T04:42:34Z",
                "version": "W/\"3694e05e9dff590\"",
                "location": "https://example.com/v2/Users/2819c223-7f76-453a-919d-413861904646"
            }
        })
    }

    /// RFC 7643 Section 8.2 - Full User representation
    pub fn user_full() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "id": "2819c223-7f76-453a-919d-413861904646",
            "externalId": "701984",
            "userName": "bjensen@example.com",
            "name": {
                "formatted": "Ms. Barbara J Jensen, III",
                "familyName": "Jensen",
                "givenName": "Barbara",
                "middleName": "Jane",
                "honorificPrefix": "Ms.",
                "honorificSuffix": "III"
            },
            "displayName": "Babs Jensen",
            "nickName": "Babs",
            "profileUrl": "https://login.example.com/bjensen",
            "emails": [
                {"value": "bjensen@example.com", "type": "work", "primary": true},
                {"value": "babs@jensen.org", "type": "home"}
            ],
            "addresses": [
                {
                    "type": "work",
                    "streetAddress": "100 Universal City Plaza",
                    "locality": "Hollywood",
                    "region": "CA",
                    "postalCode": "91608",
                    "country": "USA",
                    "formatted": "100 Universal City Plaza\nHollywood, CA 91608 USA",
                    "primary": true
                }
            ],
            "phoneNumbers": [
                {"value": "555-555-5555", "type": "work"},
                {"value": "555-555-4444", "type": "mobile"}
            ],
            "ims": [{"value": "someaimhandle", "type": "aim"}],
            "photos": [
                {"value": "https://photos.example.com/profilephoto/72930000000Ccne/F", "type": "photo"}
            ],
            "userType": "Employee",
            "title": "Tour Guide",
            "preferredLanguage": "en-US",
            "locale": "en-US",
            "timezone": "America/Los_Angeles",
            "active": true,
            "password": "t1meMa$heen",
            "groups": [
                {
                    "value": "e9e30dba-f08f-4109-8486-d5c6a331660a",
                    "$ref": "https://example.com/v2/Groups/e9e30dba-f08f-4109-8486-d5c6a331660a",
                    "display": "Tour Guides"
                }
            ],
            "x509Certificates": [
                {"value": "MIIDQzCCAqygAwIBAgICEAAwDQYJKoZIhvcNAQEFBQAw"}
            ],
            "meta": {
                "resourceType": "User",
                "created": "2010-01-23T04:56:22Z",
                "lastModified": "2011-05-13T04:42:34Z",
                "version": "W/\"a330bc54f0671c9\"",
                "location": "https://example.com/v2/Users/2819c223-7f76-453a-919d-413861904646"
            }
        })
    }

    /// RFC 7643 Section 8.3 - Enterprise User extension representation
    pub fn user_enterprise() -> Value {
        let mut user = user_full();

        user["schemas"] = json!([
            "urn:ietf:params:scim:schemas:core:2.0:User",
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"
        ]);

        user["urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"] = json!({
            "employeeNumber": "701984",
            "costCenter": "4130",
            "organization": "Universal Studios",
            "division": "Theme Park",
            "department": "Tour Operations",
            "manager": {
                "value": "26118915-6090-4610-87e4-49d8ca9f808d",
                "$ref": "../Users/26118915-6090-4610-87e4-49d8ca9f808d",
                "displayName": "John Smith"
            }
        });

        user
    }

    /// RFC 7643 Section 8.4 - Group representation
    pub fn group_basic() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
            "id": "e9e30dba-f08f-4109-8486-d5c6a331660a",
            "displayName": "Tour Guides",
            "members": [
                {
                    "value": "2819c223-7f76-453a-919d-413861904646",
                    "$ref": "https://example.com/v2/Users/2819c223-7f76-453a-919d-413861904646",
                    "display": "Babs Jensen"
                },
                {
                    "value": "902c246b-6245-4190-8e05-00816be7344a",
                    "$ref": "https://example.com/v2/Users/902c246b-6245-4190-8e05-00816be7344a",
                    "display": "Mandy Pepperidge"
                }
            ],
            "meta": {
                "resourceType": "Group",
                "created": "2010-01-23T04:56:22Z",
                "lastModified": "2011-05-13T04:42:34Z",
                "version": "W/\"3694e05e9dff592\"",
                "location": "https://example.com/v2/Groups/e9e30dba-f08f-4109-8486-d5c6a331660a"
            }
        })
    }
}

/// Custom schemas for systematic validation testing
pub mod test_fixtures {
    use serde_json::{Value, json};

    pub const DEVICE_SCHEMA_URI: &str = "urn:example:params:scim:schemas:core:2.0:Device";
    pub const LOCATION_SCHEMA_URI: &str = "urn:example:params:scim:schemas:extension:location:2.0:Device";

    /// A device resource exercising every attribute type.
    pub fn device_schema() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Schema"],
            "id": DEVICE_SCHEMA_URI,
            "name": "Device",
            "description": "Managed device",
            "attributes": [
                {
                    "name": "id", "type": "string", "multiValued": false, "required": true,
                    "caseExact": true, "mutability": "readOnly", "returned": "always", "uniqueness": "server"
                },
                {
                    "name": "serialNumber", "type": "string", "multiValued": false, "required": true,
                    "caseExact": true, "mutability": "immutable", "returned": "default", "uniqueness": "global"
                },
                {
                    "name": "enrolled", "type": "boolean", "multiValued": false, "required": false,
                    "mutability": "readWrite", "returned": "default"
                },
                {
                    "name": "storageGb", "type": "integer", "multiValued": false, "required": false,
                    "mutability": "readWrite", "returned": "default"
                },
                {
                    "name": "batteryHealth", "type": "decimal", "multiValued": false, "required": false,
                    "mutability": "readWrite", "returned": "default"
                },
                {
                    "name": "lastSeen", "type": "dateTime", "multiValued": false, "required": false,
                    "mutability": "readOnly", "returned": "default"
                },
                {
                    "name": "firmware", "type": "binary", "multiValued": false, "required": false,
                    "mutability": "writeOnly", "returned": "never"
                },
                {
                    "name": "owner", "type": "reference", "referenceTypes": ["User", "Group"],
                    "multiValued": false, "required": false, "mutability": "readWrite", "returned": "default"
                },
                {
                    "name": "tags", "type": "string", "multiValued": true, "required": false,
                    "mutability": "readWrite", "returned": "request", "uniqueness": "server"
                },
                {
                    "name": "ports", "type": "complex", "multiValued": true, "required": false,
                    "mutability": "readWrite", "returned": "default",
                    "subAttributes": [
                        {"name": "kind", "type": "string", "multiValued": false, "required": true,
                         "canonicalValues": ["usb", "hdmi", "ethernet"]},
                        {"name": "count", "type": "integer", "multiValued": false},
                        {"name": "primary", "type": "boolean", "multiValued": false}
                    ]
                }
            ]
        })
    }

    /// A required extension of the device resource.
    pub fn location_extension_schema() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Schema"],
            "id": LOCATION_SCHEMA_URI,
            "name": "DeviceLocation",
            "attributes": [
                {
                    "name": "site", "type": "string", "multiValued": false, "required": true,
                    "mutability": "readWrite", "returned": "default"
                },
                {
                    "name": "rack", "type": "string", "multiValued": false, "required": false,
                    "mutability": "readWrite", "returned": "request"
                },
                {
                    "name": "auditedBy", "type": "string", "multiValued": false, "required": false,
                    "mutability": "readOnly", "returned": "default"
                }
            ]
        })
    }

    pub fn device_resource_type() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:ResourceType"],
            "id": "Device",
            "name": "Device",
            "endpoint": "/Devices",
            "description": "Managed devices",
            "schema": DEVICE_SCHEMA_URI,
            "schemaExtensions": [
                {"schema": LOCATION_SCHEMA_URI, "required": true}
            ]
        })
    }

    pub fn device() -> Value {
        json!({
            "schemas": [DEVICE_SCHEMA_URI, LOCATION_SCHEMA_URI],
            "id": "d-42",
            "serialNumber": "SN-0042",
            "enrolled": true,
            "storageGb": 512,
            "batteryHealth": 0.93,
            "lastSeen": "2026-10-18T08:30:00Z",
            "firmware": "AAECAwQFBgc=",
            "owner": "https://example.com/v2/Users/2819c223",
            "tags": ["lab", "loaner"],
            "ports": [
                {"kind": "usb", "count": 3, "primary": true},
                {"kind": "hdmi", "count": 1}
            ],
            LOCATION_SCHEMA_URI: {
                "site": "Oslo",
                "rack": "R12",
                "auditedBy": "facilities"
            },
            "meta": {"resourceType": "Device"}
        })
    }

    /// Schema document with structural mistakes the meta-schema catches.
    pub fn invalid_schema() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Schema"],
            "id": "urn:example:params:scim:schemas:Broken",
            "name": 123,
            "attributes": "not-an-array"
        })
    }
}
