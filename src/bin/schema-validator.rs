//! # SCIM Schema Validator
//!
//! A command-line utility for checking SCIM schema and resource type
//! documents before they are handed to a [`ResourceTypeRegistry`].
//!
//! Documents are validated by the library itself: schema documents against
//! the SCIM meta-schema (`urn:ietf:params:scim:schemas:core:2.0:Schema`) and
//! resource type documents against the ResourceType meta-schema. The kind of
//! a document is taken from its `schemas` attribute.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin schema-validator schemas/Device.json
//! cargo run --bin schema-validator ./schemas/
//! ```
//!
//! ## Output Examples
//!
//! ```text
//! Validating: Device.json
//!   ✓ Schema Device (urn:example:params:scim:schemas:core:2.0:Device)
//!
//! Validating: DeviceType.json
//!   ✓ Resource type Device at /Devices
//!
//! Validation Summary:
//!   Valid documents: 2
//!   Invalid documents: 0
//!
//! Testing resource type registration...
//!   ✓ Device (1 extension(s))
//! ```
//!
//! When a directory is given and every document is valid, each resource
//! type is registered together with the schemas it names, so missing or
//! mismatched schema files are reported too.
//!
//! ## Exit Codes
//!
//! - `0`: All documents are valid
//! - `1`: One or more documents are invalid or could not be read

use scim_schema_validator::schema::{RESOURCE_TYPE_SCHEMA_URI, SCHEMA_SCHEMA_URI};
use scim_schema_validator::{ResourceType, ResourceTypeRegistry, Schema, ScimError};
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// A document that passed validation, with the JSON it was built from.
enum Checked {
    Schema(Schema, Value),
    ResourceType(ResourceType, Value),
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <schema-file-or-directory>", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} schemas/Device.json", args[0]);
        eprintln!("  {} ./schemas/", args[0]);
        process::exit(1);
    }

    let path = Path::new(&args[1]);

    if path.is_file() {
        validate_single_file(path);
    } else if path.is_dir() {
        validate_directory(path);
    } else {
        eprintln!(
            "Error: '{}' is not a valid file or directory",
            path.display()
        );
        process::exit(1);
    }
}

fn validate_single_file(file_path: &Path) {
    println!("Validating: {}", file_path.display());

    match check_document(file_path) {
        Ok(Checked::Schema(schema, _)) => {
            println!("✓ Schema is valid!");
            print_schema_summary(&schema);
        }
        Ok(Checked::ResourceType(resource_type, _)) => {
            println!("✓ Resource type is valid!");
            print_resource_type_summary(&resource_type);
        }
        Err(e) => {
            eprintln!("❌ Validation failed: {}", e);
            process::exit(1);
        }
    }
}

fn validate_directory(dir_path: &Path) {
    println!("Validating documents in directory: {}", dir_path.display());

    let files = match json_files(dir_path) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error reading directory: {}", e);
            process::exit(1);
        }
    };

    let mut schemas = HashMap::new();
    let mut resource_types = Vec::new();
    let mut error_count = 0;

    for path in &files {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("\nValidating: {}", file_name);

        match check_document(path) {
            Ok(Checked::Schema(schema, document)) => {
                println!("  ✓ Schema {} ({})", schema.name, schema.id);
                schemas.insert(schema.id, document);
            }
            Ok(Checked::ResourceType(resource_type, document)) => {
                println!(
                    "  ✓ Resource type {} at {}",
                    resource_type.name, resource_type.endpoint
                );
                resource_types.push((resource_type, document));
            }
            Err(e) => {
                eprintln!("  ❌ Invalid - {}", e);
                error_count += 1;
            }
        }
    }

    println!("\nValidation Summary:");
    println!("  Valid documents: {}", files.len() - error_count);
    println!("  Invalid documents: {}", error_count);

    if error_count > 0 {
        process::exit(1);
    }

    if resource_types.is_empty() {
        return;
    }

    println!("\nTesting resource type registration...");
    let registry = ResourceTypeRegistry::new();
    let mut failed = false;
    for (resource_type, document) in &resource_types {
        match register(&registry, resource_type, document, &schemas) {
            Ok(()) => println!(
                "  ✓ {} ({} extension(s))",
                resource_type.name,
                resource_type.schema_extensions.len()
            ),
            Err(e) => {
                eprintln!("  ❌ {} - {}", resource_type.name, e);
                failed = true;
            }
        }
    }
    if failed {
        process::exit(1);
    }
}

fn json_files(dir_path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Validate a schema or resource type document, chosen by its `schemas`
/// attribute. Documents declaring neither are treated as schemas.
fn check_document(file_path: &Path) -> Result<Checked, ScimError> {
    let content = fs::read_to_string(file_path)?;
    let document: Value = serde_json::from_str(&content)?;

    let declares = |uri: &str| {
        document
            .get("schemas")
            .and_then(Value::as_array)
            .is_some_and(|ids| ids.iter().any(|id| id.as_str() == Some(uri)))
    };

    if declares(RESOURCE_TYPE_SCHEMA_URI) && !declares(SCHEMA_SCHEMA_URI) {
        let resource_type = ResourceType::from_document(&document)?;
        Ok(Checked::ResourceType(resource_type, document))
    } else {
        let schema = Schema::from_document(&document)?;
        Ok(Checked::Schema(schema, document))
    }
}

fn register(
    registry: &ResourceTypeRegistry,
    resource_type: &ResourceType,
    document: &Value,
    schemas: &HashMap<String, Value>,
) -> Result<(), ScimError> {
    let main = schemas
        .get(&resource_type.schema)
        .ok_or_else(|| ScimError::SchemaNotFound {
            schema_id: resource_type.schema.clone(),
        })?;
    let extensions = resource_type
        .schema_extensions
        .iter()
        .map(|extension| {
            schemas
                .get(&extension.schema)
                .cloned()
                .ok_or_else(|| ScimError::SchemaNotFound {
                    schema_id: extension.schema.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    registry.register(None, document, main, &extensions)?;
    Ok(())
}

fn print_schema_summary(schema: &Schema) {
    println!();
    println!("Schema Summary:");
    println!("  ID: {}", schema.id);
    println!("  Name: {}", schema.name);
    println!("  Description: {}", schema.description);
    println!("  Attributes: {}", schema.attributes.len());

    let mut type_counts: Vec<(String, usize)> = Vec::new();
    for attr in &schema.attributes {
        let name = attr.data_type.to_string();
        match type_counts.iter_mut().find(|(t, _)| *t == name) {
            Some((_, count)) => *count += 1,
            None => type_counts.push((name, 1)),
        }
    }

    let required: Vec<&str> = schema
        .attributes
        .iter()
        .filter(|attr| attr.required)
        .map(|attr| attr.name.as_str())
        .collect();
    let multi_valued = schema.attributes.iter().filter(|attr| attr.multi_valued).count();

    println!("  Required attributes: {}", required.len());
    println!("  Multi-valued attributes: {}", multi_valued);
    println!("  Attribute types:");
    for (attr_type, count) in type_counts {
        println!("    - {}: {}", attr_type, count);
    }
    if !required.is_empty() {
        println!("  Required attribute names: {}", required.join(", "));
    }
}

fn print_resource_type_summary(resource_type: &ResourceType) {
    println!();
    println!("Resource Type Summary:");
    println!("  Name: {}", resource_type.name);
    println!("  Endpoint: {}", resource_type.endpoint);
    println!("  Schema: {}", resource_type.schema);
    for extension in &resource_type.schema_extensions {
        let marker = if extension.required { "required" } else { "optional" };
        println!("  Extension: {} ({})", extension.schema, marker);
    }
}
