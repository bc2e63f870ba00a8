//! Resource type registry for loading, managing, and accessing SCIM schemas.
//!
//! The [`ResourceTypeRegistry`] maps resource type names and schema URIs to
//! their parsed definitions. It is populated at startup (or per test fixture)
//! and read concurrently by validation calls afterwards. Registration takes a
//! write lock; lookups take a read lock and hand out cheap [`Arc`] clones so
//! no lock is held while a document is being validated.

use super::embedded;
use super::resource_type::ResourceType;
use super::types::Schema;
use crate::config::ValidatorConfig;
use crate::error::{ScimResult, ValidationError, ValidationResult};

use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct RegistryTables {
    schemas: HashMap<String, Arc<Schema>>,
    resource_types: HashMap<String, Arc<ResourceType>>,
}

/// Registry of schemas and resource types with validation capabilities.
///
/// Construct one per process (or per test) and pass it by reference; the
/// request and response validation entry points are methods on this type.
#[derive(Debug, Default)]
pub struct ResourceTypeRegistry {
    config: ValidatorConfig,
    tables: RwLock<RegistryTables>,
}

impl ResourceTypeRegistry {
    /// Create an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with a custom configuration.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self {
            config,
            tables: RwLock::default(),
        }
    }

    /// Create a registry holding the core User and Group resource types.
    ///
    /// User carries the optional Enterprise User extension. All documents
    /// come from the schemas embedded in the library.
    pub fn with_core_resource_types() -> ValidationResult<Self> {
        let registry = Self::new();
        registry.register_core_resource_types()?;
        Ok(registry)
    }

    /// Register the embedded User and Group resource types.
    pub fn register_core_resource_types(&self) -> ValidationResult<()> {
        let enterprise = parse_embedded(embedded::enterprise_user_schema())?;
        self.register(
            None,
            &parse_embedded(embedded::user_resource_type())?,
            &parse_embedded(embedded::core_user_schema())?,
            &[enterprise],
        )?;
        self.register(
            None,
            &parse_embedded(embedded::group_resource_type())?,
            &parse_embedded(embedded::core_group_schema())?,
            &[],
        )?;
        Ok(())
    }

    /// The configuration used by the validation entry points.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Register a resource type together with its schemas.
    ///
    /// `name` overrides the name found in the resource type document. Every
    /// extension declared by the resource type must either be supplied in
    /// `extension_documents` or already be registered. A later registration
    /// under the same name or schema URI replaces the earlier one.
    pub fn register(
        &self,
        name: Option<&str>,
        resource_type_document: &Value,
        main_schema_document: &Value,
        extension_documents: &[Value],
    ) -> ValidationResult<Arc<ResourceType>> {
        let mut resource_type = ResourceType::from_document(resource_type_document)?;
        if let Some(name) = name {
            resource_type.name = name.to_string();
        }

        let main_schema = Schema::from_document(main_schema_document)?;
        if main_schema.id != resource_type.schema {
            return Err(ValidationError::SchemaMismatch {
                resource_type: resource_type.name,
                expected: resource_type.schema,
                actual: main_schema.id,
            });
        }

        let extensions = extension_documents
            .iter()
            .map(Schema::from_document)
            .collect::<ValidationResult<Vec<_>>>()?;

        let mut tables = self.write();
        for declared in &resource_type.schema_extensions {
            let supplied = extensions.iter().any(|schema| schema.id == declared.schema);
            if !supplied && !tables.schemas.contains_key(&declared.schema) {
                return Err(ValidationError::UnknownSchemaUri {
                    uri: declared.schema.clone(),
                });
            }
        }

        for schema in &extensions {
            if !resource_type.declares_schema(&schema.id) {
                warn!(
                    "Schema {} is not declared by resource type '{}'; registered standalone",
                    schema.id, resource_type.name
                );
            }
        }

        for schema in std::iter::once(main_schema).chain(extensions) {
            debug!("Registering schema {}", schema.id);
            tables.schemas.insert(schema.id.clone(), Arc::new(schema));
        }

        let resource_type = Arc::new(resource_type);
        tables
            .resource_types
            .insert(resource_type.name.clone(), Arc::clone(&resource_type));
        info!(
            "Registered resource type '{}' ({} extension(s))",
            resource_type.name,
            resource_type.schema_extensions.len()
        );
        Ok(resource_type)
    }

    /// Register a standalone schema, e.g. an extension shared by several
    /// resource types.
    pub fn register_schema(&self, schema_document: &Value) -> ValidationResult<Arc<Schema>> {
        let schema = Arc::new(Schema::from_document(schema_document)?);
        debug!("Registering schema {}", schema.id);
        self.write()
            .schemas
            .insert(schema.id.clone(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Register a resource type whose documents are stored on disk.
    pub fn register_from_files<P: AsRef<Path>>(
        &self,
        name: Option<&str>,
        resource_type_path: P,
        main_schema_path: P,
        extension_paths: &[P],
    ) -> ScimResult<Arc<ResourceType>> {
        let resource_type_document = read_document(resource_type_path)?;
        let main_schema_document = read_document(main_schema_path)?;
        let extension_documents = extension_paths
            .iter()
            .map(read_document)
            .collect::<ScimResult<Vec<_>>>()?;
        Ok(self.register(
            name,
            &resource_type_document,
            &main_schema_document,
            &extension_documents,
        )?)
    }

    /// Look up a schema by its URI.
    pub fn schema(&self, id: &str) -> Option<Arc<Schema>> {
        self.read().schemas.get(id).cloned()
    }

    /// Look up a resource type by its name.
    pub fn resource_type(&self, name: &str) -> Option<Arc<ResourceType>> {
        self.read().resource_types.get(name).cloned()
    }

    pub fn contains_resource_type(&self, name: &str) -> bool {
        self.read().resource_types.contains_key(name)
    }

    /// URIs of all registered schemas, sorted.
    pub fn schema_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().schemas.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Names of all registered resource types, sorted.
    pub fn resource_type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().resource_types.keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up a schema, failing with [`ValidationError::UnknownSchemaUri`].
    pub(super) fn resolve_schema(&self, id: &str) -> ValidationResult<Arc<Schema>> {
        self.schema(id)
            .ok_or_else(|| ValidationError::UnknownSchemaUri { uri: id.to_string() })
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryTables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryTables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse_embedded(content: &str) -> ValidationResult<Value> {
    serde_json::from_str(content).map_err(|e| ValidationError::custom(e.to_string()))
}

fn read_document<P: AsRef<Path>>(path: P) -> ScimResult<Value> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
