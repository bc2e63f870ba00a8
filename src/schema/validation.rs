//! Schema validation logic for SCIM resources.
//!
//! Request validation sanitizes a client payload: read-only attributes and
//! `meta` are removed, required attributes are enforced, single values are
//! coerced into arrays for multi-valued attributes and undeclared attributes
//! are stripped. Response validation shapes server output according to each
//! attribute's `returned` characteristic and the `attributes` /
//! `excludedAttributes` selectors of RFC 7644 section 3.9.
//!
//! Both walks share the same recursion over the attribute tree; only the
//! per-attribute inclusion policy differs. The input document is never
//! modified, the output is built node by node.

use super::constraints;
use super::datetime;
use super::document::ValidatedDocument;
use super::path::{AttributeSelection, ResolvedSelection};
use super::registry::ResourceTypeRegistry;
use super::resource_type::ResourceType;
use super::types::{AttributeDefinition, AttributeType, Mutability, Returned, Schema};
use crate::error::{ValidationError, ValidationResult};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::{debug, info, trace};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

const SCHEMAS: &str = "schemas";
const META: &str = "meta";

/// HTTP method a request document was received with.
///
/// POST, PUT and PATCH payloads are sanitized identically; the method is
/// carried for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
    Put,
    Patch,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        })
    }
}

impl FromStr for HttpMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            other => Err(ValidationError::custom(format!(
                "unsupported HTTP method '{other}'"
            ))),
        }
    }
}

/// What a document is validated against.
#[derive(Debug, Clone, Copy)]
pub enum ValidationTarget<'a> {
    /// A single schema; extensions are not considered
    Schema(&'a Schema),
    /// A resource type; its main and extension schemas are looked up in the
    /// registry
    ResourceType(&'a ResourceType),
}

impl<'a> From<&'a Schema> for ValidationTarget<'a> {
    fn from(schema: &'a Schema) -> Self {
        Self::Schema(schema)
    }
}

impl<'a> From<&'a Arc<Schema>> for ValidationTarget<'a> {
    fn from(schema: &'a Arc<Schema>) -> Self {
        Self::Schema(schema)
    }
}

impl<'a> From<&'a ResourceType> for ValidationTarget<'a> {
    fn from(resource_type: &'a ResourceType) -> Self {
        Self::ResourceType(resource_type)
    }
}

impl<'a> From<&'a Arc<ResourceType>> for ValidationTarget<'a> {
    fn from(resource_type: &'a Arc<ResourceType>) -> Self {
        Self::ResourceType(resource_type)
    }
}

/// Inputs that shape a response besides the document itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseContext<'a> {
    /// The sanitized request this response answers. Attributes with
    /// `returned: request` that the client just set are included.
    pub validated_request: Option<&'a Value>,
    /// Comma-joined `attributes` selectors
    pub attributes: Option<&'a str>,
    /// Comma-joined `excludedAttributes` selectors
    pub excluded_attributes: Option<&'a str>,
}

impl<'a> ResponseContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validated_request(mut self, request: &'a Value) -> Self {
        self.validated_request = Some(request);
        self
    }

    pub fn with_attributes(mut self, attributes: &'a str) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_excluded_attributes(mut self, excluded: &'a str) -> Self {
        self.excluded_attributes = Some(excluded);
        self
    }
}

impl ResourceTypeRegistry {
    /// Sanitize a request document.
    ///
    /// Returns a new document holding only the declared, client-writable
    /// attributes of the target, or the first violated rule.
    pub fn validate_document_for_request<'t>(
        &self,
        target: impl Into<ValidationTarget<'t>>,
        document: &Value,
        method: HttpMethod,
    ) -> ValidationResult<ValidatedDocument> {
        let resolved = self.resolve_target(target.into())?;
        trace!("Validating {} request against {}", method, resolved.main.id);
        let walker = Walker {
            registry: self,
            mode: Mode::Request,
        };
        walker.validate_resource(&resolved, document, &RequestNodes::default())
    }

    /// Shape a response document.
    pub fn validate_document_for_response<'t>(
        &self,
        target: impl Into<ValidationTarget<'t>>,
        document: &Value,
        context: &ResponseContext<'_>,
    ) -> ValidationResult<ValidatedDocument> {
        let resolved = self.resolve_target(target.into())?;
        trace!("Validating response against {}", resolved.main.id);
        let walker = Walker::for_response(self, context, &resolved.schema_ids());
        walker.validate_resource(
            &resolved,
            document,
            &RequestNodes::root(context.validated_request),
        )
    }

    /// Sanitize the object stored under an extension's schema URI.
    pub fn validate_extension_for_request(
        &self,
        extension: &Schema,
        document: &Value,
        method: HttpMethod,
    ) -> ValidationResult<ValidatedDocument> {
        trace!("Validating {} request extension {}", method, extension.id);
        let walker = Walker {
            registry: self,
            mode: Mode::Request,
        };
        let members = walker.validate_extension(extension, document, &RequestNodes::default())?;
        Ok(ValidatedDocument::for_extension(
            Value::Object(members),
            extension,
        ))
    }

    /// Shape the object stored under an extension's schema URI.
    ///
    /// `context.validated_request` is the extension object of the request,
    /// not the whole request document.
    pub fn validate_extension_for_response(
        &self,
        extension: &Schema,
        document: &Value,
        context: &ResponseContext<'_>,
    ) -> ValidationResult<ValidatedDocument> {
        trace!("Validating response extension {}", extension.id);
        let walker = Walker::for_response(self, context, &[extension.id.as_str()]);
        let members = walker.validate_extension(
            extension,
            document,
            &RequestNodes::root(context.validated_request),
        )?;
        Ok(ValidatedDocument::for_extension(
            Value::Object(members),
            extension,
        ))
    }

    fn resolve_target<'t>(&self, target: ValidationTarget<'t>) -> ValidationResult<Resolved<'t>> {
        match target {
            ValidationTarget::Schema(schema) => Ok(Resolved {
                main: SchemaHandle::Borrowed(schema),
                extensions: Vec::new(),
            }),
            ValidationTarget::ResourceType(resource_type) => {
                let main = self.resolve_schema(&resource_type.schema)?;
                let extensions = resource_type
                    .schema_extensions
                    .iter()
                    .map(|extension| {
                        Ok(ResolvedExtension {
                            schema: self.resolve_schema(&extension.schema)?,
                            required: extension.required,
                        })
                    })
                    .collect::<ValidationResult<Vec<_>>>()?;
                Ok(Resolved {
                    main: SchemaHandle::Registered(main),
                    extensions,
                })
            }
        }
    }
}

enum SchemaHandle<'a> {
    Borrowed(&'a Schema),
    Registered(Arc<Schema>),
}

impl Deref for SchemaHandle<'_> {
    type Target = Schema;

    fn deref(&self) -> &Schema {
        match self {
            Self::Borrowed(schema) => schema,
            Self::Registered(schema) => schema,
        }
    }
}

struct ResolvedExtension {
    schema: Arc<Schema>,
    required: bool,
}

struct Resolved<'a> {
    main: SchemaHandle<'a>,
    extensions: Vec<ResolvedExtension>,
}

impl Resolved<'_> {
    fn schema_ids(&self) -> Vec<&str> {
        std::iter::once(self.main.id.as_str())
            .chain(self.extensions.iter().map(|e| e.schema.id.as_str()))
            .collect()
    }

    fn is_extension_key(&self, key: &str) -> bool {
        self.extensions.iter().any(|e| e.schema.id == key)
    }
}

/// The nodes of the validated request that correspond to the attribute
/// level currently being walked. Multi-valued complex attributes fan out
/// into one node per element.
#[derive(Debug, Clone, Default)]
struct RequestNodes<'a> {
    nodes: Vec<&'a Value>,
}

impl<'a> RequestNodes<'a> {
    fn root(request: Option<&'a Value>) -> Self {
        Self {
            nodes: request.into_iter().collect(),
        }
    }

    fn child(&self, name: &str) -> Self {
        let mut nodes = Vec::new();
        for value in self.nodes.iter().filter_map(|node| node.get(name)) {
            match value {
                Value::Array(elements) => nodes.extend(elements.iter()),
                Value::Null => {}
                other => nodes.push(other),
            }
        }
        Self { nodes }
    }

    fn contains(&self, name: &str) -> bool {
        self.nodes
            .iter()
            .any(|node| node.get(name).is_some_and(|value| !value.is_null()))
    }
}

enum Mode {
    Request,
    Response {
        selected: ResolvedSelection,
        excluded: ResolvedSelection,
    },
}

/// Position of the walk: the schema being applied, the dot path of the
/// current complex value and the matching request nodes.
struct Frame<'a> {
    schema_id: &'a str,
    qualified: bool,
    path: String,
    depth: usize,
    narrow: bool,
    request: RequestNodes<'a>,
}

impl<'a> Frame<'a> {
    fn attribute_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path, name)
        }
    }

    /// Path as reported in errors; extension attributes are qualified with
    /// their schema URI.
    fn describe(&self, path: &str) -> String {
        if self.qualified {
            format!("{}:{}", self.schema_id, path)
        } else {
            path.to_string()
        }
    }

    fn child(&self, name: &str, path: String, narrow: bool) -> Frame<'a> {
        Frame {
            schema_id: self.schema_id,
            qualified: self.qualified,
            path,
            depth: self.depth + 1,
            narrow,
            request: self.request.child(name),
        }
    }
}

struct Walker<'r> {
    registry: &'r ResourceTypeRegistry,
    mode: Mode,
}

impl<'r> Walker<'r> {
    fn for_response(
        registry: &'r ResourceTypeRegistry,
        context: &ResponseContext<'_>,
        schema_ids: &[&str],
    ) -> Self {
        let selected = AttributeSelection::parse_optional(context.attributes).resolve(schema_ids);
        let excluded =
            AttributeSelection::parse_optional(context.excluded_attributes).resolve(schema_ids);
        Self {
            registry,
            mode: Mode::Response { selected, excluded },
        }
    }

    fn is_response(&self) -> bool {
        matches!(self.mode, Mode::Response { .. })
    }

    fn narrowing(&self) -> bool {
        match &self.mode {
            Mode::Request => false,
            Mode::Response { selected, .. } => !selected.is_empty(),
        }
    }

    fn validate_resource(
        &self,
        resolved: &Resolved<'_>,
        document: &Value,
        request: &RequestNodes<'_>,
    ) -> ValidationResult<ValidatedDocument> {
        let main = &*resolved.main;
        let input = document
            .as_object()
            .ok_or_else(|| ValidationError::DocumentNotAnObject {
                attribute: main.id.clone(),
            })?;
        let declared = declared_schemas(input, &main.id)?;

        let frame = Frame {
            schema_id: &main.id,
            qualified: false,
            path: String::new(),
            depth: 0,
            narrow: self.narrowing(),
            request: request.clone(),
        };
        let reserved = |key: &str| key == SCHEMAS || key == META || resolved.is_extension_key(key);
        let mut output = self.validate_members(&frame, &main.attributes, input, &reserved)?;

        if self.is_response() {
            if let Some(meta) = input.get(META) {
                output.insert(META.to_string(), meta.clone());
            }
        } else if input.contains_key(META) {
            debug!("Removed server-managed 'meta' from request");
        }

        let mut emitted_extensions = Vec::new();
        for extension in &resolved.extensions {
            let id = extension.schema.id.as_str();
            let Some(sub_document) = input.get(id).filter(|value| !value.is_null()) else {
                if extension.required {
                    return Err(ValidationError::MissingRequiredExtension {
                        schema_id: id.to_string(),
                    });
                }
                continue;
            };
            let members = self.validate_extension(
                &extension.schema,
                sub_document,
                &request.child(id),
            )?;
            if members.is_empty() {
                if extension.required && !self.is_response() {
                    return Err(ValidationError::MissingRequiredExtension {
                        schema_id: id.to_string(),
                    });
                }
                debug!("Removed empty extension {}", id);
                continue;
            }
            output.insert(id.to_string(), Value::Object(members));
            emitted_extensions.push(&*extension.schema);
        }

        let mut schemas: Vec<String> = declared
            .into_iter()
            .filter(|id| {
                if let Some(extension) = resolved.extensions.iter().find(|e| e.schema.id == *id) {
                    emitted_extensions.iter().any(|s| s.id == extension.schema.id)
                } else {
                    self.is_response() || id.eq_ignore_ascii_case(&main.id)
                }
            })
            .collect();
        for extension in &emitted_extensions {
            if !schemas.iter().any(|id| *id == extension.id) {
                debug!("Declared emitted extension {} in 'schemas'", extension.id);
                schemas.push(extension.id.clone());
            }
        }
        let schemas: Vec<Value> = schemas.into_iter().map(Value::String).collect();
        output.insert(SCHEMAS.to_string(), Value::Array(schemas));

        Ok(ValidatedDocument::for_resource(
            Value::Object(output),
            main,
            &emitted_extensions,
        ))
    }

    fn validate_extension(
        &self,
        extension: &Schema,
        document: &Value,
        request: &RequestNodes<'_>,
    ) -> ValidationResult<Map<String, Value>> {
        let input = document
            .as_object()
            .ok_or_else(|| ValidationError::DocumentNotAnObject {
                attribute: extension.id.clone(),
            })?;
        let frame = Frame {
            schema_id: &extension.id,
            qualified: true,
            path: String::new(),
            depth: 0,
            narrow: self.narrowing(),
            request: request.clone(),
        };
        self.validate_members(&frame, &extension.attributes, input, &|_| false)
    }

    /// Walk one level of the attribute tree.
    fn validate_members(
        &self,
        frame: &Frame<'_>,
        attributes: &[AttributeDefinition],
        input: &Map<String, Value>,
        reserved: &dyn Fn(&str) -> bool,
    ) -> ValidationResult<Map<String, Value>> {
        for key in input.keys() {
            if reserved(key) || attributes.iter().any(|attribute| attribute.name == *key) {
                continue;
            }
            let path = frame.describe(&frame.attribute_path(key));
            if !self.registry.config().strip_unknown_attributes {
                return Err(ValidationError::UnknownAttribute {
                    attribute: path,
                    schema_id: frame.schema_id.to_string(),
                });
            }
            trace!("Stripped unknown attribute '{}'", path);
        }

        let mut output = Map::new();
        for attribute in attributes {
            let path = frame.attribute_path(&attribute.name);
            let value = input
                .get(&attribute.name)
                .filter(|value| !value.is_null());

            let Some(narrow) = self.include(frame, attribute, &path, value)? else {
                continue;
            };
            let Some(value) = value else {
                continue;
            };
            trace!("Validating attribute '{}'", frame.describe(&path));
            let child = frame.child(&attribute.name, path, narrow);
            match self.validate_value(&child, attribute, value)? {
                Some(validated) => {
                    output.insert(attribute.name.clone(), validated);
                }
                None if attribute.required && !self.is_response() => {
                    return Err(ValidationError::missing_required(frame.describe(&child.path)));
                }
                None => {}
            }
        }
        Ok(output)
    }

    /// Apply the mode's inclusion policy to one attribute.
    ///
    /// Returns `None` when the attribute is left out of the output, or
    /// whether its sub-attributes are still subject to `attributes`
    /// narrowing when it is kept.
    fn include(
        &self,
        frame: &Frame<'_>,
        attribute: &AttributeDefinition,
        path: &str,
        value: Option<&Value>,
    ) -> ValidationResult<Option<bool>> {
        let described = || frame.describe(path);
        match &self.mode {
            Mode::Request => {
                if attribute.mutability == Mutability::ReadOnly {
                    if value.is_some() {
                        debug!("Removed read-only attribute '{}' from request", described());
                    }
                    return Ok(None);
                }
                if value.is_none() && attribute.required {
                    return Err(ValidationError::missing_required(described()));
                }
                Ok(Some(false))
            }
            Mode::Response { selected, excluded } => {
                if attribute.returned == Returned::Never
                    || attribute.mutability == Mutability::WriteOnly
                {
                    if value.is_some() {
                        debug!("Removed never-returned attribute '{}'", described());
                    }
                    return Ok(None);
                }
                let id = frame.schema_id;
                let is_selected = || frame.narrow && selected.selects(id, path);
                let below_selected = || frame.narrow && selected.selects_descendant(id, path);
                let decision = match attribute.returned {
                    Returned::Never => None,
                    Returned::Always => Some(!is_selected() && below_selected()),
                    Returned::Default if frame.narrow => {
                        if is_selected() {
                            Some(false)
                        } else if below_selected() {
                            Some(true)
                        } else {
                            None
                        }
                    }
                    Returned::Default => (!excluded.selects(id, path)).then_some(false),
                    Returned::Request => {
                        if selected.selects(id, path) {
                            Some(false)
                        } else if selected.selects_descendant(id, path) {
                            Some(true)
                        } else if frame.request.contains(&attribute.name) {
                            Some(false)
                        } else {
                            None
                        }
                    }
                };
                if value.is_none() {
                    // Only attributes the caller did not filter out must be present.
                    if decision.is_some() && attribute.required {
                        return Err(ValidationError::missing_required(described()));
                    }
                    if attribute.returned == Returned::Always {
                        info!("Attribute '{}' is always returned but absent", described());
                    }
                    return Ok(None);
                }
                if decision.is_none() {
                    trace!("Attribute '{}' not returned", described());
                }
                Ok(decision)
            }
        }
    }

    /// Validate a present, non-null value. `None` means nothing is left to
    /// emit once sub-attributes have been filtered.
    fn validate_value(
        &self,
        frame: &Frame<'_>,
        attribute: &AttributeDefinition,
        value: &Value,
    ) -> ValidationResult<Option<Value>> {
        if !attribute.multi_valued {
            if value.is_array() {
                return Err(ValidationError::ExpectedSingleValue {
                    attribute: frame.describe(&frame.path),
                });
            }
            return self.validate_single(frame, attribute, value);
        }

        let elements: Vec<&Value> = match value {
            Value::Array(items) => items.iter().filter(|item| !item.is_null()).collect(),
            Value::Object(_) => {
                return Err(ValidationError::ExpectedMultiValue {
                    attribute: frame.describe(&frame.path),
                });
            }
            scalar if self.registry.config().coerce_single_values => vec![scalar],
            _ => {
                return Err(ValidationError::ExpectedMultiValue {
                    attribute: frame.describe(&frame.path),
                });
            }
        };

        let mut output = Vec::with_capacity(elements.len());
        for element in &elements {
            if element.is_array() {
                return Err(ValidationError::ExpectedSingleValue {
                    attribute: frame.describe(&frame.path),
                });
            }
            if let Some(validated) = self.validate_single(frame, attribute, element)? {
                output.push(validated);
            }
        }

        // Responses are checked before selection narrows the elements.
        let described = frame.describe(&frame.path);
        let stored: Vec<Value>;
        let checked: &[Value] = if self.is_response() {
            stored = elements.iter().map(|element| (*element).clone()).collect();
            &stored
        } else {
            &output
        };
        constraints::check_unique_elements(attribute, &described, checked)?;
        constraints::check_single_primary(attribute, &described, checked)?;

        if output.is_empty() && (self.is_response() || !elements.is_empty()) {
            return Ok(None);
        }
        Ok(Some(Value::Array(output)))
    }

    fn validate_single(
        &self,
        frame: &Frame<'_>,
        attribute: &AttributeDefinition,
        value: &Value,
    ) -> ValidationResult<Option<Value>> {
        let described = || frame.describe(&frame.path);
        let mismatch = || ValidationError::invalid_type(described(), attribute.data_type.as_str(), json_kind(value));

        match attribute.data_type {
            AttributeType::String => {
                value.as_str().ok_or_else(mismatch)?;
            }
            AttributeType::Boolean => {
                value.as_bool().ok_or_else(mismatch)?;
            }
            AttributeType::Decimal => {
                if !value.is_number() {
                    return Err(mismatch());
                }
            }
            AttributeType::Integer => {
                if !(value.is_i64() || value.is_u64()) {
                    return Err(mismatch());
                }
            }
            AttributeType::DateTime => {
                let text = value.as_str().ok_or_else(mismatch)?;
                datetime::parse_timestamp(text).map_err(|source| {
                    ValidationError::InvalidDateTimeFormat {
                        attribute: described(),
                        source,
                    }
                })?;
            }
            AttributeType::Binary => {
                let text = value.as_str().ok_or_else(mismatch)?;
                BASE64
                    .decode(text)
                    .map_err(|e| ValidationError::InvalidBinaryData {
                        attribute: described(),
                        details: e.to_string(),
                    })?;
            }
            AttributeType::Reference => {
                let text = value.as_str().ok_or_else(mismatch)?;
                constraints::check_reference(self.registry, attribute, &described(), text)?;
            }
            AttributeType::Complex => {
                let members = value.as_object().ok_or_else(mismatch)?;
                let max_depth = self.registry.config().max_depth;
                if frame.depth > max_depth {
                    return Err(ValidationError::NestingTooDeep {
                        attribute: described(),
                        max_depth,
                    });
                }
                let output =
                    self.validate_members(frame, &attribute.sub_attributes, members, &|_| false)?;
                return Ok((!output.is_empty()).then_some(Value::Object(output)));
            }
        }

        constraints::check_canonical_value(attribute, &described(), value)?;
        Ok(Some(value.clone()))
    }
}

/// Check the `schemas` attribute and return the URIs it lists.
fn declared_schemas(input: &Map<String, Value>, schema_id: &str) -> ValidationResult<Vec<String>> {
    let value = input
        .get(SCHEMAS)
        .filter(|value| !value.is_null())
        .ok_or(ValidationError::MissingSchemas)?;
    let ids = value
        .as_array()
        .ok_or(ValidationError::InvalidSchemasAttribute)?
        .iter()
        .map(|id| {
            id.as_str()
                .map(str::to_string)
                .ok_or(ValidationError::InvalidSchemasAttribute)
        })
        .collect::<ValidationResult<Vec<_>>>()?;
    if !ids.iter().any(|id| id.eq_ignore_ascii_case(schema_id)) {
        return Err(ValidationError::SchemaNotDeclared {
            schema_id: schema_id.to_string(),
            found: ids,
        });
    }
    Ok(ids)
}

/// Get the type name of a JSON value for error messages.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "decimal",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
