//! Attribute selectors for the `attributes` and `excludedAttributes`
//! response filters (RFC 7644 section 3.9).
//!
//! A selector is one of
//!
//! - a short name: `userName`
//! - a dot path: `name.givenName`
//! - a schema-qualified name or path:
//!   `urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.value`
//! - a bare schema URI: `urn:ietf:params:scim:schemas:extension:enterprise:2.0:User`
//!
//! Whether a qualified selector is a bare URI or a URI followed by a path
//! can only be decided once the schema URIs in play are known, so parsing
//! happens in two steps: [`AttributeSelection::parse`] keeps the
//! syntactically valid selectors and [`AttributeSelection::resolve`] splits
//! them against the active schema URIs. A bare schema URI selects every
//! attribute of that schema.
//!
//! Selection filters never reject a document; malformed selectors are
//! logged and ignored.

use log::{debug, warn};
use regex::Regex;
use std::sync::LazyLock;

static ATTRIBUTE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\$ref|[A-Za-z][A-Za-z0-9_\-]*)(?:\.(?:\$ref|[A-Za-z][A-Za-z0-9_\-]*))*$")
        .expect("attribute path pattern is valid")
});

/// Syntactically valid selectors from a comma-joined filter string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSelection {
    selectors: Vec<String>,
}

impl AttributeSelection {
    /// Parse a comma-joined selector list, dropping selectors that cannot be
    /// attribute references.
    pub fn parse(input: &str) -> Self {
        let selectors = input
            .split(',')
            .map(str::trim)
            .filter(|selector| !selector.is_empty())
            .filter(|selector| {
                let valid = is_well_formed(selector);
                if !valid {
                    warn!("Ignoring malformed attribute selector '{}'", selector);
                }
                valid
            })
            .map(str::to_string)
            .collect();
        Self { selectors }
    }

    /// Parse an optional filter; `None` yields an empty selection.
    pub fn parse_optional(input: Option<&str>) -> Self {
        input.map(Self::parse).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Split qualified selectors against the given schema URIs.
    ///
    /// Qualified selectors that name none of `schema_ids` do not refer to
    /// anything in the document and are dropped.
    pub fn resolve(&self, schema_ids: &[&str]) -> ResolvedSelection {
        let mut candidates: Vec<&str> = schema_ids.to_vec();
        candidates.sort_by_key(|id| std::cmp::Reverse(id.len()));

        let selectors = self
            .selectors
            .iter()
            .filter_map(|selector| {
                if !is_qualified(selector) {
                    return Some(ResolvedSelector {
                        schema_id: None,
                        path: Some(selector.clone()),
                    });
                }
                let resolved = candidates.iter().find_map(|id| split_qualified(selector, id));
                if resolved.is_none() {
                    debug!("Attribute selector '{}' names no active schema", selector);
                }
                resolved
            })
            .collect();
        ResolvedSelection { selectors }
    }
}

/// A selector split into its schema URI and attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSelector {
    /// Schema the selector is qualified with, `None` for short names and
    /// dot paths which match in any schema
    pub schema_id: Option<String>,
    /// Dot path below the schema, `None` for a bare schema URI
    pub path: Option<String>,
}

impl ResolvedSelector {
    fn matches_schema(&self, schema_id: &str) -> bool {
        self.schema_id
            .as_deref()
            .is_none_or(|own| own.eq_ignore_ascii_case(schema_id))
    }

    /// Whether the selector names `path` itself or one of its ancestors.
    fn covers(&self, schema_id: &str, path: &str) -> bool {
        if !self.matches_schema(schema_id) {
            return false;
        }
        match self.path.as_deref() {
            None => true,
            Some(selected) => is_same_or_ancestor(selected, path),
        }
    }

    /// Whether the selector names a strict descendant of `path`.
    fn is_below(&self, schema_id: &str, path: &str) -> bool {
        self.matches_schema(schema_id)
            && self
                .path
                .as_deref()
                .is_some_and(|selected| is_strict_ancestor(path, selected))
    }
}

/// Selectors resolved against the schemas of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSelection {
    selectors: Vec<ResolvedSelector>,
}

impl ResolvedSelection {
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn selectors(&self) -> &[ResolvedSelector] {
        &self.selectors
    }

    /// Whether the attribute at `path` in `schema_id`, or one of its
    /// ancestors, is selected.
    pub fn selects(&self, schema_id: &str, path: &str) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.covers(schema_id, path))
    }

    /// Whether some attribute below `path` is selected.
    pub fn selects_descendant(&self, schema_id: &str, path: &str) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.is_below(schema_id, path))
    }
}

fn is_qualified(selector: &str) -> bool {
    selector.contains(':')
}

fn is_well_formed(selector: &str) -> bool {
    if selector.chars().any(char::is_whitespace) {
        return false;
    }
    match selector.rsplit_once(':') {
        Some((uri, last)) => !uri.is_empty() && !last.is_empty() && ATTRIBUTE_PATH.is_match(last),
        None => ATTRIBUTE_PATH.is_match(selector),
    }
}

fn split_qualified(selector: &str, schema_id: &str) -> Option<ResolvedSelector> {
    if selector.eq_ignore_ascii_case(schema_id) {
        return Some(ResolvedSelector {
            schema_id: Some(schema_id.to_string()),
            path: None,
        });
    }
    let prefix = selector.get(..schema_id.len())?;
    let rest = selector[schema_id.len()..].strip_prefix(':')?;
    if prefix.eq_ignore_ascii_case(schema_id) && ATTRIBUTE_PATH.is_match(rest) {
        Some(ResolvedSelector {
            schema_id: Some(schema_id.to_string()),
            path: Some(rest.to_string()),
        })
    } else {
        None
    }
}

fn is_same_or_ancestor(ancestor: &str, path: &str) -> bool {
    ancestor == path || is_strict_ancestor(ancestor, path)
}

fn is_strict_ancestor(ancestor: &str, path: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'.'
}
