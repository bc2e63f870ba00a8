//! Configuration for the validation engine.

/// Tunables for request and response validation.
///
/// The defaults reproduce RFC 7643 lenient behavior: single values are
/// accepted for multi-valued attributes and attributes not declared by any
/// active schema are silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Wrap a scalar sent for a multi-valued attribute into a one-element array.
    pub coerce_single_values: bool,

    /// Drop undeclared attributes instead of failing with
    /// [`ValidationError::UnknownAttribute`](crate::error::ValidationError::UnknownAttribute).
    pub strip_unknown_attributes: bool,

    /// Maximum nesting depth of complex attributes below the document root.
    pub max_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            coerce_single_values: true,
            strip_unknown_attributes: true,
            max_depth: 16,
        }
    }
}

impl ValidatorConfig {
    /// Strict configuration: no coercion and unknown attributes are errors.
    pub fn strict() -> Self {
        Self {
            coerce_single_values: false,
            strip_unknown_attributes: false,
            ..Self::default()
        }
    }

    pub fn with_coerce_single_values(mut self, coerce: bool) -> Self {
        self.coerce_single_values = coerce;
        self
    }

    pub fn with_strip_unknown_attributes(mut self, strip: bool) -> Self {
        self.strip_unknown_attributes = strip;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
