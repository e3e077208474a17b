//! Recoverable composition warnings
//!
//! Composition never fails on recoverable conditions (removing an unknown
//! action, overriding a field absent from the schema, an association whose
//! related resource is not declared). Those are logged through `tracing` and
//! collected here so callers without a subscriber can still inspect them.

use serde::{Deserialize, Serialize};

// ============================================================================
// WarningCode
// ============================================================================

/// Machine-readable category of a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    /// `remove` named an action that is not in the group
    MissingAction,
    /// An override targeted a field the schema does not define
    UnknownField,
    /// No declared resource uses the related schema of an association
    UnresolvedRelation,
    /// An embed points at a schema that is not declared
    UnknownEmbedSchema,
}

// ============================================================================
// Warning
// ============================================================================

/// A single recoverable problem found during composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Category
    pub code: WarningCode,

    /// Human-readable message
    pub message: String,

    /// Where it happened (e.g. "product.fields.line_items")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Warning {
    /// Create a new warning
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Attach a location
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "[{}] {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Warning sink threaded through the composition steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and emit it through `tracing`
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(code = ?warning.code, "{}", warning);
        self.warnings.push(warning);
    }

    /// All recorded warnings, in the order they were raised
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warning was recorded
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of warnings with the given code
    pub fn count(&self, code: WarningCode) -> usize {
        self.warnings.iter().filter(|w| w.code == code).count()
    }

    /// Move the warnings of another sink into this one
    pub fn merge(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    /// Move another sink's warnings in, prefixing each path with `scope`
    pub fn merge_scoped(&mut self, other: Diagnostics, scope: &str) {
        self.warnings.extend(other.warnings.into_iter().map(|mut w| {
            w.path = Some(match w.path.take() {
                Some(path) => format!("{}.{}", scope, path),
                None => scope.to_string(),
            });
            w
        }));
    }

    /// Consume the sink
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_scoped_prefixes_paths() {
        let mut inner = Diagnostics::new();
        inner.warn(Warning::new(WarningCode::MissingAction, "gone").with_path("index_row"));
        inner.warn(Warning::new(WarningCode::MissingAction, "also gone"));

        let mut outer = Diagnostics::new();
        outer.merge_scoped(inner, "product.actions");
        let paths: Vec<_> = outer.warnings().iter().map(|w| w.path.as_deref()).collect();
        assert_eq!(
            paths,
            [Some("product.actions.index_row"), Some("product.actions")]
        );
    }

    #[test]
    fn test_warning_display() {
        let w = Warning::new(WarningCode::MissingAction, "no action 'archive'")
            .with_path("product.index_row");
        assert_eq!(w.to_string(), "[product.index_row] no action 'archive'");

        let w = Warning::new(WarningCode::UnknownField, "no field 'sku'");
        assert_eq!(w.to_string(), "no field 'sku'");
    }

    #[test]
    fn test_diagnostics_collects_in_order() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_warnings());

        diags.warn(Warning::new(WarningCode::UnknownField, "first"));
        diags.warn(Warning::new(WarningCode::MissingAction, "second"));
        diags.warn(Warning::new(WarningCode::UnknownField, "third"));

        assert!(diags.has_warnings());
        assert_eq!(diags.count(WarningCode::UnknownField), 2);
        let messages: Vec<_> = diags.warnings().iter().map(|w| w.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third"]);
    }

    #[test]
    fn test_diagnostics_merge() {
        let mut a = Diagnostics::new();
        a.warn(Warning::new(WarningCode::UnknownField, "a"));
        let mut b = Diagnostics::new();
        b.warn(Warning::new(WarningCode::UnresolvedRelation, "b"));

        a.merge(b);
        assert_eq!(a.into_warnings().len(), 2);
    }
}
