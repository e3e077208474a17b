//! Error types for Formwright
//!
//! This module provides unified error handling across the composition engine.
//! Only structural problems are errors; recoverable conditions are reported
//! as warnings through [`crate::diagnostics::Diagnostics`].

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Formwright
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource validation failed
    #[error("Resource validation failed for '{resource}': {message}")]
    ResourceValidation { resource: String, message: String },

    /// Layout tree validation failed
    #[error("Layout validation failed for '{layout}': {message}")]
    LayoutValidation { layout: String, message: String },

    /// Action list validation failed
    #[error("Action validation failed for group '{group}': {message}")]
    ActionValidation { group: String, message: String },

    // ========================================================================
    // Structural Errors
    // ========================================================================
    /// A layout declaration could not be normalized into a node
    #[error("Malformed layout '{layout}' at {path}: {message}")]
    MalformedLayout {
        layout: String,
        path: String,
        message: String,
    },

    /// An expression in a layout option refers to an unknown name
    #[error("Unknown {kind} '{name}' referenced in layout '{layout}' at {path}")]
    UnknownExpression {
        layout: String,
        path: String,
        kind: String,
        name: String,
    },

    /// An action group name could not be parsed
    #[error("Invalid action group '{0}'")]
    InvalidActionGroup(String),

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Schema not found
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Layout not found
    #[error("Layout not found: {0}")]
    LayoutNotFound(String),

    /// Declaration source not found
    #[error("Declarations not found at path: {0}")]
    DeclarationsNotFound(PathBuf),

    // ========================================================================
    // Duplicate Errors
    // ========================================================================
    /// Duplicate schema name
    #[error("Duplicate schema name: '{0}' already exists")]
    DuplicateSchema(String),

    /// Duplicate resource name
    #[error("Duplicate resource name: '{0}' already exists")]
    DuplicateResource(String),

    /// Duplicate layout name
    #[error("Duplicate layout name: '{0}' already exists")]
    DuplicateLayout(String),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Invalid declaration file format
    #[error("Invalid declaration format in '{path}': {message}")]
    InvalidDeclarationFormat { path: PathBuf, message: String },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Warnings were raised while composing in strict mode
    #[error("Composition produced {count} warning(s) in strict mode: {first}")]
    StrictWarnings { count: usize, first: String },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl EngineError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    /// Create a resource validation error
    pub fn resource_validation(resource: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::ResourceValidation {
            resource: resource.into(),
            message: msg.into(),
        }
    }

    /// Create a layout validation error
    pub fn layout_validation(layout: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::LayoutValidation {
            layout: layout.into(),
            message: msg.into(),
        }
    }

    /// Create a malformed layout error
    pub fn malformed_layout(
        layout: impl Into<String>,
        path: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        EngineError::MalformedLayout {
            layout: layout.into(),
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_)
                | EngineError::ResourceValidation { .. }
                | EngineError::LayoutValidation { .. }
                | EngineError::ActionValidation { .. }
        )
    }

    /// Check if this error is a structural (malformed declaration) error
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            EngineError::MalformedLayout { .. }
                | EngineError::UnknownExpression { .. }
                | EngineError::InvalidActionGroup(_)
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::SchemaNotFound(_)
                | EngineError::ResourceNotFound(_)
                | EngineError::LayoutNotFound(_)
                | EngineError::DeclarationsNotFound(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, EngineError::Io(_) | EngineError::FileRead { .. })
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T>;
}

impl<T, E: Into<EngineError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T> {
        self.map_err(|e| {
            let err: EngineError = e.into();
            EngineError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = EngineError::validation("Name is required");
        assert!(err.is_validation());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Validation error: Name is required");
    }

    #[test]
    fn test_resource_validation_error() {
        let err = EngineError::resource_validation("product", "order out of sync");
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Resource validation failed for 'product': order out of sync"
        );
    }

    #[test]
    fn test_malformed_layout_error() {
        let err = EngineError::malformed_layout("product_form", "$.children[2]", "unknown key 'kids'");
        assert!(err.is_structural());
        assert!(!err.is_validation());
        assert_eq!(
            err.to_string(),
            "Malformed layout 'product_form' at $.children[2]: unknown key 'kids'"
        );
    }

    #[test]
    fn test_unknown_expression_error() {
        let err = EngineError::UnknownExpression {
            layout: "index".to_string(),
            path: "$.opts.sizes".to_string(),
            kind: "constant".to_string(),
            name: "PAGE_SIZES".to_string(),
        };
        assert!(err.is_structural());
        assert_eq!(
            err.to_string(),
            "Unknown constant 'PAGE_SIZES' referenced in layout 'index' at $.opts.sizes"
        );
    }

    #[test]
    fn test_not_found_errors() {
        let err = EngineError::SchemaNotFound("Shop.Product".to_string());
        assert!(err.is_not_found());
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "Schema not found: Shop.Product");
    }

    #[test]
    fn test_error_with_context() {
        let err = EngineError::with_context("Loading declarations", "Permission denied");
        assert_eq!(err.to_string(), "Loading declarations: Permission denied");
    }

    #[test]
    fn test_result_ext_wraps_json_error() {
        let parsed: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err = parsed.with_context("Parsing shop.json").unwrap_err();
        assert!(err.to_string().starts_with("Parsing shop.json: JSON serialization error"));
    }

    #[test]
    fn test_io_error_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EngineError = io_err.into();
        assert!(err.is_io());
    }
}
