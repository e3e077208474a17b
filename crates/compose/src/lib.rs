//! # Formwright Compose
//!
//! Runs the full composition pipeline over a set of declarations and
//! publishes the result as an immutable, shareable snapshot.
//!
//! ## Features
//!
//! - **Declaration loading**: one JSON/TOML file or a directory of them
//! - **Composition**: catalogue, overrides, associations, layouts, actions
//! - **Nested resources**: one `parent__embed` resource per known embed
//! - **Snapshots**: `Arc<Snapshot>` values swapped atomically on re-composition
//!

// ============================================================================
// Modules
// ============================================================================

pub mod composer;
pub mod context;
pub mod declaration;
pub mod snapshot;

// ============================================================================
// Re-exports
// ============================================================================

pub use composer::{Composer, compose};
pub use context::CompositionContext;
pub use declaration::{DeclarationSet, LayoutDecl, ResourceDecl, load_declarations};
pub use snapshot::{ComposedLayout, Snapshot, SnapshotStore};

use formwright_ir::DefaultsConfig;
use serde::{Deserialize, Serialize};

// ============================================================================
// ComposeConfig
// ============================================================================

/// Configuration for the composition pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Values behind the built-in option providers
    pub defaults: DefaultsConfig,

    /// Treat warnings as errors
    pub strict: bool,

    /// Seed every resource's action groups with the built-in actions
    pub default_actions: bool,

    /// Register a `parent__embed` resource for each embed with a known schema
    pub nested_resources: bool,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            strict: false,
            default_actions: true,
            nested_resources: true,
        }
    }
}

impl ComposeConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set option defaults
    pub fn with_defaults(mut self, defaults: DefaultsConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Fail composition on any warning
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Start every action group empty
    pub fn without_default_actions(mut self) -> Self {
        self.default_actions = false;
        self
    }

    /// Skip registering nested embed resources
    pub fn without_nested_resources(mut self) -> Self {
        self.nested_resources = false;
        self
    }
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_defaults() {
        let config = ComposeConfig::default();
        assert!(!config.strict);
        assert!(config.default_actions);
        assert_eq!(config.defaults.items_per_page, 40);
    }

    #[test]
    fn test_config_builder() {
        let config = ComposeConfig::new().strict().without_default_actions();
        assert!(config.strict);
        assert!(!config.default_actions);
        assert!(config.nested_resources);
    }

    #[test]
    fn test_config_partial_deserialize() {
        let config: ComposeConfig =
            serde_json::from_str(r#"{"strict": true, "defaults": {"items_per_page": 20}}"#).unwrap();
        assert!(config.strict);
        assert_eq!(config.defaults.items_per_page, 20);
        assert_eq!(config.defaults.infinity_scroll_items_load, 200);
        assert!(config.default_actions);
    }
}
