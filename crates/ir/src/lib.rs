//! # Formwright IR
//!
//! The composition model: schema descriptors go in, resources with ordered
//! field catalogues, layout trees and action lists come out.
//!
//! ## Core Concepts
//!
//! - **Schema**: a named, typed attribute list plus relation and embed descriptors
//! - **Field**: UI metadata derived from one attribute (input kind, label, length, ...)
//! - **Resource**: an ordered field catalogue serving one schema
//! - **Node**: one element of a layout tree (container or field placement)
//! - **Action**: a named, handler-bound operation attached to a layout region
//!
//! ## Pipeline
//!
//! ```text
//! SchemaDescriptor -> build_catalogue -> merge_overrides -> expand_associations -> Resource
//! raw layout JSON  -> LayoutBuilder::build -> Node --(render time)--> OptionResolver
//! default_actions + ActionDirective* -> compose_actions -> ActionSet
//! ```

// Module declarations
pub mod actions;
pub mod association;
pub mod field;
pub mod layout;
pub mod naming;
pub mod options;
pub mod overrides;
pub mod resource;
pub mod schema;

// Re-export commonly used types at crate root
pub use actions::{
    Action, ActionDirective, ActionGroup, ActionSet, HandlerRef, LayoutKind, Placement,
    compose_actions, default_actions,
};
pub use association::{expand_associations, resolve_related_resource};
pub use field::{Field, FieldPatch, RelationInfo, build_catalogue};
pub use layout::{ExprRegistry, LayoutBuilder, Node, OptionFn, OptionValue, Tag};
pub use options::{DefaultsConfig, OptionResolver, RenderContext, RenderMode};
pub use overrides::{FieldOverride, merge_overrides, merge_schema_overrides};
pub use resource::Resource;
pub use schema::{Attribute, EmbedDescriptor, RelationDescriptor, RelationKind, SchemaDescriptor};

// Re-export core types that are commonly used with IR
pub use formwright_core::{
    Cardinality, Diagnostics, EngineError, EngineResult, HtmlType, SemanticType, Warning,
    WarningCode,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        // Actions
        Action,
        ActionDirective,
        ActionGroup,
        ActionSet,
        // Re-exported from core
        Diagnostics,
        EngineError,
        EngineResult,
        // Layouts
        ExprRegistry,
        // Core types
        Field,
        FieldOverride,
        FieldPatch,
        LayoutBuilder,
        Node,
        OptionResolver,
        RenderContext,
        RenderMode,
        Resource,
        SchemaDescriptor,
        Tag,
        // Pipeline steps
        build_catalogue,
        compose_actions,
        expand_associations,
        merge_overrides,
        merge_schema_overrides,
    };
}

// ============================================================================
// Tests
// ============================================================================
