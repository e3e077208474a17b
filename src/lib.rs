//! Formwright
//!
//! Declarative, metadata-driven UI description engine.
//!
//! Formwright turns data schemas plus hand-written override directives into
//! ordered field catalogues, layout trees and action lists, and hands the
//! result to a rendering backend as an immutable snapshot.
//!
//! This crate re-exports the workspace crates:
//!
//! - [`core`]: errors, diagnostics, semantic types
//! - [`ir`]: schemas, fields, resources, layouts, option resolution, actions
//! - [`compose`]: declaration loading, the composition pipeline, snapshots

pub use formwright_compose as compose;
pub use formwright_core as core;
pub use formwright_ir as ir;

pub use formwright_compose::{
    ComposeConfig, Composer, DeclarationSet, Snapshot, SnapshotStore, load_declarations,
};
pub use formwright_core::{EngineError, EngineResult};

/// Convenient re-exports for common usage
pub mod prelude {
    pub use formwright_compose::{
        ComposeConfig, ComposedLayout, Composer, DeclarationSet, LayoutDecl, ResourceDecl,
        Snapshot, SnapshotStore, load_declarations,
    };
    pub use formwright_ir::prelude::*;
}
