//! # Formwright Core
//!
//! Core types, traits, and error handling for Formwright.
//!
//! This crate provides the foundational building blocks used throughout
//! the composition engine, including:
//!
//! - **Types**: Semantic attribute types, UI input kinds, cardinalities
//! - **Traits**: Common behaviors like `Validatable` and `Named`
//! - **Errors**: Unified error handling with `EngineError` and `EngineResult`
//! - **Diagnostics**: Recoverable warnings collected during composition
//!

pub mod diagnostics;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use diagnostics::{Diagnostics, Warning, WarningCode};
pub use error::{EngineError, EngineResult, ResultExt};
pub use traits::{Named, Validatable};
pub use types::{Cardinality, HtmlType, SemanticType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
