//! Declaration files
//!
//! Declarations are plain data: schemas, resources (with their field
//! overrides and action directives), layouts, and constants that layout
//! options may reference. They load from one JSON or TOML file, or from a
//! directory of such files merged in path order.

use crate::ComposeConfig;
use formwright_core::{EngineError, EngineResult};
use formwright_ir::{ActionDirective, ActionGroup, FieldOverride, SchemaDescriptor};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use walkdir::WalkDir;

/// File extensions recognised when loading a directory
pub const DECLARATION_EXTENSIONS: &[&str] = &["json", "toml"];

// ============================================================================
// Declarations
// ============================================================================

/// One resource to compose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDecl {
    /// Resource name (e.g. "line_item", or "order__address" to target a nested resource)
    pub name: String,

    /// Schema identity the resource serves
    pub schema: String,

    /// Owning context/module
    #[serde(default)]
    pub context: Option<String>,

    /// Per-field overrides, in declaration order
    #[serde(default)]
    pub overrides: Vec<FieldOverride>,

    /// Action directives per group
    #[serde(default)]
    pub actions: IndexMap<ActionGroup, Vec<ActionDirective>>,
}

impl ResourceDecl {
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            context: None,
            overrides: Vec::new(),
            actions: IndexMap::new(),
        }
    }

    pub fn with_override(mut self, directive: FieldOverride) -> Self {
        self.overrides.push(directive);
        self
    }

    pub fn with_action(mut self, group: ActionGroup, directive: ActionDirective) -> Self {
        self.actions.entry(group).or_default().push(directive);
        self
    }
}

/// One named layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDecl {
    /// Layout name
    pub name: String,

    /// Resource whose fields the layout places
    #[serde(default)]
    pub resource: Option<String>,

    /// Raw declaration block
    pub declaration: Value,
}

impl LayoutDecl {
    pub fn new(name: impl Into<String>, declaration: Value) -> Self {
        Self {
            name: name.into(),
            resource: None,
            declaration,
        }
    }

    pub fn for_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

/// Everything the composer consumes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeclarationSet {
    /// Pipeline configuration
    pub config: Option<ComposeConfig>,

    /// Constants available to `{"$const": ...}` option expressions
    pub constants: IndexMap<String, Value>,

    /// Schemas, by declaration order
    pub schemas: Vec<SchemaDescriptor>,

    /// Resources, by declaration order
    pub resources: Vec<ResourceDecl>,

    /// Layouts, by declaration order
    pub layouts: Vec<LayoutDecl>,
}

impl DeclarationSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: SchemaDescriptor) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn with_resource(mut self, resource: ResourceDecl) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_layout(mut self, layout: LayoutDecl) -> Self {
        self.layouts.push(layout);
        self
    }

    pub fn with_constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constants.insert(name.into(), value.into());
        self
    }

    pub fn with_config(mut self, config: ComposeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Append another set; its config and constants win on conflict
    pub fn merge(&mut self, other: DeclarationSet) {
        if other.config.is_some() {
            self.config = other.config;
        }
        self.constants.extend(other.constants);
        self.schemas.extend(other.schemas);
        self.resources.extend(other.resources);
        self.layouts.extend(other.layouts);
    }

    /// Check if nothing was declared
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.resources.is_empty() && self.layouts.is_empty()
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        toml::from_str(source).map_err(|e| EngineError::with_context("TOML declaration", e.to_string()))
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load declarations from a file or a directory
///
/// Directories are walked recursively; files with a recognised extension
/// are merged in path order.
pub fn load_declarations(path: impl AsRef<Path>) -> EngineResult<DeclarationSet> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EngineError::DeclarationsNotFound(path.to_path_buf()));
    }

    if path.is_file() {
        return load_file(path);
    }

    let mut set = DeclarationSet::new();
    let mut files = 0usize;
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| EngineError::FileRead {
            path: e.path().unwrap_or(path).to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() && is_declaration_file(entry.path()) {
            set.merge(load_file(entry.path())?);
            files += 1;
        }
    }

    tracing::debug!(path = %path.display(), files, "Loaded declaration directory");
    Ok(set)
}

/// Load a single declaration file
pub fn load_file(path: &Path) -> EngineResult<DeclarationSet> {
    let source = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let parsed = match extension(path) {
        Some("toml") => toml::from_str(&source).map_err(|e| e.to_string()),
        _ => serde_json::from_str(&source).map_err(|e| e.to_string()),
    };

    parsed.map_err(|message| EngineError::InvalidDeclarationFormat {
        path: path.to_path_buf(),
        message,
    })
}

/// Check if a path carries a recognised declaration extension
pub fn is_declaration_file(path: &Path) -> bool {
    extension(path).is_some_and(|ext| DECLARATION_EXTENSIONS.contains(&ext))
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

// ============================================================================
// Tests
// ============================================================================
