//! Layout trees
//!
//! Layout declarations arrive as nested JSON blocks and are normalized in a
//! single recursive pass into a tree of [`Node`]s. Building is purely
//! structural: no schema lookups and no option defaults, those happen at
//! render time through [`crate::options::OptionResolver`].
//!
//! ## Declaration shapes
//!
//! ```text
//! "price"                                     field leaf
//! {"field": "price", "opts": {...}}           field leaf with options
//! {"tag": "group", "name": "pricing",
//!  "opts": {...}, "config": ..., "children": [...]}   container
//! [decl, [decl, decl], null, ...]             block, flattened in order
//! ```
//!
//! Option values may contain `{"$const": "NAME"}` (replaced by a registry
//! constant, anywhere inside the value) or be exactly `{"$fn": "NAME"}`
//! (replaced by a registry function invoked at resolve time).

use crate::options::RenderContext;
use formwright_core::{EngineError, EngineResult, Named, Validatable};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

const CONST_KEY: &str = "$const";
const FN_KEY: &str = "$fn";

const FIELD_KEYS: &[&str] = &["field", "opts", "config"];
const CONTAINER_KEYS: &[&str] = &["tag", "name", "opts", "config", "children"];

// ============================================================================
// Tag
// ============================================================================

/// Container kind of a layout node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Tag {
    /// List page
    Index,
    /// Detail page
    Show,
    /// Edit/create page
    Form,
    /// Titled group of fields
    Group,
    /// Fields laid out side by side
    Inline,
    /// Fields laid out vertically
    Stacked,
    /// Tabbed or accordion section set
    Sections,
    /// One entry of a section set
    Section,
    /// Field placement (always a leaf)
    Field,
    /// Container kind known only to the renderer
    Custom(String),
}

impl Tag {
    /// Parse a tag name
    pub fn parse(name: &str) -> Self {
        match name {
            "index" => Tag::Index,
            "show" => Tag::Show,
            "form" => Tag::Form,
            "group" => Tag::Group,
            "inline" => Tag::Inline,
            "stacked" => Tag::Stacked,
            "sections" => Tag::Sections,
            "section" => Tag::Section,
            "field" => Tag::Field,
            other => Tag::Custom(other.to_string()),
        }
    }

    /// Tag name as written in declarations
    pub fn as_str(&self) -> &str {
        match self {
            Tag::Index => "index",
            Tag::Show => "show",
            Tag::Form => "form",
            Tag::Group => "group",
            Tag::Inline => "inline",
            Tag::Stacked => "stacked",
            Tag::Sections => "sections",
            Tag::Section => "section",
            Tag::Field => "field",
            Tag::Custom(name) => name,
        }
    }

    /// Page-level layout kinds
    pub fn is_layout(&self) -> bool {
        matches!(self, Tag::Index | Tag::Show | Tag::Form)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.as_str().to_string()
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Option values
// ============================================================================

type OptionFnBody = dyn Fn(&RenderContext<'_>) -> Value + Send + Sync;

/// A named function computing an option value from the render context
#[derive(Clone)]
pub struct OptionFn {
    name: String,
    func: Arc<OptionFnBody>,
}

impl OptionFn {
    /// Wrap a function under a registry name
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Registry name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compute the value
    pub fn call(&self, ctx: &RenderContext<'_>) -> Value {
        (self.func)(ctx)
    }
}

impl std::fmt::Debug for OptionFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OptionFn").field(&self.name).finish()
    }
}

// Functions come from a registry by name, so the name identifies them.
impl PartialEq for OptionFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A stored, fully evaluated option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Concrete value
    Literal(Value),
    /// Computed per render call
    Computed(OptionFn),
}

impl OptionValue {
    /// The literal value, if this option is not computed
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            OptionValue::Literal(v) => Some(v),
            OptionValue::Computed(_) => None,
        }
    }
}

impl<T: Into<Value>> From<T> for OptionValue {
    fn from(value: T) -> Self {
        OptionValue::Literal(value.into())
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Literal(v) => v.serialize(serializer),
            OptionValue::Computed(f) => {
                let mut map = Map::new();
                map.insert(FN_KEY.to_string(), Value::from(f.name()));
                map.serialize(serializer)
            }
        }
    }
}

// ============================================================================
// ExprRegistry
// ============================================================================

/// Constants and functions that layout options may reference by name
#[derive(Debug, Clone, Default)]
pub struct ExprRegistry {
    constants: IndexMap<String, Value>,
    functions: IndexMap<String, OptionFn>,
}

impl ExprRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constant
    pub fn with_constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constants.insert(name.into(), value.into());
        self
    }

    /// Register a function
    pub fn with_function<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        self.functions.insert(name.clone(), OptionFn::new(name, func));
        self
    }

    /// Register many constants at once
    pub fn extend_constants(&mut self, constants: impl IntoIterator<Item = (String, Value)>) {
        self.constants.extend(constants);
    }

    /// Look up a constant
    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.constants.get(name)
    }

    /// Look up a function
    pub fn function(&self, name: &str) -> Option<&OptionFn> {
        self.functions.get(name)
    }
}

// ============================================================================
// Node
// ============================================================================

/// One layout container or field placement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Container kind
    pub tag: Tag,

    /// Field key for leaves, container name otherwise
    pub name: String,

    /// Explicit options, evaluated
    pub opts: IndexMap<String, OptionValue>,

    /// Raw configuration literal (`[]` when none was given)
    pub config: Value,

    /// Child nodes in declaration order
    pub children: Vec<Node>,
}

impl Node {
    /// Create a field leaf
    pub fn field(name: impl Into<String>) -> Self {
        Self::new(Tag::Field, name)
    }

    /// Create an empty container
    pub fn container(tag: Tag, name: impl Into<String>) -> Self {
        Self::new(tag, name)
    }

    fn new(tag: Tag, name: impl Into<String>) -> Self {
        Self {
            tag,
            name: name.into(),
            opts: IndexMap::new(),
            config: Value::Array(Vec::new()),
            children: Vec::new(),
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set an explicit option
    pub fn with_opt(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.opts.insert(key.into(), value.into());
        self
    }

    /// Append a child
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Check if this is a field placement
    pub fn is_leaf(&self) -> bool {
        self.tag == Tag::Field
    }

    /// Get an explicit option
    pub fn opt(&self, key: &str) -> Option<&OptionValue> {
        self.opts.get(key)
    }

    /// Depth-first search for a node by name (self included)
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Depth-first search for a node by tag and name
    pub fn find_tagged(&self, tag: &Tag, name: &str) -> Option<&Node> {
        if self.tag == *tag && self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_tagged(tag, name))
    }

    /// All field leaves, depth-first in declaration order
    pub fn leaves(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Node>) {
        if self.is_leaf() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    /// Names of all field leaves, depth-first
    pub fn field_names(&self) -> Vec<&str> {
        self.leaves().into_iter().map(|n| n.name.as_str()).collect()
    }

    /// Height of the tree (a lone node has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Node::depth).max().unwrap_or(0)
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }
}

impl Named for Node {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Validatable for Node {
    fn validate(&self) -> EngineResult<()> {
        if self.is_leaf() {
            if self.name.is_empty() {
                return Err(EngineError::layout_validation(
                    &self.name,
                    "field placement has no name",
                ));
            }
            if !self.children.is_empty() {
                return Err(EngineError::layout_validation(
                    &self.name,
                    "field placement carries children",
                ));
            }
        }
        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// LayoutBuilder
// ============================================================================

/// Normalizes raw layout declarations into node trees
#[derive(Debug, Clone)]
pub struct LayoutBuilder<'a> {
    layout: String,
    registry: &'a ExprRegistry,
}

impl<'a> LayoutBuilder<'a> {
    /// Create a builder for the named layout
    pub fn new(layout: impl Into<String>, registry: &'a ExprRegistry) -> Self {
        Self {
            layout: layout.into(),
            registry,
        }
    }

    /// Build the root node
    ///
    /// The raw value must normalize to exactly one declaration.
    pub fn build(&self, raw: &Value) -> EngineResult<Node> {
        let mut roots = self.build_block(raw)?;
        if roots.len() != 1 {
            return Err(self.malformed(
                "$",
                format!("expected exactly one root declaration, found {}", roots.len()),
            ));
        }
        let root = roots.remove(0);
        root.validate()?;

        tracing::debug!(
            layout = %self.layout,
            nodes = root.node_count(),
            depth = root.depth(),
            "Built layout tree"
        );
        Ok(root)
    }

    /// Normalize a block into a flat list of nodes
    pub fn build_block(&self, raw: &Value) -> EngineResult<Vec<Node>> {
        let mut out = Vec::new();
        self.normalize_block(raw, "$", &mut out)?;
        Ok(out)
    }

    fn normalize_block(&self, raw: &Value, path: &str, out: &mut Vec<Node>) -> EngineResult<()> {
        match raw {
            Value::Null => Ok(()),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.normalize_block(item, &format!("{}[{}]", path, i), out)?;
                }
                Ok(())
            }
            other => {
                out.push(self.normalize_decl(other, path)?);
                Ok(())
            }
        }
    }

    fn normalize_decl(&self, raw: &Value, path: &str) -> EngineResult<Node> {
        match raw {
            Value::String(name) if name.is_empty() => {
                Err(self.malformed(path, "field name cannot be empty"))
            }
            Value::String(name) => Ok(Node::field(name.clone())),
            Value::Object(map) if map.contains_key("field") => self.normalize_field(map, path),
            Value::Object(map) if map.contains_key("tag") => self.normalize_container(map, path),
            Value::Object(_) => Err(self.malformed(path, "declaration needs a 'field' or 'tag' key")),
            other => Err(self.malformed(
                path,
                format!("expected a declaration, found {}", kind_of(other)),
            )),
        }
    }

    fn normalize_field(&self, map: &Map<String, Value>, path: &str) -> EngineResult<Node> {
        if map.contains_key("children") {
            return Err(self.malformed(path, "field declarations cannot have children"));
        }
        self.reject_unknown_keys(map, FIELD_KEYS, path)?;

        let name = self.required_name(map, "field", path)?;
        let mut node = Node::field(name);
        node.opts = self.resolve_opts(map.get("opts"), path)?;
        if let Some(config) = map.get("config") {
            node.config = config.clone();
        }
        Ok(node)
    }

    fn normalize_container(&self, map: &Map<String, Value>, path: &str) -> EngineResult<Node> {
        self.reject_unknown_keys(map, CONTAINER_KEYS, path)?;

        let tag = Tag::parse(&self.required_name(map, "tag", path)?);
        let name = match map.get("name") {
            None if tag == Tag::Field => {
                return Err(self.malformed(path, "field declarations need a name"));
            }
            None => tag.as_str().to_string(),
            Some(_) => self.required_name(map, "name", path)?,
        };

        let mut node = Node::container(tag, name);
        node.opts = self.resolve_opts(map.get("opts"), path)?;
        if let Some(config) = map.get("config") {
            node.config = config.clone();
        }

        match map.get("children") {
            None | Some(Value::Null) => {}
            Some(children @ Value::Array(_)) => {
                self.normalize_block(children, &format!("{}.children", path), &mut node.children)?;
            }
            Some(other) => {
                return Err(self.malformed(
                    &format!("{}.children", path),
                    format!("children must be a block, found {}", kind_of(other)),
                ));
            }
        }

        if node.is_leaf() && !node.children.is_empty() {
            return Err(self.malformed(path, "field declarations cannot have children"));
        }
        Ok(node)
    }

    fn required_name(&self, map: &Map<String, Value>, key: &str, path: &str) -> EngineResult<String> {
        match map.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::String(_)) => Err(self.malformed(path, format!("'{}' cannot be empty", key))),
            Some(other) => Err(self.malformed(
                path,
                format!("'{}' must be a string, found {}", key, kind_of(other)),
            )),
            None => Err(self.malformed(path, format!("missing '{}'", key))),
        }
    }

    fn reject_unknown_keys(&self, map: &Map<String, Value>, allowed: &[&str], path: &str) -> EngineResult<()> {
        match map.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(key) => Err(self.malformed(path, format!("unknown key '{}'", key))),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Option evaluation
    // ========================================================================

    fn resolve_opts(&self, raw: Option<&Value>, path: &str) -> EngineResult<IndexMap<String, OptionValue>> {
        let opts_path = format!("{}.opts", path);
        let constant;
        let map = match raw {
            None | Some(Value::Null) => return Ok(IndexMap::new()),
            Some(value) if expr_name(value, FN_KEY).is_some() => {
                return Err(self.malformed(&opts_path, "functions are only allowed as whole option values"));
            }
            Some(value) if expr_name(value, CONST_KEY).is_some() => {
                constant = self.evaluate(value, &opts_path)?;
                match &constant {
                    Value::Object(map) => map,
                    Value::Null => return Ok(IndexMap::new()),
                    other => {
                        return Err(self.malformed(
                            &opts_path,
                            format!("options constant must be a map, found {}", kind_of(other)),
                        ));
                    }
                }
            }
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(self.malformed(
                    &opts_path,
                    format!("options must be a map, found {}", kind_of(other)),
                ));
            }
        };

        let mut opts = IndexMap::with_capacity(map.len());
        for (key, value) in map {
            let opt_path = format!("{}.opts.{}", path, key);
            let resolved = match expr_name(value, FN_KEY) {
                Some(name) => {
                    let name = name.map_err(|msg| self.malformed(&opt_path, msg))?;
                    let func = self
                        .registry
                        .function(name)
                        .ok_or_else(|| self.unknown(&opt_path, "function", name))?;
                    OptionValue::Computed(func.clone())
                }
                None => OptionValue::Literal(self.evaluate(value, &opt_path)?),
            };
            opts.insert(key.clone(), resolved);
        }
        Ok(opts)
    }

    /// Replace `$const` references anywhere inside a literal
    fn evaluate(&self, value: &Value, path: &str) -> EngineResult<Value> {
        if let Some(name) = expr_name(value, CONST_KEY) {
            let name = name.map_err(|msg| self.malformed(path, msg))?;
            return self
                .registry
                .constant(name)
                .cloned()
                .ok_or_else(|| self.unknown(path, "constant", name));
        }
        if expr_name(value, FN_KEY).is_some() {
            return Err(self.malformed(path, "functions are only allowed as whole option values"));
        }

        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.evaluate(item, &format!("{}[{}]", path, i)))
                .collect::<EngineResult<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), self.evaluate(v, &format!("{}.{}", path, k))?)))
                .collect::<EngineResult<Map<_, _>>>()
                .map(Value::Object),
            other => Ok(other.clone()),
        }
    }

    fn malformed(&self, path: &str, msg: impl Into<String>) -> EngineError {
        EngineError::malformed_layout(&self.layout, path, msg)
    }

    fn unknown(&self, path: &str, kind: &str, name: &str) -> EngineError {
        EngineError::UnknownExpression {
            layout: self.layout.clone(),
            path: path.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }
}

/// Recognize a single-key expression object like `{"$const": "NAME"}`
fn expr_name<'v>(value: &'v Value, key: &str) -> Option<Result<&'v str, String>> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    let inner = map.get(key)?;
    Some(
        inner
            .as_str()
            .ok_or_else(|| format!("'{}' expects a name, found {}", key, kind_of(inner))),
    )
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a block",
        Value::Object(_) => "a map",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry() -> ExprRegistry {
        ExprRegistry::new()
            .with_constant("PAGE_SIZES", json!([10, 40, 100]))
            .with_constant("WIDE", "col-span-2")
            .with_constant("MONEY_OPTS", json!({"label": "Amount", "step": {"$const": "WIDE"}}))
            .with_function("shout_title", |ctx| Value::from(ctx.title.to_uppercase()))
    }

    fn build(raw: Value) -> EngineResult<Node> {
        let reg = registry();
        LayoutBuilder::new("product_form", &reg).build(&raw)
    }

    #[test]
    fn test_bare_field_reference() {
        let node = build(json!("price")).unwrap();
        assert_eq!(node, Node::field("price"));
        assert_eq!(node.config, json!([]));
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_container_with_nested_blocks_is_flattened() {
        let node = build(json!({
            "tag": "form",
            "name": "product",
            "children": [
                "name",
                ["price", ["stock"]],
                null,
                {"tag": "group", "name": "extra", "children": ["description"]}
            ]
        }))
        .unwrap();

        let names: Vec<_> = node.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["name", "price", "stock", "extra"]);
        assert_eq!(node.children[3].tag, Tag::Group);
        assert_eq!(node.field_names(), ["name", "price", "stock", "description"]);
        assert_eq!(node.depth(), 3);
    }

    #[test]
    fn test_empty_block_has_no_children() {
        let node = build(json!({"tag": "group", "name": "empty", "children": []})).unwrap();
        assert!(node.children.is_empty());

        let node = build(json!({"tag": "group", "name": "nulls", "children": [null, []]})).unwrap();
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_root_block_with_single_declaration() {
        let node = build(json!([{"tag": "show", "name": "product", "children": ["name"]}])).unwrap();
        assert_eq!(node.tag, Tag::Show);
    }

    #[test]
    fn test_root_block_with_many_declarations_is_rejected() {
        let err = build(json!(["name", "price"])).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_container_name_defaults_to_tag() {
        let node = build(json!({"tag": "sections", "children": []})).unwrap();
        assert_eq!(node.name, "sections");
    }

    #[test]
    fn test_field_options_are_evaluated() {
        let node = build(json!({
            "tag": "index",
            "name": "products",
            "opts": {
                "page_sizes": {"$const": "PAGE_SIZES"},
                "page_title": {"$fn": "shout_title"},
                "layout": {"class": {"$const": "WIDE"}, "cols": [1, {"$const": "WIDE"}]}
            },
            "children": [{"field": "price", "opts": {"label": "Cost"}, "config": {"align": "right"}}]
        }))
        .unwrap();

        assert_eq!(node.opt("page_sizes"), Some(&OptionValue::Literal(json!([10, 40, 100]))));
        assert!(matches!(node.opt("page_title"), Some(OptionValue::Computed(f)) if f.name() == "shout_title"));
        assert_eq!(
            node.opt("layout").and_then(OptionValue::as_literal),
            Some(&json!({"class": "col-span-2", "cols": [1, "col-span-2"]}))
        );

        let price = &node.children[0];
        assert_eq!(price.opt("label"), Some(&OptionValue::from("Cost")));
        assert_eq!(price.config, json!({"align": "right"}));
    }

    #[test]
    fn test_stored_tree_contains_no_expressions() {
        let node = build(json!({"field": "price", "opts": {"sizes": [{"$const": "PAGE_SIZES"}]}})).unwrap();
        let serialized = serde_json::to_string(&node).unwrap();
        assert!(!serialized.contains("$const"));
    }

    #[test]
    fn test_whole_options_constant_is_expanded() {
        let node = build(json!({"field": "price", "opts": {"$const": "MONEY_OPTS"}})).unwrap();
        assert_eq!(node.opt("label").and_then(OptionValue::as_literal), Some(&json!("Amount")));
        assert!(node.opt("$const").is_none());
        let serialized = serde_json::to_string(&node).unwrap();
        assert!(!serialized.contains("$const"));

        let err = build(json!({"field": "price", "opts": {"$const": "WIDE"}})).unwrap_err();
        assert!(err.to_string().contains("options constant must be a map"));
    }

    #[test]
    fn test_whole_options_function_is_fatal() {
        let err = build(json!({"field": "price", "opts": {"$fn": "shout_title"}})).unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("$.opts"));
    }

    #[test]
    fn test_unknown_constant_is_fatal() {
        let err = build(json!({"field": "price", "opts": {"sizes": {"$const": "NOPE"}}})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown constant 'NOPE' referenced in layout 'product_form' at $.opts.sizes"
        );
    }

    #[test]
    fn test_nested_function_is_fatal() {
        let err = build(json!({"field": "price", "opts": {"x": [{"$fn": "shout_title"}]}})).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_field_with_children_is_fatal() {
        let err = build(json!({"field": "price", "children": ["x"]})).unwrap_err();
        assert!(err.to_string().contains("cannot have children"));

        let err = build(json!({"tag": "field", "name": "price", "children": ["x"]})).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_malformed_shapes_name_the_offending_declaration() {
        let err = build(json!({"tag": "form", "name": "p", "children": ["a", {"tag": "group", "name": "g", "children": [42]}]}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed layout 'product_form' at $.children[1].children[0]: expected a declaration, found a number"
        );

        let err = build(json!({"tag": "form", "name": "p", "kids": []})).unwrap_err();
        assert!(err.to_string().contains("unknown key 'kids'"));

        let err = build(json!({"tag": "form", "name": "p", "children": "a"})).unwrap_err();
        assert!(err.to_string().contains("children must be a block"));

        let err = build(json!({"name": "p"})).unwrap_err();
        assert!(err.to_string().contains("needs a 'field' or 'tag' key"));

        let err = build(json!({"field": ""})).unwrap_err();
        assert!(err.is_structural());

        let err = build(json!({"field": "p", "opts": [1]})).unwrap_err();
        assert!(err.to_string().contains("options must be a map"));
    }

    #[test]
    fn test_tree_well_formedness() {
        let node = build(json!({
            "tag": "form", "name": "p",
            "children": [{"tag": "sections", "children": [{"tag": "section", "name": "a", "children": ["x", "y"]}]}]
        }))
        .unwrap();
        assert!(node.is_valid());
        for leaf in node.leaves() {
            assert_eq!(leaf.tag, Tag::Field);
            assert!(leaf.children.is_empty());
        }

        let broken = Node::field("x").with_child(Node::field("y"));
        assert!(!broken.is_valid());
    }

    #[test]
    fn test_find_nodes() {
        let node = Node::container(Tag::Form, "p")
            .with_child(Node::container(Tag::Group, "g").with_child(Node::field("price")));
        assert_eq!(node.find("price").map(|n| n.tag.clone()), Some(Tag::Field));
        assert!(node.find_tagged(&Tag::Group, "g").is_some());
        assert!(node.find_tagged(&Tag::Section, "g").is_none());
        assert_eq!(node.node_count(), 3);
    }

    #[test]
    fn test_computed_option_serializes_by_name() {
        let reg = registry();
        let func = reg.function("shout_title").unwrap().clone();
        let node = Node::field("price").with_opt("label", OptionValue::Computed(func));
        assert_eq!(
            serde_json::to_value(&node).unwrap()["opts"],
            json!({"label": {"$fn": "shout_title"}})
        );
    }
}
