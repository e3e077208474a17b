//! Option resolution
//!
//! The renderer asks for layout options one key at a time. An explicit value
//! on the node always wins; otherwise a fixed chain of default providers is
//! consulted for the node's tag and the first concrete value is returned.
//! Running out of providers yields `None`, never an error.

use crate::layout::{Node, OptionValue, Tag};
use crate::naming::humanize;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Render context
// ============================================================================

/// Which page is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Index,
    Show,
    Form,
}

impl RenderMode {
    /// Mode matching a page-level tag
    pub fn for_tag(tag: &Tag) -> Option<Self> {
        match tag {
            Tag::Index => Some(RenderMode::Index),
            Tag::Show => Some(RenderMode::Show),
            Tag::Form => Some(RenderMode::Form),
            _ => None,
        }
    }
}

/// Per-render state handed to computed options and default providers
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    /// Page being rendered
    pub mode: RenderMode,

    /// Resource name (e.g. "line_item")
    pub resource_name: String,

    /// Singular display name (e.g. "Line item")
    pub display_name: String,

    /// Plural title (e.g. "Line Items")
    pub title: String,

    /// Owning resource, for field-level defaults
    pub resource: Option<&'a Resource>,
}

impl<'a> RenderContext<'a> {
    /// Context with names only and no field access
    pub fn new(
        mode: RenderMode,
        resource_name: impl Into<String>,
        display_name: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            resource_name: resource_name.into(),
            display_name: display_name.into(),
            title: title.into(),
            resource: None,
        }
    }

    /// Context derived from a composed resource
    pub fn for_resource(mode: RenderMode, resource: &'a Resource) -> Self {
        Self {
            mode,
            resource_name: resource.name.clone(),
            display_name: resource.display_name(),
            title: resource.title(),
            resource: Some(resource),
        }
    }

    /// Replace `{name}`, `{title}`, `{resource}` and `{node}` placeholders
    ///
    /// Unknown placeholders and unbalanced braces are left as written.
    pub fn substitute(&self, template: &str, node: &Node) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    let key = &after[..end];
                    match self.placeholder(key, node) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn placeholder<'s>(&'s self, key: &str, node: &'s Node) -> Option<&'s str> {
        match key {
            "name" => Some(&self.display_name),
            "title" => Some(&self.title),
            "resource" => Some(&self.resource_name),
            "node" => Some(&node.name),
            _ => None,
        }
    }
}

// ============================================================================
// Defaults
// ============================================================================

/// Configurable values behind the built-in providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Rows per index page
    pub items_per_page: u32,

    /// Rows fetched per infinite-scroll batch
    pub infinity_scroll_items_load: u32,

    /// Pagination bar range offset at the smallest breakpoint
    pub pages_bar_range_offset: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            items_per_page: 40,
            infinity_scroll_items_load: 200,
            pages_bar_range_offset: 1,
        }
    }
}

impl DefaultsConfig {
    /// Set rows per index page
    pub fn with_items_per_page(mut self, items: u32) -> Self {
        self.items_per_page = items;
        self
    }

    /// Set the base pagination bar offset
    pub fn with_pages_bar_range_offset(mut self, offset: u32) -> Self {
        self.pages_bar_range_offset = offset;
        self
    }
}

// ============================================================================
// Providers
// ============================================================================

/// A default provider: returns a value for the key or `None` to pass
pub type Provider = fn(&DefaultsConfig, &RenderContext<'_>, &Node, &str) -> Option<Value>;

const INDEX_CHAIN: &[Provider] = &[page_defaults, pagination_defaults, common_defaults];
const PAGE_CHAIN: &[Provider] = &[page_defaults, common_defaults];
const FIELD_CHAIN: &[Provider] = &[field_defaults, common_defaults];
const CONTAINER_CHAIN: &[Provider] = &[common_defaults];

/// Provider chain consulted for a tag, in order
pub fn provider_chain(tag: &Tag) -> &'static [Provider] {
    match tag {
        Tag::Index => INDEX_CHAIN,
        Tag::Show | Tag::Form => PAGE_CHAIN,
        Tag::Field => FIELD_CHAIN,
        _ => CONTAINER_CHAIN,
    }
}

fn page_defaults(_: &DefaultsConfig, ctx: &RenderContext<'_>, node: &Node, key: &str) -> Option<Value> {
    let text = match (&node.tag, key) {
        (Tag::Index, "page_title") => format!("Listing {}", ctx.title),
        (Tag::Show, "page_title") => format!("{} Details", ctx.display_name),
        (Tag::Show, "page_subtitle") => format!("Details of the {}", ctx.display_name),
        (Tag::Form, "page_title") => ctx.display_name.clone(),
        (Tag::Form, "page_subtitle") => {
            format!("Use this form to manage {} records", ctx.display_name)
        }
        _ => return None,
    };
    Some(Value::from(text))
}

fn pagination_defaults(
    defaults: &DefaultsConfig,
    _: &RenderContext<'_>,
    _: &Node,
    key: &str,
) -> Option<Value> {
    let base = defaults.pages_bar_range_offset;
    let value = match key {
        "pagination_items_per_page" => defaults.items_per_page,
        "infinity_scroll_items_load" => defaults.infinity_scroll_items_load,
        "pages_bar_range_offset" => base,
        "pages_bar_range_offset_sm" => base.saturating_mul(2),
        "pages_bar_range_offset_md" => base.saturating_mul(3),
        "pages_bar_range_offset_lg" => base.saturating_mul(4),
        "pages_bar_range_offset_xl" => base.saturating_mul(5),
        _ => return None,
    };
    Some(Value::from(value))
}

fn field_defaults(_: &DefaultsConfig, ctx: &RenderContext<'_>, node: &Node, key: &str) -> Option<Value> {
    ctx.resource?.field(&node.name)?.property(key)
}

fn common_defaults(_: &DefaultsConfig, ctx: &RenderContext<'_>, node: &Node, key: &str) -> Option<Value> {
    match key {
        "title" => Some(Value::from(humanize(&node.name))),
        "name" => Some(Value::from(node.name.clone())),
        "resource" => Some(Value::from(ctx.resource_name.clone())),
        _ => None,
    }
}

// ============================================================================
// OptionResolver
// ============================================================================

/// Cascading lookup of layout options
#[derive(Debug, Clone, Default)]
pub struct OptionResolver {
    defaults: DefaultsConfig,
}

impl OptionResolver {
    /// Create a resolver over the given defaults
    pub fn new(defaults: DefaultsConfig) -> Self {
        Self { defaults }
    }

    /// Defaults in use
    pub fn defaults(&self) -> &DefaultsConfig {
        &self.defaults
    }

    /// Resolve one option for a node
    pub fn resolve(&self, ctx: &RenderContext<'_>, node: &Node, key: &str) -> Option<Value> {
        if let Some(explicit) = node.opt(key) {
            return Some(match explicit {
                OptionValue::Computed(func) => func.call(ctx),
                OptionValue::Literal(Value::String(s)) => Value::from(ctx.substitute(s, node)),
                OptionValue::Literal(value) => value.clone(),
            });
        }

        let found = provider_chain(&node.tag)
            .iter()
            .find_map(|provider| provider(&self.defaults, ctx, node, key));

        if found.is_none() {
            tracing::trace!(node = %node.name, tag = %node.tag, key, "Option not found");
        }
        found
    }

    /// Resolve an option that must be a string
    pub fn resolve_str(&self, ctx: &RenderContext<'_>, node: &Node, key: &str) -> Option<String> {
        match self.resolve(ctx, node, key)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
