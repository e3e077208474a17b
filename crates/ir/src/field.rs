//! Field definitions and the field catalogue builder
//!
//! A `Field` is the UI-facing description of one schema attribute or one
//! synthesized relation/embed. [`build_catalogue`] derives one field per
//! schema attribute with the display defaults the renderer relies on.

use crate::naming::humanize;
use crate::schema::{Attribute, SchemaDescriptor};
use formwright_core::{Cardinality, HtmlType, SemanticType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attributes rendered read-only by default
pub const DISABLED_BY_DEFAULT: &[&str] = &["id", "deleted", "inactive"];

/// Auto-managed timestamps left out of generated UI
pub const OMITTED_BY_DEFAULT: &[&str] = &["inserted_at", "updated_at"];

/// Placeholder hint for date and date-time inputs
pub const DATETIME_PLACEHOLDER: &str = "YYYY-MM-DD HH:MM:SS";

/// Placeholder hint for time inputs
pub const TIME_PLACEHOLDER: &str = "HH:MM:SS";

// ============================================================================
// Field
// ============================================================================

/// Represents one field of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Key, unique within the resource
    pub key: String,

    /// Semantic type
    #[serde(rename = "type")]
    pub field_type: SemanticType,

    /// Input kind for the renderer
    pub html_type: HtmlType,

    /// Display label
    pub label: String,

    /// Input placeholder
    pub placeholder: String,

    /// Maximum input length
    pub length: u32,

    /// Numeric precision
    pub precision: u32,

    /// Numeric scale
    pub scale: u32,

    /// Rendered read-only
    pub disabled: bool,

    /// Excluded from generated UI (kept for override inspection)
    pub omitted: bool,

    /// Rendered but not shown
    pub hidden: bool,

    /// Offered as a list filter
    pub filterable: bool,

    /// Owning resource name
    pub resource: Option<String>,

    /// Relation or embed details for synthesized fields
    pub relation: Option<RelationInfo>,

    /// Renderer-specific options carried through untouched
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extras: IndexMap<String, Value>,
}

impl Field {
    /// Create a field with blank attributes
    ///
    /// Used when an override names a key the schema does not define: only
    /// the override's options end up set.
    pub fn blank(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field_type: SemanticType::String,
            html_type: HtmlType::Text,
            label: String::new(),
            placeholder: String::new(),
            length: 0,
            precision: 0,
            scale: 0,
            disabled: false,
            omitted: false,
            hidden: false,
            filterable: false,
            resource: None,
            relation: None,
            extras: IndexMap::new(),
        }
    }

    /// Derive a field from a schema attribute
    pub fn from_attribute(attribute: &Attribute, resource: Option<&str>) -> Self {
        let ty = &attribute.ty;
        let name = attribute.name.as_str();
        let label = humanize(name);

        let placeholder = if ty.is_numeric() {
            "0".to_string()
        } else if ty.is_temporal() {
            DATETIME_PLACEHOLDER.to_string()
        } else if *ty == SemanticType::Time {
            TIME_PLACEHOLDER.to_string()
        } else {
            label.clone()
        };

        Self {
            key: attribute.name.clone(),
            field_type: ty.clone(),
            html_type: HtmlType::for_semantic_type(ty),
            label,
            placeholder,
            length: default_length(ty),
            precision: if ty.is_numeric() { 10 } else { 0 },
            scale: if ty.is_fractional() { 2 } else { 0 },
            disabled: DISABLED_BY_DEFAULT.contains(&name),
            omitted: OMITTED_BY_DEFAULT.contains(&name),
            hidden: false,
            filterable: true,
            resource: resource.map(str::to_string),
            relation: None,
            extras: IndexMap::new(),
        }
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Check if this field was synthesized from a relation or embed
    pub fn is_association(&self) -> bool {
        self.relation.is_some()
    }

    /// Check if the field should appear in generated UI
    pub fn is_visible(&self) -> bool {
        !self.omitted
    }

    /// Name of the resource the relation points at, if resolved
    pub fn related_resource(&self) -> Option<&str> {
        self.relation.as_ref().and_then(|r| r.resource.as_deref())
    }

    /// Look up one of the field's properties by its option name
    ///
    /// This is how layout option resolution reads field-level defaults.
    pub fn property(&self, key: &str) -> Option<Value> {
        let value = match key {
            "key" | "name" => Value::from(self.key.clone()),
            "type" => Value::from(self.field_type.as_str()),
            "html_type" => Value::from(self.html_type.as_str()),
            "label" => Value::from(self.label.clone()),
            "placeholder" => Value::from(self.placeholder.clone()),
            "length" => Value::from(self.length),
            "precision" => Value::from(self.precision),
            "scale" => Value::from(self.scale),
            "disabled" => Value::from(self.disabled),
            "omitted" => Value::from(self.omitted),
            "hidden" => Value::from(self.hidden),
            "filterable" => Value::from(self.filterable),
            "resource" => Value::from(self.resource.clone()?),
            "related_resource" => Value::from(self.related_resource()?),
            other => return self.extras.get(other).cloned(),
        };
        Some(value)
    }
}

/// Default input length per semantic type
fn default_length(ty: &SemanticType) -> u32 {
    match ty {
        t if t.is_uuid_like() => 34,
        t if t.is_text_like() => 255,
        SemanticType::Id | SemanticType::Integer => 10,
        t if t.is_fractional() => 12,
        t if t.is_temporal() => 20,
        SemanticType::Time => 10,
        SemanticType::Boolean => 5,
        _ => 50,
    }
}

// ============================================================================
// RelationInfo
// ============================================================================

/// Relation details attached to synthesized association and embed fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationInfo {
    /// One related record or many
    pub cardinality: Cardinality,

    /// Schema identity of the related side
    pub related_schema: String,

    /// Resource serving the related schema; `None` when none is declared
    pub resource: Option<String>,

    /// Key on the owner side (relations only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_key: Option<String>,

    /// Key on the related side (relations only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_key: Option<String>,

    /// Owning schema (embeds only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Resource namespace generated for the embed (`parent__child`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_resource: Option<String>,
}

// ============================================================================
// FieldPatch
// ============================================================================

/// A partial set of field attributes, as written in override directives
///
/// Unset entries leave the target untouched. Keys the engine does not know
/// are kept in `extras` for the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<SemanticType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_type: Option<HtmlType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omitted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(flatten)]
    pub extras: IndexMap<String, Value>,
}

impl FieldPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the placeholder
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the input kind
    pub fn html_type(mut self, html_type: HtmlType) -> Self {
        self.html_type = Some(html_type);
        self
    }

    /// Set the maximum length
    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Set the disabled flag
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    /// Set the omitted flag
    pub fn omitted(mut self, omitted: bool) -> Self {
        self.omitted = Some(omitted);
        self
    }

    /// Set the hidden flag
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    /// Set the filterable flag
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = Some(filterable);
        self
    }

    /// Set a renderer-specific option
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    // ========================================================================
    // Merge / apply
    // ========================================================================

    /// Merge a later patch over this one, option by option
    pub fn merge(&mut self, later: FieldPatch) {
        fn take<T>(slot: &mut Option<T>, later: Option<T>) {
            if later.is_some() {
                *slot = later;
            }
        }

        take(&mut self.field_type, later.field_type);
        take(&mut self.html_type, later.html_type);
        take(&mut self.label, later.label);
        take(&mut self.placeholder, later.placeholder);
        take(&mut self.length, later.length);
        take(&mut self.precision, later.precision);
        take(&mut self.scale, later.scale);
        take(&mut self.disabled, later.disabled);
        take(&mut self.omitted, later.omitted);
        take(&mut self.hidden, later.hidden);
        take(&mut self.filterable, later.filterable);
        take(&mut self.resource, later.resource);
        self.extras.extend(later.extras);
    }

    /// Write every set option onto a field
    pub fn apply(&self, field: &mut Field) {
        if let Some(v) = &self.field_type {
            field.field_type = v.clone();
        }
        if let Some(v) = &self.html_type {
            field.html_type = v.clone();
        }
        if let Some(v) = &self.label {
            field.label = v.clone();
        }
        if let Some(v) = &self.placeholder {
            field.placeholder = v.clone();
        }
        if let Some(v) = self.length {
            field.length = v;
        }
        if let Some(v) = self.precision {
            field.precision = v;
        }
        if let Some(v) = self.scale {
            field.scale = v;
        }
        if let Some(v) = self.disabled {
            field.disabled = v;
        }
        if let Some(v) = self.omitted {
            field.omitted = v;
        }
        if let Some(v) = self.hidden {
            field.hidden = v;
        }
        if let Some(v) = self.filterable {
            field.filterable = v;
        }
        if let Some(v) = &self.resource {
            field.resource = Some(v.clone());
        }
        for (k, v) in &self.extras {
            field.extras.insert(k.clone(), v.clone());
        }
    }

    /// Check if the patch sets nothing
    pub fn is_empty(&self) -> bool {
        *self == FieldPatch::default()
    }
}

// ============================================================================
// Catalogue Builder
// ============================================================================

/// Derive one field per schema attribute, in declaration order
///
/// Never fails: attributes with unrecognized types still get a field whose
/// input kind is the raw type name.
pub fn build_catalogue(schema: &SchemaDescriptor, resource: Option<&str>) -> IndexMap<String, Field> {
    let fields: IndexMap<String, Field> = schema
        .attributes
        .iter()
        .map(|attr| (attr.name.clone(), Field::from_attribute(attr, resource)))
        .collect();

    tracing::debug!(
        schema = %schema.name,
        count = fields.len(),
        "Built field catalogue"
    );
    fields
}

// ============================================================================
// Tests
// ============================================================================
