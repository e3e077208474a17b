//! Resource definitions
//!
//! A `Resource` is a named, ordered collection of fields serving one schema.
//! `fields` is the lookup structure; `fields_order` is the authoritative
//! order. Every mutation goes through methods that keep both in sync.

use crate::field::Field;
use crate::naming::{humanize, pluralize, title_case};
use formwright_core::{EngineError, EngineResult, Named, Validatable};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Resource
// ============================================================================

/// A named field collection for one schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource name (snake_case, e.g. "line_item" or "order__address")
    pub name: String,

    /// Schema identity this resource describes
    pub schema: String,

    /// Owning context/module, if any
    #[serde(default)]
    pub context: Option<String>,

    /// Fields keyed by field key
    fields: IndexMap<String, Field>,

    /// Authoritative field order
    fields_order: Vec<String>,
}

impl Resource {
    /// Create a resource with no fields
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            context: None,
            fields: IndexMap::new(),
            fields_order: Vec::new(),
        }
    }

    /// Set the owning context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Replace all fields; order follows the map's order
    pub fn with_fields(mut self, fields: IndexMap<String, Field>) -> Self {
        self.set_fields(fields);
        self
    }

    // ========================================================================
    // Field management
    // ========================================================================

    /// Replace all fields; order follows the map's order
    pub fn set_fields(&mut self, fields: IndexMap<String, Field>) {
        self.fields_order = fields.keys().cloned().collect();
        self.fields = fields;
    }

    /// Fields keyed by field key
    pub fn fields(&self) -> &IndexMap<String, Field> {
        &self.fields
    }

    /// Field keys in authoritative order
    pub fn fields_order(&self) -> &[String] {
        &self.fields_order
    }

    /// Take the fields out, in authoritative order
    pub fn take_fields(&mut self) -> IndexMap<String, Field> {
        let mut fields = std::mem::take(&mut self.fields);
        let order = std::mem::take(&mut self.fields_order);
        order
            .into_iter()
            .filter_map(|key| fields.swap_remove(&key).map(|f| (key, f)))
            .collect()
    }

    /// Get a field by key
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// Get a mutable field by key
    pub fn field_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.fields.get_mut(key)
    }

    /// Check if a field with the key exists
    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Get the number of fields
    pub fn field_count(&self) -> usize {
        self.fields_order.len()
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Fields in authoritative order
    pub fn ordered_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields_order.iter().filter_map(|k| self.fields.get(k))
    }

    /// Fields that appear in generated UI (not omitted), in order
    pub fn visible_fields(&self) -> impl Iterator<Item = &Field> {
        self.ordered_fields().filter(|f| f.is_visible())
    }

    /// Fields synthesized from relations and embeds, in order
    pub fn association_fields(&self) -> impl Iterator<Item = &Field> {
        self.ordered_fields().filter(|f| f.is_association())
    }

    /// Singular display name: `"line_item"` → `"Line item"`
    pub fn display_name(&self) -> String {
        humanize(self.leaf_name())
    }

    /// Plural title: `"line_item"` → `"Line Items"`
    pub fn title(&self) -> String {
        pluralize(&title_case(self.leaf_name()))
    }

    /// Last segment of a nested name (`"order__address"` → `"address"`)
    fn leaf_name(&self) -> &str {
        self.name
            .rsplit(crate::naming::NESTED_SEPARATOR)
            .next()
            .unwrap_or(&self.name)
    }

    /// Check if this resource was generated for an embed
    pub fn is_nested(&self) -> bool {
        self.name.contains(crate::naming::NESTED_SEPARATOR)
    }
}

impl Named for Resource {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Validatable for Resource {
    fn validate(&self) -> EngineResult<()> {
        if self.name.is_empty() {
            return Err(EngineError::validation("Resource name cannot be empty"));
        }

        if self.fields_order.len() != self.fields.len() {
            return Err(EngineError::resource_validation(
                &self.name,
                format!(
                    "field order lists {} keys but {} fields exist",
                    self.fields_order.len(),
                    self.fields.len()
                ),
            ));
        }

        let mut seen = HashSet::new();
        for key in &self.fields_order {
            if !seen.insert(key.as_str()) {
                return Err(EngineError::resource_validation(
                    &self.name,
                    format!("field '{}' appears twice in the order", key),
                ));
            }
            match self.fields.get(key) {
                None => {
                    return Err(EngineError::resource_validation(
                        &self.name,
                        format!("ordered key '{}' has no field", key),
                    ));
                }
                Some(field) if field.key != *key => {
                    return Err(EngineError::resource_validation(
                        &self.name,
                        format!("field stored under '{}' is keyed '{}'", key, field.key),
                    ));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::build_catalogue;
    use crate::schema::SchemaDescriptor;
    use pretty_assertions::assert_eq;

    fn product() -> Resource {
        let schema = SchemaDescriptor::new("Shop.Product")
            .attribute("id", "id")
            .attribute("name", "string")
            .attribute("inserted_at", "naive_datetime");
        Resource::new("product", "Shop.Product").with_fields(build_catalogue(&schema, Some("product")))
    }

    #[test]
    fn test_resource_order_follows_fields() {
        let r = product();
        assert_eq!(r.fields_order(), ["id", "name", "inserted_at"]);
        assert_eq!(r.field_count(), 3);
        assert!(r.is_valid());
    }

    #[test]
    fn test_visible_fields_skip_omitted() {
        let r = product();
        let visible: Vec<_> = r.visible_fields().map(|f| f.key.as_str()).collect();
        assert_eq!(visible, ["id", "name"]);
        assert!(r.field("inserted_at").is_some());
    }

    #[test]
    fn test_take_fields_preserves_order() {
        let mut r = product();
        let fields = r.take_fields();
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["id", "name", "inserted_at"]);
        assert_eq!(r.field_count(), 0);
    }

    #[test]
    fn test_display_name_and_title() {
        let r = Resource::new("line_item", "Shop.LineItem");
        assert_eq!(r.display_name(), "Line item");
        assert_eq!(r.title(), "Line Items");

        let nested = Resource::new("order__address", "Shop.Address");
        assert!(nested.is_nested());
        assert_eq!(nested.display_name(), "Address");
        assert_eq!(nested.title(), "Addresses");
    }

    #[test]
    fn test_validate_detects_mismatched_key() {
        let mut r = product();
        r.field_mut("name").unwrap().key = "title".to_string();
        let err = r.validate().unwrap_err();
        assert!(err.is_validation());
    }
}
