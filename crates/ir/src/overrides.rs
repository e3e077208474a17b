//! Override merging
//!
//! Users declare per-field change sets. [`merge_overrides`] flattens them
//! (later options win per option), applies them onto the catalogue, and
//! moves every mentioned field to the front in first-mention order.

use crate::field::{Field, FieldPatch};
use crate::schema::SchemaDescriptor;
use formwright_core::{Diagnostics, Warning, WarningCode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// FieldOverride
// ============================================================================

/// One override directive: a field key plus a partial attribute map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOverride {
    /// Target field key
    pub field: String,

    /// Options to set
    #[serde(flatten)]
    pub patch: FieldPatch,
}

impl FieldOverride {
    /// Create a directive
    pub fn new(field: impl Into<String>, patch: FieldPatch) -> Self {
        Self {
            field: field.into(),
            patch,
        }
    }
}

// ============================================================================
// Merge
// ============================================================================

/// Flatten directives into one patch per key, keyed in first-mention order
pub fn flatten_overrides(directives: &[FieldOverride]) -> IndexMap<String, FieldPatch> {
    let mut merged: IndexMap<String, FieldPatch> = IndexMap::new();
    for directive in directives {
        merged
            .entry(directive.field.clone())
            .or_default()
            .merge(directive.patch.clone());
    }
    merged
}

/// Apply override directives to a field catalogue
///
/// Mentioned keys come first in first-mention order, followed by untouched
/// base fields in their original order. A key missing from the base gets a
/// blank field carrying only the override's options, and a warning. With no
/// directives the base is returned unchanged.
pub fn merge_overrides(
    resource: &str,
    base: IndexMap<String, Field>,
    directives: &[FieldOverride],
    diagnostics: &mut Diagnostics,
) -> IndexMap<String, Field> {
    merge_with(resource, base, directives, |_| false, diagnostics)
}

/// Apply override directives to the catalogue built from `schema`
///
/// Like [`merge_overrides`], except that keys naming one of the schema's
/// relations or embeds are expected to be missing from the catalogue. They
/// still get a blank field, which association expansion later enriches in
/// place, but no warning.
pub fn merge_schema_overrides(
    resource: &str,
    schema: &SchemaDescriptor,
    base: IndexMap<String, Field>,
    directives: &[FieldOverride],
    diagnostics: &mut Diagnostics,
) -> IndexMap<String, Field> {
    merge_with(resource, base, directives, |key| schema.is_association_key(key), diagnostics)
}

fn merge_with(
    resource: &str,
    mut base: IndexMap<String, Field>,
    directives: &[FieldOverride],
    is_association: impl Fn(&str) -> bool,
    diagnostics: &mut Diagnostics,
) -> IndexMap<String, Field> {
    if directives.is_empty() {
        return base;
    }

    let merged = flatten_overrides(directives);
    let mut result = IndexMap::with_capacity(base.len() + merged.len());

    for (key, patch) in merged {
        let mut field = match base.shift_remove(&key) {
            Some(field) => field,
            None => {
                if !is_association(&key) {
                    diagnostics.warn(
                        Warning::new(
                            WarningCode::UnknownField,
                            format!("override targets '{}' which the schema does not define", key),
                        )
                        .with_path(format!("{}.fields.{}", resource, key)),
                    );
                }
                let mut field = Field::blank(key.clone());
                field.resource = Some(resource.to_string());
                field
            }
        };
        patch.apply(&mut field);
        result.insert(key, field);
    }

    // shift_remove keeps the remaining base fields in original order
    result.extend(base);

    tracing::debug!(
        resource,
        directives = directives.len(),
        fields = result.len(),
        "Merged field overrides"
    );
    result
}

// ============================================================================
// Tests
// ============================================================================
