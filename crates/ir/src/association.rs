//! Association and embed expansion
//!
//! Relations and embedded structures on a schema become extra fields on the
//! resource, tagged with cardinality and linked to the resource that serves
//! the related schema.
//!
//! ## Linking rules
//!
//! - **has many** → `one_to_many_association`, cardinality many
//! - **belongs to / has one** → `many_to_one_association`, cardinality one
//! - **embeds one** → `embeds_one`, nested resource `parent__field`
//! - **embeds many** → `embeds_many`, linked to the nested resource
//!   `parent__field` so it renders like an association

use crate::field::{Field, RelationInfo};
use crate::naming::{humanize, nested_resource_name};
use crate::resource::Resource;
use crate::schema::{EmbedDescriptor, RelationDescriptor, SchemaDescriptor};
use formwright_core::{Cardinality, Diagnostics, HtmlType, SemanticType, Warning, WarningCode};
use indexmap::IndexMap;

// ============================================================================
// Resolution
// ============================================================================

/// Find the first resource (in declaration order) serving a schema
pub fn resolve_related_resource<'a>(schema: &str, all_resources: &'a [Resource]) -> Option<&'a str> {
    all_resources
        .iter()
        .find(|r| r.schema == schema)
        .map(|r| r.name.as_str())
}

// ============================================================================
// Field synthesis
// ============================================================================

/// Build the field for a relation
pub fn relation_field(resource: &str, relation: &RelationDescriptor, related: Option<&str>) -> Field {
    let ty = relation.kind.field_type();
    let mut field = association_base(&relation.field, ty, resource);
    field.filterable = relation.kind.cardinality() == Cardinality::One;
    field.relation = Some(RelationInfo {
        cardinality: relation.kind.cardinality(),
        related_schema: relation.related.clone(),
        resource: related.map(str::to_string),
        owner_key: Some(relation.owner_key.clone()),
        related_key: Some(relation.related_key.clone()),
        owner: None,
        nested_resource: None,
    });
    field
}

/// Build the field for an embedded structure
///
/// `linked` is the nested resource when one was registered; otherwise the
/// field keeps only the synthesized nested name and links nowhere.
pub fn embed_field(resource: &str, owner_schema: &str, embed: &EmbedDescriptor, linked: Option<&str>) -> Field {
    let nested = nested_resource_name(resource, &embed.field);
    let mut field = association_base(&embed.field, embed.field_type(), resource);
    field.filterable = false;
    field.relation = Some(RelationInfo {
        cardinality: embed.cardinality,
        related_schema: embed.related.clone(),
        resource: linked.map(str::to_string),
        owner_key: None,
        related_key: None,
        owner: Some(owner_schema.to_string()),
        nested_resource: Some(nested),
    });
    field
}

fn association_base(key: &str, ty: SemanticType, resource: &str) -> Field {
    let mut field = Field::blank(key);
    field.html_type = HtmlType::Other(ty.as_str().to_string());
    field.field_type = ty;
    field.label = humanize(key);
    field.placeholder = field.label.clone();
    field.resource = Some(resource.to_string());
    field
}

// ============================================================================
// Expansion
// ============================================================================

/// Prepend relation and embed fields to a resource
///
/// Relations come first in declaration order, then embeds, then the
/// existing fields. Expansion is idempotent: keys already carrying relation
/// info are left alone. A key that exists without relation info (an override
/// mentioned it before expansion) is enriched in place, keeping its overrides
/// and its position.
pub fn expand_associations(
    mut resource: Resource,
    schema: &SchemaDescriptor,
    all_resources: &[Resource],
    diagnostics: &mut Diagnostics,
) -> Resource {
    let mut existing = resource.take_fields();
    let mut prepended: IndexMap<String, Field> = IndexMap::new();
    let already_linked =
        |existing: &IndexMap<String, Field>, key: &str| existing.get(key).is_some_and(|f| f.relation.is_some());

    let mut synthesized = Vec::with_capacity(schema.relations.len() + schema.embeds.len());
    for relation in &schema.relations {
        if already_linked(&existing, &relation.field) {
            continue;
        }
        let related = resolve_related_resource(&relation.related, all_resources);
        if related.is_none() {
            diagnostics.warn(
                Warning::new(
                    WarningCode::UnresolvedRelation,
                    format!(
                        "no resource serves schema '{}'; relation '{}' is left unlinked",
                        relation.related, relation.field
                    ),
                )
                .with_path(format!("{}.fields.{}", resource.name, relation.field)),
            );
        }
        synthesized.push(relation_field(&resource.name, relation, related));
    }
    for embed in &schema.embeds {
        if already_linked(&existing, &embed.field) {
            continue;
        }
        let nested = nested_resource_name(&resource.name, &embed.field);
        let linked = all_resources
            .iter()
            .find(|r| r.name == nested)
            .map(|r| r.name.as_str());
        synthesized.push(embed_field(&resource.name, &schema.name, embed, linked));
    }

    for field in synthesized {
        match existing.get_mut(&field.key) {
            Some(current) => enrich(current, field),
            None => {
                prepended.insert(field.key.clone(), field);
            }
        }
    }

    tracing::debug!(
        resource = %resource.name,
        added = prepended.len(),
        "Expanded associations"
    );

    prepended.extend(existing);
    resource.set_fields(prepended);
    resource
}

/// Attach relation details to a field that an override created first
fn enrich(current: &mut Field, synthesized: Field) {
    current.field_type = synthesized.field_type;
    if matches!(current.html_type, HtmlType::Text | HtmlType::Unimplemented) {
        current.html_type = synthesized.html_type;
    }
    if current.label.is_empty() {
        current.label = synthesized.label;
    }
    if current.resource.is_none() {
        current.resource = synthesized.resource;
    }
    current.relation = synthesized.relation;
}

// ============================================================================
// Tests
// ============================================================================
