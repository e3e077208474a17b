//! Schema descriptors
//!
//! A schema is the read-only input the engine introspects: ordered typed
//! attributes plus relation and embed descriptors. Nothing here assumes a
//! storage format.

use crate::naming::schema_basename;
use formwright_core::{Cardinality, SemanticType};
use serde::{Deserialize, Serialize};

// ============================================================================
// SchemaDescriptor
// ============================================================================

/// Describes one data-schema entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Schema identity (e.g. "Shop.Order")
    pub name: String,

    /// Attributes in declaration order
    #[serde(default)]
    pub attributes: Vec<Attribute>,

    /// Relations in declaration order
    #[serde(default)]
    pub relations: Vec<RelationDescriptor>,

    /// Embedded structures in declaration order
    #[serde(default)]
    pub embeds: Vec<EmbedDescriptor>,
}

impl SchemaDescriptor {
    /// Create an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            relations: Vec::new(),
            embeds: Vec::new(),
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Add an attribute
    pub fn attribute(mut self, name: impl Into<String>, ty: impl Into<SemanticType>) -> Self {
        self.attributes.push(Attribute::new(name, ty));
        self
    }

    /// Add a has-many relation; the related key defaults to `<owner>_id`
    pub fn has_many(self, field: impl Into<String>, related: impl Into<String>) -> Self {
        self.relation(field, RelationKind::HasMany, related)
    }

    /// Add a has-one relation; the related key defaults to `<owner>_id`
    pub fn has_one(self, field: impl Into<String>, related: impl Into<String>) -> Self {
        self.relation(field, RelationKind::HasOne, related)
    }

    /// Add a belongs-to relation; the owner key defaults to `<field>_id`
    pub fn belongs_to(self, field: impl Into<String>, related: impl Into<String>) -> Self {
        self.relation(field, RelationKind::BelongsTo, related)
    }

    fn relation(mut self, field: impl Into<String>, kind: RelationKind, related: impl Into<String>) -> Self {
        let mut relation = RelationDescriptor {
            field: field.into(),
            kind,
            related: related.into(),
            owner_key: String::new(),
            related_key: String::new(),
        };
        relation.fill_default_keys(&self.name);
        self.relations.push(relation);
        self
    }

    /// Fill relation keys left empty in a declaration file
    pub fn fill_default_keys(&mut self) {
        for relation in &mut self.relations {
            relation.fill_default_keys(&self.name);
        }
    }

    /// Embed a single structure
    pub fn embeds_one(mut self, field: impl Into<String>, related: impl Into<String>) -> Self {
        self.embeds.push(EmbedDescriptor {
            field: field.into(),
            cardinality: Cardinality::One,
            related: related.into(),
        });
        self
    }

    /// Embed a collection of structures
    pub fn embeds_many(mut self, field: impl Into<String>, related: impl Into<String>) -> Self {
        self.embeds.push(EmbedDescriptor {
            field: field.into(),
            cardinality: Cardinality::Many,
            related: related.into(),
        });
        self
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Get an attribute by name
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check if a key names one of the schema's relations or embeds
    pub fn is_association_key(&self, key: &str) -> bool {
        self.relations.iter().any(|r| r.field == key) || self.embeds.iter().any(|e| e.field == key)
    }

    /// Check if the schema declares any relation or embed
    pub fn has_associations(&self) -> bool {
        !self.relations.is_empty() || !self.embeds.is_empty()
    }
}

// ============================================================================
// Attribute
// ============================================================================

/// A named, typed schema attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name (snake_case)
    pub name: String,

    /// Semantic type
    #[serde(rename = "type")]
    pub ty: SemanticType,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(name: impl Into<String>, ty: impl Into<SemanticType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

// ============================================================================
// Relations
// ============================================================================

/// The kind of a relation between two schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    HasMany,
    HasOne,
    BelongsTo,
}

impl RelationKind {
    /// How many related records the owner sees
    pub fn cardinality(&self) -> Cardinality {
        match self {
            RelationKind::HasMany => Cardinality::Many,
            RelationKind::HasOne | RelationKind::BelongsTo => Cardinality::One,
        }
    }

    /// Semantic type of the synthesized field
    pub fn field_type(&self) -> SemanticType {
        match self {
            RelationKind::HasMany => SemanticType::OneToManyAssociation,
            RelationKind::HasOne | RelationKind::BelongsTo => SemanticType::ManyToOneAssociation,
        }
    }
}

/// A relation to another schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    /// Field name on the owner (e.g. "line_items")
    pub field: String,

    /// Relation kind
    pub kind: RelationKind,

    /// Related schema identity
    pub related: String,

    /// Key on the owner side
    #[serde(default)]
    pub owner_key: String,

    /// Key on the related side
    #[serde(default)]
    pub related_key: String,
}

impl RelationDescriptor {
    /// Derive conventional keys for any that are empty
    ///
    /// Has-many/has-one point at `<owner>_id` on the related side;
    /// belongs-to reads `<field>_id` on the owner.
    pub fn fill_default_keys(&mut self, owner_schema: &str) {
        let (owner_key, related_key) = match self.kind {
            RelationKind::HasMany | RelationKind::HasOne => {
                ("id".to_string(), format!("{}_id", schema_basename(owner_schema)))
            }
            RelationKind::BelongsTo => (format!("{}_id", self.field), "id".to_string()),
        };
        if self.owner_key.is_empty() {
            self.owner_key = owner_key;
        }
        if self.related_key.is_empty() {
            self.related_key = related_key;
        }
    }
}

// ============================================================================
// Embeds
// ============================================================================

/// An embedded structure stored inside the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedDescriptor {
    /// Field name on the owner (e.g. "address")
    pub field: String,

    /// One structure or a collection
    pub cardinality: Cardinality,

    /// Schema identity of the embedded shape
    pub related: String,
}

impl EmbedDescriptor {
    /// Semantic type of the synthesized field
    pub fn field_type(&self) -> SemanticType {
        match self.cardinality {
            Cardinality::One => SemanticType::EmbedsOne,
            Cardinality::Many => SemanticType::EmbedsMany,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
