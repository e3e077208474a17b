//! Core types used throughout Formwright
//!
//! This module contains the semantic attribute types read from schemas and
//! the UI input kinds derived from them.

use serde::{Deserialize, Serialize};

// ============================================================================
// Semantic Types
// ============================================================================

/// Semantic type of a schema attribute or synthesized field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SemanticType {
    /// Integer primary key
    Id,
    /// Binary (UUID-shaped) primary or foreign key
    BinaryId,
    /// Variable-length string
    String,
    /// Raw bytes
    Binary,
    /// Integer number
    Integer,
    /// Floating point number
    Float,
    /// Arbitrary precision decimal
    Decimal,
    /// Boolean flag
    Boolean,
    /// Date without time
    Date,
    /// Time without date
    Time,
    /// Date and time without zone
    NaiveDateTime,
    /// Date and time in UTC
    UtcDateTime,
    /// UUID value
    Uuid,
    /// Free-form map
    Map,
    /// Synthesized has-many association
    OneToManyAssociation,
    /// Synthesized belongs-to / has-one association
    ManyToOneAssociation,
    /// Synthesized single embedded structure
    EmbedsOne,
    /// Synthesized embedded collection
    EmbedsMany,
    /// Any type the engine has no rules for; carried verbatim
    Custom(String),
}

impl SemanticType {
    /// Canonical lowercase name, as written in schema declarations
    pub fn as_str(&self) -> &str {
        match self {
            SemanticType::Id => "id",
            SemanticType::BinaryId => "binary_id",
            SemanticType::String => "string",
            SemanticType::Binary => "binary",
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
            SemanticType::Decimal => "decimal",
            SemanticType::Boolean => "boolean",
            SemanticType::Date => "date",
            SemanticType::Time => "time",
            SemanticType::NaiveDateTime => "naive_datetime",
            SemanticType::UtcDateTime => "utc_datetime",
            SemanticType::Uuid => "uuid",
            SemanticType::Map => "map",
            SemanticType::OneToManyAssociation => "one_to_many_association",
            SemanticType::ManyToOneAssociation => "many_to_one_association",
            SemanticType::EmbedsOne => "embeds_one",
            SemanticType::EmbedsMany => "embeds_many",
            SemanticType::Custom(name) => name,
        }
    }

    /// Parse a type name; unknown names become [`SemanticType::Custom`]
    pub fn parse(name: &str) -> Self {
        match name {
            "id" => SemanticType::Id,
            "binary_id" => SemanticType::BinaryId,
            "string" => SemanticType::String,
            "binary" => SemanticType::Binary,
            "integer" => SemanticType::Integer,
            "float" => SemanticType::Float,
            "decimal" => SemanticType::Decimal,
            "boolean" => SemanticType::Boolean,
            "date" => SemanticType::Date,
            "time" => SemanticType::Time,
            "naive_datetime" => SemanticType::NaiveDateTime,
            "utc_datetime" => SemanticType::UtcDateTime,
            "uuid" => SemanticType::Uuid,
            "map" => SemanticType::Map,
            "one_to_many_association" => SemanticType::OneToManyAssociation,
            "many_to_one_association" => SemanticType::ManyToOneAssociation,
            "embeds_one" => SemanticType::EmbedsOne,
            "embeds_many" => SemanticType::EmbedsMany,
            other => SemanticType::Custom(other.to_string()),
        }
    }

    /// String, binary and identifier-string values render as text inputs
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            SemanticType::String | SemanticType::Binary | SemanticType::BinaryId | SemanticType::Uuid
        )
    }

    /// Integer, float, decimal and integer ids
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SemanticType::Id | SemanticType::Integer | SemanticType::Float | SemanticType::Decimal
        )
    }

    /// Numbers with a fractional part
    pub fn is_fractional(&self) -> bool {
        matches!(self, SemanticType::Float | SemanticType::Decimal)
    }

    /// Types carrying a date component
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            SemanticType::Date | SemanticType::NaiveDateTime | SemanticType::UtcDateTime
        )
    }

    /// Values shaped like a UUID
    pub fn is_uuid_like(&self) -> bool {
        matches!(self, SemanticType::Uuid | SemanticType::BinaryId)
    }

    /// Types only meaningful when synthesized from a relation or embed
    pub fn is_association(&self) -> bool {
        matches!(
            self,
            SemanticType::OneToManyAssociation
                | SemanticType::ManyToOneAssociation
                | SemanticType::EmbedsOne
                | SemanticType::EmbedsMany
        )
    }
}

impl Default for SemanticType {
    fn default() -> Self {
        SemanticType::String
    }
}

impl From<String> for SemanticType {
    fn from(name: String) -> Self {
        SemanticType::parse(&name)
    }
}

impl From<&str> for SemanticType {
    fn from(name: &str) -> Self {
        SemanticType::parse(name)
    }
}

impl From<SemanticType> for String {
    fn from(ty: SemanticType) -> Self {
        ty.as_str().to_string()
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// HtmlType
// ============================================================================

/// The UI input kind a field renders with
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HtmlType {
    Text,
    Number,
    DateTimeLocal,
    Time,
    Checkbox,
    /// No rule applies and no association context exists
    Unimplemented,
    /// Raw type name passed through for the renderer to interpret
    Other(String),
}

impl HtmlType {
    /// Derive the input kind for a semantic type
    pub fn for_semantic_type(ty: &SemanticType) -> Self {
        match ty {
            t if t.is_text_like() => HtmlType::Text,
            t if t.is_numeric() => HtmlType::Number,
            t if t.is_temporal() => HtmlType::DateTimeLocal,
            SemanticType::Time => HtmlType::Time,
            SemanticType::Boolean => HtmlType::Checkbox,
            t if t.is_association() => HtmlType::Unimplemented,
            other => HtmlType::Other(other.as_str().to_string()),
        }
    }

    /// The attribute value as a renderer would emit it
    pub fn as_str(&self) -> &str {
        match self {
            HtmlType::Text => "text",
            HtmlType::Number => "number",
            HtmlType::DateTimeLocal => "datetime-local",
            HtmlType::Time => "time",
            HtmlType::Checkbox => "checkbox",
            HtmlType::Unimplemented => "unimplemented",
            HtmlType::Other(raw) => raw,
        }
    }
}

impl Default for HtmlType {
    fn default() -> Self {
        HtmlType::Text
    }
}

impl From<String> for HtmlType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "text" => HtmlType::Text,
            "number" => HtmlType::Number,
            "datetime-local" => HtmlType::DateTimeLocal,
            "time" => HtmlType::Time,
            "checkbox" => HtmlType::Checkbox,
            "unimplemented" => HtmlType::Unimplemented,
            _ => HtmlType::Other(raw),
        }
    }
}

impl From<HtmlType> for String {
    fn from(ty: HtmlType) -> Self {
        ty.as_str().to_string()
    }
}

impl std::fmt::Display for HtmlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Cardinality
// ============================================================================

/// How many related records a relation or embed holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    One,
    Many,
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::One => write!(f, "one"),
            Cardinality::Many => write!(f, "many"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_semantic_type_parse_known() {
        assert_eq!(SemanticType::parse("decimal"), SemanticType::Decimal);
        assert_eq!(SemanticType::parse("binary_id"), SemanticType::BinaryId);
        assert_eq!(
            SemanticType::parse("utc_datetime"),
            SemanticType::UtcDateTime
        );
    }

    #[test]
    fn test_semantic_type_parse_custom() {
        let ty = SemanticType::parse("money");
        assert_eq!(ty, SemanticType::Custom("money".to_string()));
        assert_eq!(ty.as_str(), "money");
    }

    #[test]
    fn test_semantic_type_serde_as_string() {
        let json = serde_json::to_string(&SemanticType::NaiveDateTime).unwrap();
        assert_eq!(json, "\"naive_datetime\"");

        let ty: SemanticType = serde_json::from_str("\"geo_point\"").unwrap();
        assert_eq!(ty, SemanticType::Custom("geo_point".to_string()));
    }

    #[test]
    fn test_semantic_type_classification() {
        assert!(SemanticType::Id.is_numeric());
        assert!(!SemanticType::Id.is_fractional());
        assert!(SemanticType::Decimal.is_fractional());
        assert!(SemanticType::BinaryId.is_text_like());
        assert!(SemanticType::BinaryId.is_uuid_like());
        assert!(SemanticType::Uuid.is_text_like());
        assert!(SemanticType::Date.is_temporal());
        assert!(!SemanticType::Time.is_temporal());
        assert!(SemanticType::EmbedsMany.is_association());
    }

    #[test]
    fn test_html_type_for_semantic_type() {
        assert_eq!(HtmlType::for_semantic_type(&SemanticType::String), HtmlType::Text);
        assert_eq!(HtmlType::for_semantic_type(&SemanticType::Uuid), HtmlType::Text);
        assert_eq!(HtmlType::for_semantic_type(&SemanticType::BinaryId), HtmlType::Text);
        assert_eq!(HtmlType::for_semantic_type(&SemanticType::Id), HtmlType::Number);
        assert_eq!(
            HtmlType::for_semantic_type(&SemanticType::UtcDateTime),
            HtmlType::DateTimeLocal
        );
        assert_eq!(HtmlType::for_semantic_type(&SemanticType::Time), HtmlType::Time);
        assert_eq!(
            HtmlType::for_semantic_type(&SemanticType::Boolean),
            HtmlType::Checkbox
        );
        assert_eq!(
            HtmlType::for_semantic_type(&SemanticType::EmbedsOne),
            HtmlType::Unimplemented
        );
        assert_eq!(
            HtmlType::for_semantic_type(&SemanticType::Map),
            HtmlType::Other("map".to_string())
        );
    }

    #[test]
    fn test_html_type_round_trips_through_string() {
        let ty: HtmlType = String::from("datetime-local").into();
        assert_eq!(ty, HtmlType::DateTimeLocal);
        let raw: String = HtmlType::Other("color".to_string()).into();
        assert_eq!(raw, "color");
    }
}
