//! Naming helpers shared by the catalogue builder, the association expander
//! and the option resolver.

use heck::{ToSnakeCase, ToTitleCase};

/// Separator joining a parent resource and an embed attribute
pub const NESTED_SEPARATOR: &str = "__";

/// Underscores become spaces, the first letter is upper-cased and the rest
/// lower-cased: `"unit_price"` → `"Unit price"`.
pub fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}

/// Every word capitalized: `"line_item"` → `"Line Item"`
pub fn title_case(name: &str) -> String {
    name.to_title_case()
}

/// Last segment of a dotted schema name in snake case:
/// `"Shop.LineItem"` → `"line_item"`
pub fn schema_basename(schema: &str) -> String {
    schema
        .rsplit('.')
        .next()
        .unwrap_or(schema)
        .to_snake_case()
}

/// Name of the resource generated for an embed: `"order__address"`
pub fn nested_resource_name(parent: &str, embed: &str) -> String {
    format!("{}{}{}", parent, NESTED_SEPARATOR, embed)
}

/// Simple pluralization (English)
pub fn pluralize(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    // Only the last word is pluralized
    if let Some(idx) = s.rfind(' ') {
        let (head, last) = s.split_at(idx + 1);
        return format!("{}{}", head, pluralize(last));
    }

    let lower = s.to_lowercase();
    let irregular = match lower.as_str() {
        "person" => Some("people"),
        "child" => Some("children"),
        "man" => Some("men"),
        "woman" => Some("women"),
        "mouse" => Some("mice"),
        _ => None,
    };
    if let Some(plural) = irregular {
        return match_case(s, plural);
    }

    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{}es", s);
    }

    if lower.ends_with('y')
        && !lower.ends_with("ey")
        && !lower.ends_with("ay")
        && !lower.ends_with("oy")
        && !lower.ends_with("uy")
    {
        return format!("{}ies", &s[..s.len() - 1]);
    }

    format!("{}s", s)
}

fn match_case(original: &str, replacement: &str) -> String {
    let capitalized = original.chars().next().is_some_and(char::is_uppercase);
    if !capitalized {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}
