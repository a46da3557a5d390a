use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// How object member names are spelled on the wire.
///
/// Applies to struct field names only: snake_case field names are written in
/// the strategy's form and matched in that form on input. Map keys, enum
/// variants and explicitly renamed fields keep their spelling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    #[default]
    Identity,
    CamelCase,
    PascalCase,
    KebabCase,
    ScreamingSnakeCase,
}

impl NamingStrategy {
    pub fn is_identity(self) -> bool {
        self == NamingStrategy::Identity
    }

    /// Convert a snake_case name to its wire form.
    pub fn to_wire(self, name: &str) -> String {
        match self {
            NamingStrategy::Identity => name.to_string(),
            NamingStrategy::CamelCase => capitalize_words(name, false),
            NamingStrategy::PascalCase => capitalize_words(name, true),
            NamingStrategy::KebabCase => name.replace('_', "-"),
            NamingStrategy::ScreamingSnakeCase => name.to_uppercase(),
        }
    }

    /// Convert a wire name back to snake_case.
    pub fn from_wire(self, name: &str) -> String {
        match self {
            NamingStrategy::Identity => name.to_string(),
            NamingStrategy::CamelCase | NamingStrategy::PascalCase => split_humps(name),
            NamingStrategy::KebabCase => name.replace('-', "_"),
            NamingStrategy::ScreamingSnakeCase => name.to_lowercase(),
        }
    }

    /// Wire spelling of a struct field. Names that are not snake_case were
    /// spelled explicitly (`#[serde(rename = "...")]`) and are kept.
    pub fn field_to_wire(self, field: &str) -> Cow<'_, str> {
        if self.is_identity() || !is_snake_case(field) {
            Cow::Borrowed(field)
        } else {
            Cow::Owned(self.to_wire(field))
        }
    }

    /// The field in `fields` whose wire spelling is `key`, if any.
    pub fn field_from_wire(self, key: &str, fields: &'static [&'static str]) -> Option<&'static str> {
        fields
            .iter()
            .copied()
            .find(|field| self.field_to_wire(field) == key)
    }
}

fn is_snake_case(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn capitalize_words(name: &str, upper_first: bool) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = upper_first;
    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty() || upper_first;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn split_humps(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
