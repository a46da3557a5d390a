//! Log-safe rendering of JSON values.
//!
//! A [`Redaction`] decides which object members are masked; [`Redacted`]
//! renders a value through it. Only the rendered text is affected, never
//! the value itself.

use std::collections::HashSet;
use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Token substituted for masked member values.
pub const MASK: &str = "****";

/// Member names to mask when rendering values for the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    exclude: Option<HashSet<String>>,
    include: Option<HashSet<String>>,
    substitute: String,
}

impl Default for Redaction {
    fn default() -> Self {
        Self::none()
    }
}

impl Redaction {
    /// Render everything verbatim.
    pub fn none() -> Self {
        Self {
            exclude: None,
            include: None,
            substitute: MASK.to_string(),
        }
    }

    /// Mask the members with these names, at any depth.
    pub fn exclude<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::none().with_exclude(names)
    }

    /// Mask every member whose name is *not* in this set, at any depth.
    pub fn include<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::none().with_include(names)
    }

    pub fn with_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_substitute(mut self, substitute: impl Into<String>) -> Self {
        self.substitute = substitute.into();
        self
    }

    pub fn is_none(&self) -> bool {
        self.exclude.is_none() && self.include.is_none()
    }

    pub fn is_masked(&self, name: &str) -> bool {
        let excluded = self.exclude.as_ref().is_some_and(|set| set.contains(name));
        let not_included = self.include.as_ref().is_some_and(|set| !set.contains(name));
        excluded || not_included
    }

    pub fn display<'a>(&'a self, value: &'a Value) -> Redacted<'a> {
        Redacted {
            redaction: self,
            value,
        }
    }

    pub fn render(&self, value: &Value) -> String {
        self.display(value).to_string()
    }
}

/// A value viewed through a [`Redaction`].
///
/// Serializes (and displays) as compact JSON with masked members replaced
/// by the substitute string.
#[derive(Clone, Copy)]
pub struct Redacted<'a> {
    redaction: &'a Redaction,
    value: &'a Value,
}

impl<'a> Redacted<'a> {
    fn child(&self, value: &'a Value) -> Redacted<'a> {
        Redacted {
            redaction: self.redaction,
            value,
        }
    }
}

impl Serialize for Redacted<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Value::Object(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (name, member) in members {
                    if self.redaction.is_masked(name) {
                        map.serialize_entry(name, &self.redaction.substitute)?;
                    } else {
                        map.serialize_entry(name, &self.child(member))?;
                    }
                }
                map.end()
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item))?;
                }
                seq.end()
            }
            scalar => scalar.serialize(serializer),
        }
    }
}

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.redaction.is_none() {
            return write!(f, "{}", self.value);
        }
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
