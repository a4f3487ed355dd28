//! Ordered field maps and their XML serialization.
//!
//! Request bodies are built from a [`FieldMap`]: an insertion-ordered list
//! of wire field names mapped to scalar values or nested maps. The order
//! matters because the web service validates bodies against a sequenced
//! schema.

use xmltree::{Element, XMLNode};

/// A value in a [`FieldMap`]: a scalar or a nested map.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Map(FieldMap),
}

impl FieldValue {
    /// The wire text for a scalar value. `None` for nested maps.
    ///
    /// Booleans serialize as `"1"`/`"0"`, the form the service accepts for
    /// its flag fields.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Bool(true) => Some("1".to_string()),
            Self::Bool(false) => Some("0".to_string()),
            Self::Map(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<FieldMap> for FieldValue {
    fn from(value: FieldMap) -> Self {
        Self::Map(value)
    }
}

/// An ordered mapping from wire field name to [`FieldValue`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldMap {
    entries: Vec<(String, FieldValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Duplicate names are kept as-is; the schema never
    /// repeats a field, so deduplication is the caller's concern.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Append a field only when the value is present. Absent optional
    /// fields must not appear in the serialized body.
    pub fn insert_opt(&mut self, name: impl Into<String>, value: Option<impl Into<FieldValue>>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    /// Append all entries of another map, preserving their order.
    pub fn extend(&mut self, other: FieldMap) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serialize a [`FieldMap`] into child elements of `parent`.
///
/// Each entry becomes a child element named `prefix + name`, in insertion
/// order. Nested maps recurse with the same prefix; scalars become text
/// content. An empty map leaves `parent` without children.
pub fn write_fields(parent: &mut Element, fields: &FieldMap, prefix: &str) {
    for (name, value) in fields.iter() {
        let mut child = Element::new(&format!("{}{}", prefix, name));

        match value {
            FieldValue::Map(nested) => write_fields(&mut child, nested, prefix),
            scalar => {
                if let Some(text) = scalar.as_text() {
                    child.children.push(XMLNode::Text(text));
                }
            }
        }

        parent.children.push(XMLNode::Element(child));
    }
}
