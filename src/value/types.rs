//! Value, record and collection types.
//!
//! Every attribute value is either resolved (a concrete kind), `Null`
//! (confirmed empty) or `Unknown` (not yet computed by the host). The
//! distinction between the last two drives both the safety gate and the
//! essential-field comparator.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use crate::error::ValueError;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Confirmed absent value.
    Null,
    /// Value not yet known at plan time.
    Unknown,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer value.
    Int(i64),
    /// String value.
    String(String),
    /// Nested record.
    Object(Record),
    /// List of values.
    List(Vec<Value>),
}

/// An attribute-keyed structure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    attributes: BTreeMap<String, Value>,
}

/// The attribute set every element of a collection carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectType {
    attributes: BTreeSet<String>,
}

/// An ordered sequence of records sharing one element type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Collection {
    element_type: ObjectType,
    records: Vec<Record>,
}

/// A list attribute as seen by the host framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListValue {
    /// The list is null (unset, or no prior state).
    Null,
    /// The list itself is not yet known.
    Unknown,
    /// A concrete list of records.
    Known(Collection),
}

impl Value {
    /// Creates a string value.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Returns true if the value is `Unknown`.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns true if the value carries no resolved content.
    #[must_use]
    pub const fn is_null_or_unknown(&self) -> bool {
        matches!(self, Self::Null | Self::Unknown)
    }

    /// Returns the string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a short name for the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Unknown => "unknown",
            Self::Bool(_) => "bool",
            Self::Int(_) => "number",
            Self::String(_) => "string",
            Self::Object(_) => "object",
            Self::List(_) => "list",
        }
    }

    /// Structural comparison where an unknown value on either side is
    /// compatible with anything.
    ///
    /// Null is only compatible with null or unknown.
    #[must_use]
    pub fn compatible_with(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unknown, _) | (_, Self::Unknown) => true,
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.compatible_with(y))
            }
            (Self::Object(a), Self::Object(b)) => a.compatible_with(b),
            _ => self == other,
        }
    }

    /// Renders the value the way a plan display would show it.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::from("null"),
            Self::Unknown => String::from("(known after apply)"),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::String(s) => format!("{s:?}"),
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(Self::render).collect();
                format!("[{}]", rendered.join(", "))
            }
            Self::Object(record) => {
                let mut out = String::from("{");
                for (i, (name, value)) in record.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{name} = {}", value.render());
                }
                out.push('}');
                out
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Object(value)
    }
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Looks up an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns true if the attribute is present (even if null).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if the record has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterates attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates attribute names in order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    fn compatible_with(&self, other: &Self) -> bool {
        self.attributes.len() == other.attributes.len()
            && self.attributes.iter().all(|(name, value)| {
                other
                    .attributes
                    .get(name)
                    .is_some_and(|theirs| value.compatible_with(theirs))
            })
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

impl ObjectType {
    /// Creates an element type from attribute names.
    #[must_use]
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// Infers the element type as the union of all record attributes.
    #[must_use]
    pub fn infer(records: &[Record]) -> Self {
        Self {
            attributes: records
                .iter()
                .flat_map(|r| r.attribute_names().map(String::from))
                .collect(),
        }
    }

    /// Iterates attribute names in order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    /// Checks that a record only carries attributes of this type.
    fn check(&self, index: usize, record: &Record) -> Result<(), ValueError> {
        let unexpected: Vec<&str> = record
            .attribute_names()
            .filter(|name| !self.attributes.contains(*name))
            .collect();

        if unexpected.is_empty() {
            Ok(())
        } else {
            Err(ValueError::ShapeMismatch {
                index,
                detail: format!("unexpected attributes: {}", unexpected.join(", ")),
            })
        }
    }
}

impl Collection {
    /// Builds a collection, checking every record against the element type.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::ShapeMismatch`] for the first record carrying an
    /// attribute the element type does not declare.
    pub fn new(element_type: ObjectType, records: Vec<Record>) -> Result<Self, ValueError> {
        for (i, record) in records.iter().enumerate() {
            element_type.check(i, record)?;
        }
        Ok(Self {
            element_type,
            records,
        })
    }

    /// Builds a collection whose element type is inferred from its records.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            element_type: ObjectType::infer(&records),
            records,
        }
    }

    /// The element type.
    #[must_use]
    pub const fn element_type(&self) -> &ObjectType {
        &self.element_type
    }

    /// The records in order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the collection has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ListValue {
    /// Returns true if the list is unknown.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns the collection if the list is known.
    #[must_use]
    pub const fn as_known(&self) -> Option<&Collection> {
        match self {
            Self::Known(c) => Some(c),
            _ => None,
        }
    }

    /// Number of elements; zero unless known.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_known().map_or(0, Collection::len)
    }

    /// Returns true if the list has no known elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Collection> for ListValue {
    fn from(value: Collection) -> Self {
        Self::Known(value)
    }
}
