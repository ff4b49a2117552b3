//! Record identity extraction and key indexing.

use std::collections::BTreeMap;
use tracing::warn;

use crate::value::{Record, Value};

/// Extracts the identity key of a record.
#[derive(Debug, Clone, Copy)]
pub struct KeyExtractor<'a> {
    /// Attribute holding the identity.
    identity_field: &'a str,
}

/// Key-indexed view over an ordered slice of records.
///
/// Built once per invocation and only read afterwards.
#[derive(Debug)]
pub struct KeyIndex<'a> {
    by_key: BTreeMap<&'a str, &'a Record>,
    matched: usize,
    total: usize,
    duplicates: Vec<&'a str>,
}

impl<'a> KeyExtractor<'a> {
    /// Creates an extractor for the given identity attribute.
    #[must_use]
    pub const fn new(identity_field: &'a str) -> Self {
        Self { identity_field }
    }

    /// The identity attribute name.
    #[must_use]
    pub const fn identity_field(&self) -> &'a str {
        self.identity_field
    }

    /// Returns the record's key, or `None` when the identity attribute is
    /// absent, null, unknown or not a string.
    #[must_use]
    pub fn extract<'r>(&self, record: &'r Record) -> Option<&'r str> {
        match record.get(self.identity_field)? {
            Value::String(key) => Some(key.as_str()),
            _ => None,
        }
    }
}

impl<'a> KeyIndex<'a> {
    /// Indexes records by key.
    ///
    /// Records without a key are skipped but still counted in the total.
    /// When a key repeats, the first record keeps the slot and the key is
    /// recorded as a duplicate.
    #[must_use]
    pub fn build(extractor: &KeyExtractor<'_>, records: &'a [Record]) -> Self {
        let mut by_key = BTreeMap::new();
        let mut duplicates = Vec::new();
        let mut matched = 0;

        for record in records {
            let Some(key) = extractor.extract(record) else {
                continue;
            };
            matched += 1;
            if by_key.contains_key(key) {
                warn!(key, field = extractor.identity_field(), "Duplicate key in collection");
                duplicates.push(key);
            } else {
                by_key.insert(key, record);
            }
        }

        Self {
            by_key,
            matched,
            total: records.len(),
            duplicates,
        }
    }

    /// Number of records that produced a key.
    #[must_use]
    pub const fn matched(&self) -> usize {
        self.matched
    }

    /// Number of records in the indexed slice.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Keys that appeared more than once.
    #[must_use]
    pub fn duplicates(&self) -> &[&'a str] {
        &self.duplicates
    }

    /// Returns true if every record produced a distinct key.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.matched == self.total && self.duplicates.is_empty()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns true if no keys were indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Looks up a record by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a Record> {
        self.by_key.get(key).copied()
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Iterates `(key, record)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Record)> + '_ {
        self.by_key.iter().map(|(k, v)| (*k, *v))
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.by_key.keys().copied()
    }
}
