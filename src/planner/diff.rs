//! Key-level diff between a prior list and a planned list.
//!
//! This is the view a by-key downstream diff reports once position has been
//! removed as a source of difference: which records are created, deleted,
//! updated or left alone.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::config::AttributeProfile;
use crate::value::{ListValue, Record};

use super::compare::differing_fields;
use super::fingerprint::RecordHasher;
use super::key::{KeyExtractor, KeyIndex};

/// Label used for records that have no resolvable key.
pub const UNRESOLVED_KEY: &str = "<unresolved>";

/// Engine for computing key-level diffs.
#[derive(Debug)]
pub struct DiffEngine<'a> {
    /// Identity and essential fields of the attribute.
    profile: &'a AttributeProfile,
    /// Fingerprint hasher.
    hasher: RecordHasher,
}

/// Difference for a single record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordDiff {
    /// Record key.
    pub key: String,
    /// Type of difference.
    pub diff_type: DiffType,
    /// Essential fields that changed.
    pub details: Vec<DiffDetail>,
    /// Prior fingerprint (if applicable).
    pub old_hash: Option<String>,
    /// Planned fingerprint (if applicable).
    pub new_hash: Option<String>,
}

/// Type of difference detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffType {
    /// Record will be created.
    Create,
    /// Record will be updated in place or replaced.
    Update,
    /// Record will be deleted.
    Delete,
    /// Record is unchanged.
    NoChange,
}

/// Detail about a specific field difference.
#[derive(Debug, Clone, Serialize)]
pub struct DiffDetail {
    /// Field that differs.
    pub field: String,
    /// Old value.
    pub old_value: Option<String>,
    /// New value.
    pub new_value: Option<String>,
}

/// Complete diff result.
#[derive(Debug, Serialize)]
pub struct DiffResult {
    /// All record diffs: planned order first, then deletions in prior order.
    pub diffs: Vec<RecordDiff>,
    /// Number of records to create.
    pub creates: usize,
    /// Number of records to update.
    pub updates: usize,
    /// Number of records to delete.
    pub deletes: usize,
    /// Number of unchanged records.
    pub unchanged: usize,
}

impl<'a> DiffEngine<'a> {
    /// Creates a diff engine for one attribute profile.
    #[must_use]
    pub const fn new(profile: &'a AttributeProfile) -> Self {
        Self {
            profile,
            hasher: RecordHasher::new(),
        }
    }

    /// Computes the key-level diff from `prior` to `planned`.
    ///
    /// Null or unknown lists are treated as empty.
    #[must_use]
    pub fn compute_diff(&self, prior: &ListValue, planned: &ListValue) -> DiffResult {
        let extractor = KeyExtractor::new(&self.profile.identity_field);
        let prior_records = prior.as_known().map_or(&[][..], |c| c.records());
        let planned_records = planned.as_known().map_or(&[][..], |c| c.records());
        let prior_index = KeyIndex::build(&extractor, prior_records);

        let mut diffs = Vec::new();
        let mut seen = BTreeSet::new();

        for record in planned_records {
            let Some(key) = extractor.extract(record) else {
                diffs.push(self.create(UNRESOLVED_KEY, record));
                continue;
            };
            if !seen.insert(key) {
                continue;
            }

            let diff = match prior_index.get(key) {
                None => self.create(key, record),
                Some(old) => self.compare(key, old, record),
            };
            diffs.push(diff);
        }

        for record in prior_records {
            match extractor.extract(record) {
                Some(key) if seen.contains(key) => {}
                Some(key) => {
                    debug!("Record {key} removed from planned list");
                    seen.insert(key);
                    diffs.push(self.delete(key, record));
                }
                None => diffs.push(self.delete(UNRESOLVED_KEY, record)),
            }
        }

        let creates = diffs.iter().filter(|d| d.diff_type == DiffType::Create).count();
        let updates = diffs.iter().filter(|d| d.diff_type == DiffType::Update).count();
        let deletes = diffs.iter().filter(|d| d.diff_type == DiffType::Delete).count();
        let unchanged = diffs.iter().filter(|d| d.diff_type == DiffType::NoChange).count();

        DiffResult {
            diffs,
            creates,
            updates,
            deletes,
            unchanged,
        }
    }

    fn fingerprint(&self, record: &Record) -> String {
        self.hasher
            .hash_record(record, self.profile.essential_fields.as_slice())
    }

    fn create(&self, key: &str, record: &Record) -> RecordDiff {
        RecordDiff {
            key: key.to_string(),
            diff_type: DiffType::Create,
            details: vec![],
            old_hash: None,
            new_hash: Some(self.fingerprint(record)),
        }
    }

    fn delete(&self, key: &str, record: &Record) -> RecordDiff {
        RecordDiff {
            key: key.to_string(),
            diff_type: DiffType::Delete,
            details: vec![],
            old_hash: Some(self.fingerprint(record)),
            new_hash: None,
        }
    }

    fn compare(&self, key: &str, old: &Record, new: &Record) -> RecordDiff {
        let details: Vec<DiffDetail> =
            differing_fields(new, old, self.profile.essential_fields.as_slice())
                .into_iter()
                .map(|field| DiffDetail {
                    field: field.to_string(),
                    old_value: old.get(field).map(crate::value::Value::render),
                    new_value: new.get(field).map(crate::value::Value::render),
                })
                .collect();

        let diff_type = if details.is_empty() {
            DiffType::NoChange
        } else {
            DiffType::Update
        };

        RecordDiff {
            key: key.to_string(),
            diff_type,
            details,
            old_hash: Some(self.fingerprint(old)),
            new_hash: Some(self.fingerprint(new)),
        }
    }
}

impl DiffResult {
    /// Returns true if there are any changes.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.creates > 0 || self.updates > 0 || self.deletes > 0
    }

    /// Returns the total number of changes.
    #[must_use]
    pub const fn total_changes(&self) -> usize {
        self.creates + self.updates + self.deletes
    }

    /// Filters to only diffs that require action.
    #[must_use]
    pub fn actionable_diffs(&self) -> Vec<&RecordDiff> {
        self.diffs
            .iter()
            .filter(|d| d.diff_type != DiffType::NoChange)
            .collect()
    }

    /// Keys with the given diff type, in report order.
    #[must_use]
    pub fn keys_of(&self, diff_type: DiffType) -> Vec<&str> {
        self.diffs
            .iter()
            .filter(|d| d.diff_type == diff_type)
            .map(|d| d.key.as_str())
            .collect()
    }
}

impl std::fmt::Display for DiffType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::NoChange => "no change",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for RecordDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.key, self.diff_type)?;
        if !self.details.is_empty() {
            write!(f, " (")?;
            for (i, detail) in self.details.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", detail.field)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
