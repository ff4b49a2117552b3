//! Record fingerprints for change display.
//!
//! A fingerprint is a SHA-256 digest over a record's essential fields. Two
//! records with equal fingerprints are indistinguishable to the comparator
//! unless one of them carries an unknown value.

use sha2::{Digest, Sha256};

use crate::value::Record;

/// Hasher for computing record fingerprints.
#[derive(Debug, Default)]
pub struct RecordHasher;

impl RecordHasher {
    /// Creates a new record hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the fingerprint of a record over the given fields.
    ///
    /// Fields are hashed in the order given; absent fields are skipped.
    #[must_use]
    pub fn hash_record<S: AsRef<str>>(&self, record: &Record, fields: &[S]) -> String {
        let mut hasher = Sha256::new();

        for field in fields {
            let field = field.as_ref();
            if let Some(value) = record.get(field) {
                hasher.update(field.as_bytes());
                hasher.update([0u8]);
                hasher.update(value.render().as_bytes());
                hasher.update([0u8]);
            }
        }

        hex::encode(hasher.finalize())
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(8).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[&str] = &["name", "instance_type"];

    #[test]
    fn test_hash_deterministic() {
        let hasher = RecordHasher::new();
        let record = Record::new().with("name", "ng-1").with("instance_type", "t3.large");

        assert_eq!(
            hasher.hash_record(&record, FIELDS),
            hasher.hash_record(&record, FIELDS)
        );
        assert_eq!(hasher.hash_record(&record, FIELDS).len(), 64);
    }

    #[test]
    fn test_non_essential_fields_do_not_change_hash() {
        let hasher = RecordHasher::new();
        let a = Record::new().with("name", "ng-1").with("version", "1.31");
        let b = Record::new().with("name", "ng-1").with("version", "1.32");

        assert_eq!(hasher.hash_record(&a, FIELDS), hasher.hash_record(&b, FIELDS));
    }

    #[test]
    fn test_essential_change_changes_hash() {
        let hasher = RecordHasher::new();
        let a = Record::new().with("name", "ng-1").with("instance_type", "t3.large");
        let b = Record::new().with("name", "ng-1").with("instance_type", "t3.xlarge");

        assert_ne!(hasher.hash_record(&a, FIELDS), hasher.hash_record(&b, FIELDS));
    }

    #[test]
    fn test_short_hash() {
        let hasher = RecordHasher::new();
        let short = hasher.short_hash("abcdef1234567890abcdef1234567890");

        assert_eq!(short, "abcdef12");
    }
}
