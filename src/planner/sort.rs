//! Canonical key ordering of a collection.

use std::cmp::Ordering;

use crate::value::Record;

use super::key::KeyExtractor;

/// Returns the records stably sorted by key.
///
/// Keyed records come first in ascending byte order of their key. Records
/// without a key follow, in their original relative order. Duplicate keys
/// keep their original relative order.
#[must_use]
pub fn canonical_order(extractor: &KeyExtractor<'_>, records: &[Record]) -> Vec<Record> {
    let mut keyed: Vec<(Option<&str>, &Record)> = records
        .iter()
        .map(|record| (extractor.extract(record), record))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, record)| record.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use proptest::prelude::*;

    fn ng(name: &str) -> Record {
        Record::new().with("name", name)
    }

    fn names(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.get("name").map_or_else(|| String::from("-"), Value::render))
            .collect()
    }

    #[test]
    fn test_sorts_by_key() {
        let extractor = KeyExtractor::new("name");
        let records = vec![ng("ng-3"), ng("ng-1"), ng("ng-2")];

        let sorted = canonical_order(&extractor, &records);
        assert_eq!(names(&sorted), vec!["\"ng-1\"", "\"ng-2\"", "\"ng-3\""]);
    }

    #[test]
    fn test_keyless_records_sort_last_in_original_order() {
        let extractor = KeyExtractor::new("name");
        let records = vec![
            Record::new().with("name", Value::Unknown).with("id", "first"),
            ng("ng-2"),
            Record::new().with("id", "second"),
            ng("ng-1"),
        ];

        let sorted = canonical_order(&extractor, &records);
        assert_eq!(sorted[0], ng("ng-1"));
        assert_eq!(sorted[1], ng("ng-2"));
        assert_eq!(sorted[2].get("id"), Some(&Value::string("first")));
        assert_eq!(sorted[3].get("id"), Some(&Value::string("second")));
    }

    #[test]
    fn test_duplicates_keep_relative_order() {
        let extractor = KeyExtractor::new("name");
        let records = vec![
            ng("ng-2").with("id", "a"),
            ng("ng-1"),
            ng("ng-2").with("id", "b"),
        ];

        let sorted = canonical_order(&extractor, &records);
        assert_eq!(sorted[1].get("id"), Some(&Value::string("a")));
        assert_eq!(sorted[2].get("id"), Some(&Value::string("b")));
    }

    #[test]
    fn test_empty() {
        let extractor = KeyExtractor::new("name");
        assert!(canonical_order(&extractor, &[]).is_empty());
    }

    proptest! {
        #[test]
        fn canonical_order_is_idempotent(
            keys in prop::collection::vec(prop::option::of("[a-z]{1,4}"), 0..12)
        ) {
            let extractor = KeyExtractor::new("name");
            let records: Vec<Record> = keys
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let name = key.clone().map_or(Value::Unknown, Value::String);
                    Record::new().with("name", name).with("position", i64::try_from(i).unwrap_or(0))
                })
                .collect();

            let once = canonical_order(&extractor, &records);
            let twice = canonical_order(&extractor, &once);
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once.len(), records.len());
        }
    }
}
