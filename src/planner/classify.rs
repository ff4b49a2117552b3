//! Reorder classification between two key indexes.

use serde::Serialize;

use super::compare::essentially_equal;
use super::key::KeyIndex;

/// Outcome of comparing two fully keyed collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Same keys, essentially equal records; only order differs.
    ReorderOnly,
    /// At least one addition, removal or essential-field change.
    RealChange,
}

/// Returns true if both indexes hold exactly the same key set.
#[must_use]
pub fn same_key_set(desired: &KeyIndex<'_>, prior: &KeyIndex<'_>) -> bool {
    desired.len() == prior.len() && desired.keys().all(|key| prior.contains(key))
}

/// Classifies the change between two indexes.
#[must_use]
pub fn classify<S: AsRef<str>>(
    desired: &KeyIndex<'_>,
    prior: &KeyIndex<'_>,
    essential_fields: &[S],
) -> Classification {
    if !same_key_set(desired, prior) {
        return Classification::RealChange;
    }

    let all_equal = desired.iter().all(|(key, wanted)| {
        prior
            .get(key)
            .is_some_and(|had| essentially_equal(wanted, had, essential_fields))
    });

    if all_equal {
        Classification::ReorderOnly
    } else {
        Classification::RealChange
    }
}
