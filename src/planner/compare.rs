//! Essential-field equality between a desired and a prior record.
//!
//! Only the attributes listed in the profile's essential field set are
//! compared. Computed or default-populated attributes are ignored.

use crate::value::Record;

/// Compares a single essential field.
///
/// A field the desired record does not carry is unspecified and never
/// differs. A desired field missing from the prior record differs unless
/// the desired value is null or unknown.
#[must_use]
pub fn field_matches(desired: &Record, prior: &Record, field: &str) -> bool {
    let Some(wanted) = desired.get(field) else {
        return true;
    };

    prior
        .get(field)
        .map_or_else(|| wanted.is_null_or_unknown(), |had| wanted.compatible_with(had))
}

/// Returns true if the records agree on every essential field.
#[must_use]
pub fn essentially_equal<S: AsRef<str>>(desired: &Record, prior: &Record, fields: &[S]) -> bool {
    fields
        .iter()
        .all(|field| field_matches(desired, prior, field.as_ref()))
}

/// Lists the essential fields on which the records disagree.
#[must_use]
pub fn differing_fields<'f, S: AsRef<str>>(
    desired: &Record,
    prior: &Record,
    fields: &'f [S],
) -> Vec<&'f str> {
    fields
        .iter()
        .map(|field| field.as_ref())
        .filter(|field| !field_matches(desired, prior, field))
        .collect()
}
