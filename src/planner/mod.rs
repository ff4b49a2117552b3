//! Planning module for keyed list attributes.
//!
//! This module turns a desired list and a prior list into the planned list:
//! - Key extraction and indexing by identity field
//! - Essential-field comparison and reorder classification
//! - Canonical ordering and plan synthesis
//! - Key-level diff reporting and the host plan modifier seam

mod classify;
mod compare;
mod diagnostics;
mod diff;
mod fingerprint;
mod key;
mod modifier;
mod sort;
mod synth;

pub use classify::{Classification, classify, same_key_set};
pub use compare::{differing_fields, essentially_equal, field_matches};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use diff::{DiffDetail, DiffEngine, DiffResult, DiffType, RecordDiff, UNRESOLVED_KEY};
pub use fingerprint::RecordHasher;
pub use key::{KeyExtractor, KeyIndex};
pub use modifier::{KeyedListSortModifier, ListPlanModifier, ListRequest, ListResponse};
pub use sort::canonical_order;
pub use synth::{GuardReason, PlanDecision, PlanSynthesizer, Reconciled};
