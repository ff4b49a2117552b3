//! Plan synthesis for keyed list attributes.
//!
//! Decides, for one invocation, whether to hand back the prior collection
//! verbatim (suppressing a reorder-only diff) or a key-sorted copy of the
//! desired collection so downstream diffing compares records by key instead
//! of by stale index. Every uncertain branch passes the desired value
//! through untouched.

use serde::Serialize;
use tracing::debug;

use crate::config::AttributeProfile;
use crate::value::{Collection, ListValue, ObjectType};

use super::classify::{Classification, classify};
use super::diagnostics::{Diagnostic, Diagnostics};
use super::key::{KeyExtractor, KeyIndex};
use super::sort::canonical_order;

/// Why the desired value was passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardReason {
    /// The desired list is null or unknown.
    DesiredUnresolved,
    /// There is no prior list to reconcile against.
    NoPrior,
    /// The desired list is empty.
    DesiredEmpty,
    /// Not every record produced a distinct key.
    IncompleteKeys,
    /// The sorted records do not fit the list element type.
    ElementTypeMismatch,
}

/// Terminal state reached by the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "reason")]
pub enum PlanDecision {
    /// Desired value returned unchanged.
    Passthrough(GuardReason),
    /// Prior value returned verbatim; the change was reorder-only.
    Suppressed,
    /// Desired value returned in canonical key order.
    Resorted,
}

/// Output of one synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// The list to plan with.
    pub plan_value: ListValue,
    /// Which branch produced it.
    pub decision: PlanDecision,
    /// Structural construction failures, if any.
    pub diagnostics: Diagnostics,
}

/// Reconciles a desired keyed list against its prior value.
#[derive(Debug, Clone, Copy)]
pub struct PlanSynthesizer<'a> {
    /// Identity and essential fields of the attribute.
    profile: &'a AttributeProfile,
    /// Element type the planned list is rebuilt against, if the host has one.
    element_type: Option<&'a ObjectType>,
}

impl Reconciled {
    fn passthrough(desired: &ListValue, reason: GuardReason) -> Self {
        debug!(?reason, "Keyed list passed through unchanged");
        Self {
            plan_value: desired.clone(),
            decision: PlanDecision::Passthrough(reason),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Returns true if the prior value was kept to suppress a diff.
    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        matches!(self.decision, PlanDecision::Suppressed)
    }
}

impl<'a> PlanSynthesizer<'a> {
    /// Creates a synthesizer for one attribute profile.
    #[must_use]
    pub const fn new(profile: &'a AttributeProfile) -> Self {
        Self {
            profile,
            element_type: None,
        }
    }

    /// Rebuilds sorted lists against the given element type instead of the
    /// desired list's own.
    #[must_use]
    pub const fn with_element_type(self, element_type: &'a ObjectType) -> Self {
        Self {
            element_type: Some(element_type),
            ..self
        }
    }

    /// Reconciles `desired` against `prior`.
    #[must_use]
    pub fn reconcile(&self, desired: &ListValue, prior: &ListValue) -> Reconciled {
        let Some(wanted) = desired.as_known() else {
            return Reconciled::passthrough(desired, GuardReason::DesiredUnresolved);
        };
        let Some(had) = prior.as_known() else {
            return Reconciled::passthrough(desired, GuardReason::NoPrior);
        };
        if wanted.is_empty() {
            return Reconciled::passthrough(desired, GuardReason::DesiredEmpty);
        }

        let extractor = KeyExtractor::new(&self.profile.identity_field);
        let wanted_index = KeyIndex::build(&extractor, wanted.records());
        let had_index = KeyIndex::build(&extractor, had.records());

        if !wanted_index.is_complete() || !had_index.is_complete() {
            debug!(
                desired_records = wanted_index.total(),
                desired_keys = wanted_index.len(),
                prior_records = had_index.total(),
                prior_keys = had_index.len(),
                "Could not resolve a distinct key for every record"
            );
            let mut out = Reconciled::passthrough(desired, GuardReason::IncompleteKeys);
            for (side, index) in [("desired", &wanted_index), ("prior", &had_index)] {
                if !index.duplicates().is_empty() {
                    out.diagnostics.push(Diagnostic::warning(
                        "Duplicate Keys",
                        format!(
                            "The {side} list repeats {}: {}",
                            self.profile.identity_field,
                            index.duplicates().join(", ")
                        ),
                    ));
                }
            }
            return out;
        }

        if wanted.len() != had.len() {
            debug!(
                desired_count = wanted.len(),
                prior_count = had.len(),
                "Element counts differ, sorting desired list by key"
            );
            return self.resorted(desired, wanted, &extractor);
        }

        match classify(&wanted_index, &had_index, self.profile.essential_fields.as_slice()) {
            Classification::ReorderOnly => {
                debug!(count = wanted.len(), "Reorder-only change, keeping prior list");
                Reconciled {
                    plan_value: prior.clone(),
                    decision: PlanDecision::Suppressed,
                    diagnostics: Diagnostics::new(),
                }
            }
            Classification::RealChange => self.resorted(desired, wanted, &extractor),
        }
    }

    /// Builds the canonically ordered desired list.
    fn resorted(
        &self,
        desired: &ListValue,
        wanted: &Collection,
        extractor: &KeyExtractor<'_>,
    ) -> Reconciled {
        let sorted = canonical_order(extractor, wanted.records());

        let element_type = self.element_type.unwrap_or(wanted.element_type());

        match Collection::new(element_type.clone(), sorted) {
            Ok(collection) => {
                debug!(count = collection.len(), "Applied key-sorted plan value");
                Reconciled {
                    plan_value: ListValue::Known(collection),
                    decision: PlanDecision::Resorted,
                    diagnostics: Diagnostics::new(),
                }
            }
            Err(err) => {
                let mut out = Reconciled::passthrough(desired, GuardReason::ElementTypeMismatch);
                out.diagnostics.push(err.into());
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Record, Value};
    use proptest::prelude::*;

    fn profile() -> AttributeProfile {
        AttributeProfile::nodegroups()
    }

    fn ng(name: &str) -> Record {
        ng_sized(name, "t3.large", 2, 2)
    }

    fn ng_sized(name: &str, instance_type: &str, desired: i64, max: i64) -> Record {
        Record::new()
            .with("name", name)
            .with("ami_family", "AmazonLinux2")
            .with("instance_type", instance_type)
            .with("desired_capacity", desired)
            .with("min_size", 1_i64)
            .with("max_size", max)
            .with("volume_size", 80_i64)
            .with("volume_type", "gp3")
            .with("private_networking", true)
            .with("max_pods_per_node", 50_i64)
            .with("version", "1.32")
    }

    fn list(records: Vec<Record>) -> ListValue {
        ListValue::Known(Collection::from_records(records))
    }

    fn keys(value: &ListValue) -> Vec<String> {
        value
            .as_known()
            .map(|c| {
                c.records()
                    .iter()
                    .map(|r| r.get("name").and_then(Value::as_str).unwrap_or("?").to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn run(prior: &ListValue, desired: &ListValue) -> Reconciled {
        let profile = profile();
        PlanSynthesizer::new(&profile).reconcile(desired, prior)
    }

    #[test]
    fn test_null_desired_passes_through() {
        let prior = list(vec![ng("ng-1")]);
        let out = run(&prior, &ListValue::Null);
        assert_eq!(out.decision, PlanDecision::Passthrough(GuardReason::DesiredUnresolved));
        assert_eq!(out.plan_value, ListValue::Null);

        let out = run(&prior, &ListValue::Unknown);
        assert_eq!(out.plan_value, ListValue::Unknown);
    }

    #[test]
    fn test_no_prior_passes_through() {
        let desired = list(vec![ng("ng-2"), ng("ng-1")]);
        let out = run(&ListValue::Null, &desired);
        assert_eq!(out.decision, PlanDecision::Passthrough(GuardReason::NoPrior));
        assert_eq!(out.plan_value, desired);
    }

    #[test]
    fn test_empty_desired_passes_through() {
        let prior = list(vec![ng("ng-1")]);
        let desired = list(vec![]);
        let out = run(&prior, &desired);
        assert_eq!(out.decision, PlanDecision::Passthrough(GuardReason::DesiredEmpty));
        assert_eq!(out.plan_value, desired);
    }

    #[test]
    fn test_reorder_only_returns_prior() {
        let prior = list(vec![ng("ng-1"), ng("ng-2"), ng("ng-3")]);
        let desired = list(vec![ng("ng-3"), ng("ng-1"), ng("ng-2")]);

        let out = run(&prior, &desired);
        assert!(out.is_suppressed());
        assert_eq!(out.plan_value, prior);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_add_at_start_keeps_every_record() {
        let prior = list(vec![ng("ng-1"), ng("ng-2"), ng("ng-3")]);
        let desired = list(vec![ng("ng-0"), ng("ng-1"), ng("ng-2"), ng("ng-3")]);

        let out = run(&prior, &desired);
        assert_eq!(out.decision, PlanDecision::Resorted);
        assert_eq!(keys(&out.plan_value), vec!["ng-0", "ng-1", "ng-2", "ng-3"]);
    }

    #[test]
    fn test_removal_omits_exactly_one_key() {
        let prior = list(vec![ng("ng-1"), ng("ng-2"), ng("ng-3")]);
        let desired = list(vec![ng("ng-3"), ng("ng-1")]);

        let out = run(&prior, &desired);
        assert_eq!(keys(&out.plan_value), vec!["ng-1", "ng-3"]);
    }

    #[test]
    fn test_field_change_under_reorder() {
        let prior = list(vec![ng("ng-a"), ng("ng-b"), ng("ng-c")]);
        let changed = ng_sized("ng-b", "t3.large", 5, 5);
        let desired = list(vec![ng("ng-c"), changed.clone(), ng("ng-a")]);

        let out = run(&prior, &desired);
        assert_eq!(out.decision, PlanDecision::Resorted);

        let planned = out.plan_value.as_known().unwrap().records();
        assert_eq!(planned, &[ng("ng-a"), changed, ng("ng-c")]);
    }

    #[test]
    fn test_unknown_key_in_desired_passes_through() {
        let prior = list(vec![ng("ng-1"), ng("ng-2")]);
        let desired = list(vec![
            ng("ng-2"),
            ng("ng-1"),
            ng("ng-new").with("name", Value::Unknown),
        ]);

        let out = run(&prior, &desired);
        assert_eq!(out.decision, PlanDecision::Passthrough(GuardReason::IncompleteKeys));
        assert_eq!(out.plan_value, desired);
    }

    #[test]
    fn test_duplicate_keys_pass_through() {
        let prior = list(vec![ng("ng-1"), ng("ng-2")]);
        let desired = list(vec![ng("ng-2"), ng("ng-2")]);

        let out = run(&prior, &desired);
        assert_eq!(out.decision, PlanDecision::Passthrough(GuardReason::IncompleteKeys));
        assert_eq!(out.diagnostics.len(), 1);
        assert!(!out.diagnostics.has_error());
        let warning = out.diagnostics.iter().next().unwrap();
        assert_eq!(warning.severity, crate::planner::Severity::Warning);
        assert!(warning.detail.contains("desired"));
        assert!(warning.detail.contains("ng-2"));
    }

    #[test]
    fn test_unknown_key_in_prior_passes_through() {
        let prior = list(vec![ng("ng-1"), ng("ng-2").with("name", Value::Unknown)]);
        let desired = list(vec![ng("ng-2"), ng("ng-1")]);

        let out = run(&prior, &desired);
        assert_eq!(out.decision, PlanDecision::Passthrough(GuardReason::IncompleteKeys));
        assert_eq!(out.plan_value, desired);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_duplicate_keys_in_prior_pass_through() {
        let prior = list(vec![ng("ng-1"), ng("ng-1"), ng("ng-2")]);
        let desired = list(vec![ng("ng-2"), ng("ng-1"), ng("ng-3")]);

        let out = run(&prior, &desired);
        assert_eq!(out.decision, PlanDecision::Passthrough(GuardReason::IncompleteKeys));
        assert_eq!(out.plan_value, desired);
        assert!(out.diagnostics.iter().all(|d| d.detail.contains("prior")));
    }

    #[test]
    fn test_element_type_mismatch_passes_through_with_error() {
        let prior = list(vec![ng("ng-1"), ng("ng-2")]);
        let desired = list(vec![ng("ng-2"), ng("ng-1"), ng("ng-0")]);
        let narrow = ObjectType::new(["name", "instance_type"]);

        let profile = profile();
        let out = PlanSynthesizer::new(&profile)
            .with_element_type(&narrow)
            .reconcile(&desired, &prior);

        assert_eq!(
            out.decision,
            PlanDecision::Passthrough(GuardReason::ElementTypeMismatch)
        );
        assert_eq!(out.plan_value, desired);
        assert!(out.diagnostics.has_error());
    }

    #[test]
    fn test_host_element_type_is_applied() {
        let prior = list(vec![ng("ng-1")]);
        let desired = list(vec![ng("ng-1"), ng("ng-0")]);
        let wide = ObjectType::infer(&[ng("ng-0").with("labels", Value::Null)]);

        let profile = profile();
        let out = PlanSynthesizer::new(&profile)
            .with_element_type(&wide)
            .reconcile(&desired, &prior);

        assert_eq!(out.decision, PlanDecision::Resorted);
        assert_eq!(out.plan_value.as_known().unwrap().element_type(), &wide);
    }

    #[test]
    fn test_unknown_essential_value_is_reorder_only() {
        let prior = list(vec![ng("ng-1"), ng("ng-2")]);
        let desired = list(vec![
            ng("ng-2").with("instance_type", Value::Unknown),
            ng("ng-1"),
        ]);

        let out = run(&prior, &desired);
        assert!(out.is_suppressed());
    }

    #[test]
    fn test_non_essential_change_is_reorder_only() {
        let prior = list(vec![ng("ng-1"), ng("ng-2")]);
        let desired = list(vec![ng("ng-2").with("version", "1.33"), ng("ng-1")]);

        let out = run(&prior, &desired);
        assert!(out.is_suppressed());
        assert_eq!(out.plan_value, prior);
    }

    proptest! {
        #[test]
        fn permutation_of_prior_is_suppressed(
            count in 1usize..8,
            seed in any::<u64>(),
        ) {
            let records: Vec<Record> = (0..count).map(|i| ng(&format!("ng-{i}"))).collect();
            let mut shuffled = records.clone();
            // Deterministic Fisher-Yates driven by the seed.
            let mut state = seed;
            for i in (1..shuffled.len()).rev() {
                state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                let j = usize::try_from(state >> 33).unwrap_or(0) % (i + 1);
                shuffled.swap(i, j);
            }

            let prior = list(records);
            let out = run(&prior, &list(shuffled));
            prop_assert!(out.is_suppressed());
            prop_assert_eq!(out.plan_value, prior);
        }

        #[test]
        fn addition_adds_exactly_one_key(count in 1usize..8, insert_at in 0usize..8) {
            let records: Vec<Record> = (0..count).map(|i| ng(&format!("ng-{i}"))).collect();
            let mut desired = records.clone();
            desired.insert(insert_at.min(count), ng("ng-new"));

            let out = run(&list(records), &list(desired));
            let mut expected: Vec<String> = (0..count).map(|i| format!("ng-{i}")).collect();
            expected.push(String::from("ng-new"));
            expected.sort();
            prop_assert_eq!(keys(&out.plan_value), expected);
        }
    }
}
