//! List plan modifier seam.
//!
//! The host plan framework calls a [`ListPlanModifier`] once per list
//! attribute while computing a plan. [`KeyedListSortModifier`] is the
//! implementation for lists of named sub-resources such as node groups.

use tracing::debug;

use crate::config::AttributeProfile;
use crate::value::{ListValue, ObjectType};

use super::diagnostics::Diagnostics;
use super::synth::{PlanDecision, PlanSynthesizer, Reconciled};

/// Request handed to a list plan modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Value from the authored configuration.
    pub config_value: ListValue,
    /// Value from the persisted prior state.
    pub state_value: ListValue,
    /// Value the framework currently proposes.
    pub plan_value: ListValue,
    /// Element type from the attribute schema. When absent, the desired
    /// list's own element type is used.
    pub element_type: Option<ObjectType>,
}

/// Response filled in by a list plan modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResponse {
    /// The planned value.
    pub plan_value: ListValue,
    /// Diagnostics accumulated while modifying the plan.
    pub diagnostics: Diagnostics,
}

/// A plan modifier for list attributes.
pub trait ListPlanModifier: Send + Sync {
    /// Plain-text description of the modifier.
    fn description(&self) -> String;

    /// Markdown description of the modifier.
    fn markdown_description(&self) -> String;

    /// Modifies the planned value of a list attribute.
    fn plan_modify_list(&self, req: &ListRequest, resp: &mut ListResponse);
}

/// Sorts keyed records by identity and suppresses reorder-only diffs.
#[derive(Debug, Clone)]
pub struct KeyedListSortModifier {
    profile: AttributeProfile,
}

impl ListRequest {
    /// Creates a request whose proposed plan equals the configuration.
    #[must_use]
    pub fn new(config_value: ListValue, state_value: ListValue) -> Self {
        Self {
            plan_value: config_value.clone(),
            config_value,
            state_value,
            element_type: None,
        }
    }

    /// Sets the schema element type planned lists must conform to.
    #[must_use]
    pub fn with_element_type(mut self, element_type: ObjectType) -> Self {
        self.element_type = Some(element_type);
        self
    }
}

impl ListResponse {
    /// Creates the response the framework starts from for a request.
    #[must_use]
    pub fn for_request(req: &ListRequest) -> Self {
        Self {
            plan_value: req.plan_value.clone(),
            diagnostics: Diagnostics::new(),
        }
    }
}

impl KeyedListSortModifier {
    /// Creates a modifier for the given attribute profile.
    #[must_use]
    pub const fn new(profile: AttributeProfile) -> Self {
        Self { profile }
    }

    /// The attribute profile.
    #[must_use]
    pub const fn profile(&self) -> &AttributeProfile {
        &self.profile
    }

    /// Runs the synthesizer for a request without touching a response.
    #[must_use]
    pub fn reconcile(&self, req: &ListRequest) -> Reconciled {
        let synthesizer = PlanSynthesizer::new(&self.profile);
        let synthesizer = match &req.element_type {
            Some(element_type) => synthesizer.with_element_type(element_type),
            None => synthesizer,
        };
        synthesizer.reconcile(&req.config_value, &req.state_value)
    }

    /// Reconciles the request into the response and reports the decision.
    ///
    /// Diagnostics are always appended. The planned value is replaced only
    /// when the synthesizer did not pass through and the response carries
    /// no error, including errors left by earlier modifiers.
    pub fn modify(&self, req: &ListRequest, resp: &mut ListResponse) -> PlanDecision {
        let Reconciled {
            plan_value,
            decision,
            diagnostics,
        } = self.reconcile(req);
        resp.diagnostics.append(diagnostics);

        match decision {
            PlanDecision::Passthrough(_) => {}
            _ if resp.diagnostics.has_error() => {
                debug!(?decision, "Plan left untouched, response carries an error");
            }
            _ => resp.plan_value = plan_value,
        }
        decision
    }
}

impl ListPlanModifier for KeyedListSortModifier {
    fn description(&self) -> String {
        format!(
            "Sorts list elements by '{}' to prevent ordering-based diffs. \
             When elements are reordered but have the same content, no changes are detected.",
            self.profile.identity_field
        )
    }

    fn markdown_description(&self) -> String {
        format!(
            "Sorts list elements by `{}` to prevent ordering-based diffs. \
             When elements are reordered but have the same content, no changes are detected.",
            self.profile.identity_field
        )
    }

    fn plan_modify_list(&self, req: &ListRequest, resp: &mut ListResponse) {
        debug!("KeyedListSortModifier: starting plan modification");

        let decision = self.modify(req, resp);
        debug!(?decision, "KeyedListSortModifier: plan modification done");
    }
}
