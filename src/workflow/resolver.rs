//! Step State Resolver
//!
//! Translates a single "current step" pointer plus a skip predicate into a
//! status for every canonical step. Position is taken from the canonical
//! order, never from the order in which a client happens to list steps.

use procurement_types::{ResolvedStep, RiskAssessment, StepId, StepStatus};

use crate::assessment::gates::finance_auto_approval_note;
use crate::policy::RoutingPolicy;

/// How a step relates to the request being resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepApplicability {
    Applicable,
    /// Already satisfied without human action (auto-approval), with its note
    Satisfied(String),
    /// Shown as skipped, with the reason
    Skipped(String),
    /// Not part of this request's workflow at all
    NotApplicable,
}

/// Decides which canonical steps apply to a request
pub trait SkipPredicate {
    fn applicability(&self, step: StepId) -> StepApplicability;
}

impl<F> SkipPredicate for F
where
    F: Fn(StepId) -> StepApplicability,
{
    fn applicability(&self, step: StepId) -> StepApplicability {
        self(step)
    }
}

/// The request's position in the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentStep {
    At(StepId),
    /// Every applicable step is complete
    Finished,
}

impl std::str::FromStr for CurrentStep {
    type Err = procurement_types::ParseStepIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "finished" | "done" => Ok(CurrentStep::Finished),
            other => other.parse().map(CurrentStep::At),
        }
    }
}

/// Resolve the status of every step in `canonical`.
///
/// Steps before the pointer are `Completed`, the pointer is `Current` and
/// later steps are `Pending`. A `Skipped` applicability overrides any of
/// those, as does `Satisfied`, which is always `Completed`. `NotApplicable`
/// steps are left out. A pointer absent from `canonical` yields every
/// applicable step `Pending`.
pub fn resolve_step_states(
    canonical: &[StepId],
    current: CurrentStep,
    skips: &dyn SkipPredicate,
) -> Vec<ResolvedStep> {
    let current_index = match current {
        CurrentStep::At(step) => {
            let index = canonical.iter().position(|s| *s == step);
            if index.is_none() {
                tracing::warn!(step = %step, "Current step is not in the canonical order");
            }
            index
        }
        CurrentStep::Finished => Some(canonical.len()),
    };

    canonical
        .iter()
        .enumerate()
        .filter_map(|(index, &step_id)| {
            let (status, skip_reason, note) = match skips.applicability(step_id) {
                StepApplicability::NotApplicable => return None,
                StepApplicability::Skipped(reason) => (StepStatus::Skipped, Some(reason), None),
                StepApplicability::Satisfied(note) => (StepStatus::Completed, None, Some(note)),
                StepApplicability::Applicable => {
                    let status = match current_index {
                        Some(ci) if index < ci => StepStatus::Completed,
                        Some(ci) if index == ci => StepStatus::Current,
                        _ => StepStatus::Pending,
                    };
                    (status, None, None)
                }
            };
            Some(ResolvedStep {
                step_id,
                status,
                skip_reason,
                note,
            })
        })
        .collect()
}

// ============================================================================
// ASSESSMENT-DRIVEN SKIPS
// ============================================================================

/// Skip predicate derived from a risk assessment
#[derive(Debug, Clone)]
pub struct AssessmentSkips<'a> {
    assessment: &'a RiskAssessment,
    finance_note: String,
    price_renegotiated: bool,
}

impl<'a> AssessmentSkips<'a> {
    pub fn new(policy: &RoutingPolicy, assessment: &'a RiskAssessment) -> Self {
        Self {
            assessment,
            finance_note: finance_auto_approval_note(&policy.config().thresholds),
            price_renegotiated: false,
        }
    }

    /// Department final approval applies only once negotiation changed price
    pub fn with_price_renegotiated(mut self, renegotiated: bool) -> Self {
        self.price_renegotiated = renegotiated;
        self
    }
}

impl SkipPredicate for AssessmentSkips<'_> {
    fn applicability(&self, step: StepId) -> StepApplicability {
        let a = self.assessment;
        let skipped = |reason: &Option<String>| {
            StepApplicability::Skipped(reason.clone().unwrap_or_default())
        };

        match step {
            StepId::ComplianceReview if !a.requires_compliance => {
                skipped(&a.compliance_skip_reason)
            }
            StepId::ItReview if !a.requires_it => skipped(&a.it_skip_reason),
            StepId::Negotiation if !a.requires_negotiation => {
                StepApplicability::Skipped(a.negotiation_reason.clone())
            }
            StepId::FinanceFinalApproval if a.finance_auto_approved => {
                StepApplicability::Satisfied(self.finance_note.clone())
            }
            StepId::DepartmentFinalApproval if !self.price_renegotiated => {
                StepApplicability::NotApplicable
            }
            StepId::CioApproval if !a.requires_cio => StepApplicability::NotApplicable,
            _ => StepApplicability::Applicable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::assess;
    use procurement_types::RequestAttributes;
    use rust_decimal::Decimal;

    fn statuses(resolved: &[ResolvedStep]) -> Vec<(StepId, StepStatus)> {
        resolved.iter().map(|r| (r.step_id, r.status)).collect()
    }

    fn no_skips(_step: StepId) -> StepApplicability {
        StepApplicability::Applicable
    }

    #[test]
    fn test_pointer_splits_completed_and_pending() {
        let canonical = [
            StepId::IntakeRequirements,
            StepId::DepartmentPreApproval,
            StepId::Contracting,
        ];
        let resolved = resolve_step_states(
            &canonical,
            CurrentStep::At(StepId::DepartmentPreApproval),
            &no_skips,
        );
        assert_eq!(
            statuses(&resolved),
            vec![
                (StepId::IntakeRequirements, StepStatus::Completed),
                (StepId::DepartmentPreApproval, StepStatus::Current),
                (StepId::Contracting, StepStatus::Pending),
            ]
        );
    }

    #[test]
    fn test_skip_overrides_position() {
        let skips = |step: StepId| match step {
            StepId::ItReview => StepApplicability::Skipped("No integration".into()),
            _ => StepApplicability::Applicable,
        };
        let resolved =
            resolve_step_states(&StepId::CANONICAL, CurrentStep::At(StepId::ItReview), &skips);

        let it = resolved.iter().find(|r| r.step_id == StepId::ItReview).unwrap();
        assert_eq!(it.status, StepStatus::Skipped);
        assert_eq!(it.skip_reason.as_deref(), Some("No integration"));
        // Nothing is current when the pointer lands on a skipped step
        assert!(resolved.iter().all(|r| r.status != StepStatus::Current));
    }

    #[test]
    fn test_unknown_pointer_leaves_everything_pending() {
        let canonical = [StepId::IntakeRequirements, StepId::Contracting];
        let resolved =
            resolve_step_states(&canonical, CurrentStep::At(StepId::CioApproval), &no_skips);
        assert!(resolved.iter().all(|r| r.status == StepStatus::Pending));
    }

    #[test]
    fn test_finished_completes_applicable_steps() {
        let skips = |step: StepId| match step {
            StepId::CioApproval => StepApplicability::NotApplicable,
            StepId::Negotiation => StepApplicability::Skipped("Under $25K threshold".into()),
            _ => StepApplicability::Applicable,
        };
        let resolved = resolve_step_states(&StepId::CANONICAL, CurrentStep::Finished, &skips);

        assert_eq!(resolved.len(), StepId::CANONICAL.len() - 1);
        for r in &resolved {
            let expected = if r.step_id == StepId::Negotiation {
                StepStatus::Skipped
            } else {
                StepStatus::Completed
            };
            assert_eq!(r.status, expected, "{}", r.step_id);
        }
    }

    #[test]
    fn test_assessment_skips_for_small_renewal() {
        let policy = RoutingPolicy::builtin();
        let attrs = RequestAttributes {
            amount: Decimal::new(3_000, 0),
            request_type: procurement_types::RequestType::Renewal,
            vendor_name: "Zoom".into(),
            ..Default::default()
        };
        let assessment = assess(&policy, &attrs);
        let skips = AssessmentSkips::new(&policy, &assessment);

        let resolved = resolve_step_states(
            &StepId::CANONICAL,
            CurrentStep::At(StepId::DepartmentPreApproval),
            &skips,
        );
        let ids: Vec<StepId> = resolved.iter().map(|r| r.step_id).collect();
        assert!(!ids.contains(&StepId::CioApproval));
        assert!(!ids.contains(&StepId::DepartmentFinalApproval));

        for r in resolved.iter().filter(|r| r.status == StepStatus::Skipped) {
            assert!(r.skip_reason.as_deref().is_some_and(|s| !s.is_empty()));
        }
        let finance = resolved
            .iter()
            .find(|r| r.step_id == StepId::FinanceFinalApproval)
            .unwrap();
        // Auto-approved finance is satisfied ahead of the pointer, not skipped
        assert_eq!(finance.status, StepStatus::Completed);
        assert_eq!(finance.skip_reason, None);
        assert!(finance
            .note
            .as_deref()
            .is_some_and(|n| n.starts_with("Auto-approved")));
    }

    #[test]
    fn test_auto_approved_finance_agrees_with_graph() {
        let policy = RoutingPolicy::builtin();
        let attrs = RequestAttributes {
            amount: Decimal::new(3_000, 0),
            request_type: procurement_types::RequestType::Renewal,
            vendor_name: "Zoom".into(),
            ..Default::default()
        };
        let assessment = assess(&policy, &attrs);
        let graph = crate::workflow::build_workflow_graph(
            &policy,
            attrs.request_type,
            attrs.amount,
            &assessment,
        );
        let skips = AssessmentSkips::new(&policy, &assessment);

        for current in [
            CurrentStep::At(StepId::IntakeRequirements),
            CurrentStep::At(StepId::Contracting),
            CurrentStep::Finished,
        ] {
            let resolved = resolve_step_states(&StepId::CANONICAL, current, &skips);
            let finance = resolved
                .iter()
                .find(|r| r.step_id == StepId::FinanceFinalApproval)
                .unwrap();
            assert_eq!(
                Some(finance.status),
                graph.step(StepId::FinanceFinalApproval).map(|s| s.status)
            );
        }
        assert!(assessment
            .approval_path
            .contains(&"Finance (Auto-Approved)".to_string()));
    }

    #[test]
    fn test_renegotiation_brings_back_department_final() {
        let policy = RoutingPolicy::builtin();
        let attrs = RequestAttributes {
            amount: Decimal::new(30_000, 0),
            ..Default::default()
        };
        let assessment = assess(&policy, &attrs);
        let skips = AssessmentSkips::new(&policy, &assessment).with_price_renegotiated(true);

        let resolved =
            resolve_step_states(&StepId::CANONICAL, CurrentStep::At(StepId::Negotiation), &skips);
        let department = resolved
            .iter()
            .find(|r| r.step_id == StepId::DepartmentFinalApproval)
            .unwrap();
        assert_eq!(department.status, StepStatus::Pending);
    }

    #[test]
    fn test_current_step_parses() {
        assert_eq!("finished".parse::<CurrentStep>().unwrap(), CurrentStep::Finished);
        assert_eq!(
            "it_review".parse::<CurrentStep>().unwrap(),
            CurrentStep::At(StepId::ItReview)
        );
        assert!("lunch".parse::<CurrentStep>().is_err());
    }
}
