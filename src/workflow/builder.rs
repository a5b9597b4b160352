//! Workflow Graph Builder
//!
//! Expands an assessment into the display graph:
//!
//! ```text
//! intake_requirements -> department_pre_approval -> [compliance_review, it_review]
//!   -> negotiation -> [finance_final_approval, department_final_approval]
//!   -> cio_approval? -> contracting
//! ```

use procurement_types::{
    path_labels, Approver, ParallelStepGroup, RequestType, ReviewTrack, RiskAssessment, StepId,
    StepStatus, WorkflowGraph, WorkflowNode, WorkflowStep,
};
use rust_decimal::Decimal;

use crate::assessment::{gates, MANAGER_REASON};
use crate::policy::RoutingPolicy;

pub const REVIEW_GROUP_LABEL: &str = "Compliance & IT Review";
pub const FINAL_GROUP_LABEL: &str = "Final Approvals";

pub const RENEWAL_COMPLIANCE_SKIP: &str = "Pre-approved vendor renewal, no changes";
pub const RENEWAL_IT_SKIP: &str = "No technical changes detected";
pub const NO_RENEGOTIATION: &str = "No price renegotiation";

/// Number of triggers quoted in `why_required`
const WHY_TRIGGERS: usize = 2;

/// Build the display graph. Every gated step follows `assessment`; `amount`
/// is only cross-checked against the assessed negotiation decision.
pub fn build_workflow_graph(
    policy: &RoutingPolicy,
    request_type: RequestType,
    amount: Decimal,
    assessment: &RiskAssessment,
) -> WorkflowGraph {
    let builder = GraphBuilder { policy, assessment };

    let amount = amount.max(Decimal::ZERO);
    let negotiation_by_amount =
        gates::negotiation(amount, &policy.config().thresholds).is_required();
    if negotiation_by_amount != assessment.requires_negotiation {
        tracing::warn!(
            amount = %amount,
            requires_negotiation = assessment.requires_negotiation,
            "Graph amount disagrees with the assessed request; following the assessment"
        );
    }

    let mut nodes = vec![
        WorkflowNode::Step(builder.intake()),
        WorkflowNode::Step(builder.department_pre_approval()),
    ];

    if let Some(group) = builder.review_group(request_type) {
        nodes.push(WorkflowNode::ParallelGroup(group));
    }

    let negotiation = builder.negotiation();
    let renegotiated = !negotiation.is_skipped();
    nodes.push(WorkflowNode::Step(negotiation));
    nodes.push(WorkflowNode::ParallelGroup(builder.final_group(renegotiated)));

    if assessment.requires_cio {
        nodes.push(WorkflowNode::Step(builder.cio_approval()));
    }
    nodes.push(WorkflowNode::Step(builder.contracting()));

    WorkflowGraph { nodes }
}

struct GraphBuilder<'a> {
    policy: &'a RoutingPolicy,
    assessment: &'a RiskAssessment,
}

impl GraphBuilder<'_> {
    fn approver(&self, step: StepId) -> Option<Approver> {
        self.policy.config().approvers.for_step(step).cloned()
    }

    /// A step awaiting action, with its approver, SLA and audit text
    fn pending(&self, id: StepId, sla_hours: u32, why: impl Into<String>) -> WorkflowStep {
        let step = WorkflowStep::new(id, StepStatus::Pending)
            .with_sla_hours(sla_hours)
            .with_why_required(why);
        match self.approver(id) {
            Some(approver) => step.with_approver(approver),
            None => step,
        }
    }

    fn skipped(&self, id: StepId, reason: impl Into<String>) -> WorkflowStep {
        WorkflowStep::new(id, StepStatus::Skipped).with_condition(reason)
    }

    fn intake(&self) -> WorkflowStep {
        WorkflowStep::new(StepId::IntakeRequirements, StepStatus::Completed)
            .with_why_required("Request submitted with intake requirements")
    }

    fn department_pre_approval(&self) -> WorkflowStep {
        let sla = self.policy.config().sla_hours.department_pre_approval;
        let mut step = self.pending(StepId::DepartmentPreApproval, sla, MANAGER_REASON);
        step.status = StepStatus::Current;
        step
    }

    fn review_group(&self, request_type: RequestType) -> Option<ParallelStepGroup> {
        let a = self.assessment;
        let sla = &self.policy.config().sla_hours;

        let steps = if a.requires_compliance || a.requires_it {
            let compliance = if a.requires_compliance {
                let track = a.compliance_review_track.unwrap_or(ReviewTrack::Standard);
                let hours = match track {
                    ReviewTrack::Standard => sla.compliance_standard,
                    ReviewTrack::Expedited => sla.compliance_expedited,
                };
                self.pending(
                    StepId::ComplianceReview,
                    hours,
                    summarize(&a.compliance_triggers),
                )
                .with_condition(track.sla_note())
            } else {
                self.skipped(
                    StepId::ComplianceReview,
                    skip_reason(&a.compliance_skip_reason),
                )
            };

            let it = if a.requires_it {
                self.pending(StepId::ItReview, sla.it_review, summarize(&a.it_triggers))
            } else {
                self.skipped(StepId::ItReview, skip_reason(&a.it_skip_reason))
            };
            vec![compliance, it]
        } else if request_type.is_renewal() {
            vec![
                self.skipped(StepId::ComplianceReview, RENEWAL_COMPLIANCE_SKIP),
                self.skipped(StepId::ItReview, RENEWAL_IT_SKIP),
            ]
        } else {
            return None;
        };

        Some(ParallelStepGroup {
            label: REVIEW_GROUP_LABEL.to_string(),
            steps,
        })
    }

    fn negotiation(&self) -> WorkflowStep {
        let a = self.assessment;
        if a.requires_negotiation {
            self.pending(
                StepId::Negotiation,
                self.policy.config().sla_hours.negotiation,
                a.negotiation_reason.clone(),
            )
        } else if a.negotiation_reason.trim().is_empty() {
            self.skipped(StepId::Negotiation, "Negotiation not required")
        } else {
            self.skipped(StepId::Negotiation, a.negotiation_reason.clone())
        }
    }

    fn final_group(&self, renegotiated: bool) -> ParallelStepGroup {
        let a = self.assessment;
        let config = self.policy.config();

        let finance = if a.finance_auto_approved {
            WorkflowStep::new(StepId::FinanceFinalApproval, StepStatus::Completed)
                .with_condition(gates::finance_auto_approval_note(&config.thresholds))
        } else {
            self.pending(
                StepId::FinanceFinalApproval,
                config.sla_hours.finance_final_approval,
                summarize(&a.finance_triggers),
            )
        };

        let department = if renegotiated {
            self.pending(
                StepId::DepartmentFinalApproval,
                config.sla_hours.department_final_approval,
                "Negotiated terms may change the price; department re-approval required",
            )
        } else {
            self.skipped(StepId::DepartmentFinalApproval, NO_RENEGOTIATION)
        };

        ParallelStepGroup {
            label: FINAL_GROUP_LABEL.to_string(),
            steps: vec![finance, department],
        }
    }

    fn cio_approval(&self) -> WorkflowStep {
        self.pending(
            StepId::CioApproval,
            self.policy.config().sla_hours.cio_approval,
            summarize(&self.assessment.cio_triggers),
        )
    }

    fn contracting(&self) -> WorkflowStep {
        let config = self.policy.config();
        let a = self.assessment;
        let sla = config.sla_hours.contracting;

        if a.requires_legal {
            WorkflowStep::new(StepId::Contracting, StepStatus::Pending)
                .with_label(path_labels::LEGAL_CONTRACTING)
                .with_approver(config.approvers.legal.clone())
                .with_sla_hours(sla)
                .with_why_required(summarize(&a.legal_triggers))
        } else {
            self.pending(
                StepId::Contracting,
                sla,
                "Contract execution and vendor onboarding",
            )
        }
    }
}

/// First triggers joined for `why_required`
fn summarize(triggers: &[String]) -> String {
    triggers
        .iter()
        .take(WHY_TRIGGERS)
        .cloned()
        .collect::<Vec<_>>()
        .join("; ")
}

fn skip_reason(reason: &Option<String>) -> String {
    reason
        .clone()
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| "Not required for this request".to_string())
}
