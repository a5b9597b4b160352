//! Routing engine facade
//!
//! Binds the three routing operations to one policy. The free functions use
//! the process-wide policy installed at startup.

use std::sync::Arc;

use procurement_types::{
    RequestAttributes, RequestType, ResolvedStep, RiskAssessment, StepId, WorkflowGraph,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::assessment;
use crate::policy::RoutingPolicy;
use crate::workflow::{self, CurrentStep, SkipPredicate};

/// Assessment together with the graph derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingDecision {
    pub assessment: RiskAssessment,
    pub graph: WorkflowGraph,
}

#[derive(Debug, Clone)]
pub struct RoutingEngine {
    policy: Arc<RoutingPolicy>,
}

impl RoutingEngine {
    pub fn new(policy: Arc<RoutingPolicy>) -> Self {
        Self { policy }
    }

    /// Engine over the process-wide policy
    pub fn global() -> Self {
        Self::new(RoutingPolicy::global())
    }

    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }

    pub fn assess_risk(&self, attrs: &RequestAttributes) -> RiskAssessment {
        assessment::assess(&self.policy, attrs)
    }

    pub fn build_workflow_graph(
        &self,
        request_type: RequestType,
        amount: Decimal,
        assessment: &RiskAssessment,
    ) -> WorkflowGraph {
        workflow::build_workflow_graph(&self.policy, request_type, amount, assessment)
    }

    pub fn resolve_step_states(
        &self,
        canonical: &[StepId],
        current: CurrentStep,
        skips: &dyn SkipPredicate,
    ) -> Vec<ResolvedStep> {
        workflow::resolve_step_states(canonical, current, skips)
    }

    /// Assess and build the graph in one call
    pub fn evaluate(&self, attrs: &RequestAttributes) -> RoutingDecision {
        let assessment = self.assess_risk(attrs);
        let graph = self.build_workflow_graph(attrs.request_type, attrs.amount, &assessment);
        RoutingDecision { assessment, graph }
    }
}

pub fn assess_risk(attrs: &RequestAttributes) -> RiskAssessment {
    assessment::assess(&RoutingPolicy::global(), attrs)
}

pub fn build_workflow_graph(
    request_type: RequestType,
    amount: Decimal,
    assessment: &RiskAssessment,
) -> WorkflowGraph {
    workflow::build_workflow_graph(&RoutingPolicy::global(), request_type, amount, assessment)
}

pub fn resolve_step_states(
    canonical: &[StepId],
    current: CurrentStep,
    skips: &dyn SkipPredicate,
) -> Vec<ResolvedStep> {
    workflow::resolve_step_states(canonical, current, skips)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_is_deterministic() {
        let engine = RoutingEngine::new(Arc::new(RoutingPolicy::builtin()));
        let attrs = RequestAttributes {
            amount: Decimal::new(45_000, 0),
            vendor_name: "Northwind Analytics".into(),
            description: "Machine learning forecasting".into(),
            ..Default::default()
        };
        let first = engine.evaluate(&attrs);
        let second = engine.evaluate(&attrs);
        assert_eq!(first, second);
        assert_eq!(first.graph.approval_labels(), first.assessment.approval_path);
    }
}
