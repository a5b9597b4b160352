//! End-to-end routing scenarios
//!
//! Each test runs a request through assessment, graph construction and (where
//! relevant) step resolution with the built-in policy.

use std::sync::Arc;

use procurement_routing::assessment::gates::USE_CASE_CHANGED;
use procurement_routing::procurement_types::{
    ContractTerm, RequestAttributes, RequestCategory, RequestType, ReviewTrack, StepId,
    StepStatus, WorkflowNode, WorkflowStep,
};
use procurement_routing::{
    AssessmentSkips, CurrentStep, RoutingDecision, RoutingEngine, RoutingPolicy,
};
use rust_decimal::Decimal;

fn engine() -> RoutingEngine {
    RoutingEngine::new(Arc::new(RoutingPolicy::builtin()))
}

fn evaluate(attrs: &RequestAttributes) -> RoutingDecision {
    let decision = engine().evaluate(attrs);
    assert_eq!(
        decision.graph.approval_labels(),
        decision.assessment.approval_path,
        "graph and approval path disagree"
    );
    decision
}

fn dollars(amount: i64) -> Decimal {
    Decimal::new(amount, 0)
}

#[test]
fn test_small_pre_approved_renewal_goes_straight_through() {
    let attrs = RequestAttributes {
        amount: dollars(5_000),
        request_type: RequestType::Renewal,
        category: RequestCategory::Saas,
        department: "Operations".into(),
        vendor_name: "Slack".into(),
        description: "Annual renewal of team messaging".into(),
        ..Default::default()
    };
    let RoutingDecision { assessment, graph } = evaluate(&attrs);

    assert!(assessment.tier.level <= 1);
    assert!(assessment.is_pre_approved_vendor);
    assert!(assessment.it_skipped && !assessment.requires_it);
    assert!(assessment.compliance_skipped && !assessment.requires_compliance);
    assert!(assessment.finance_auto_approved && !assessment.requires_finance);
    assert!(!assessment.requires_cio);
    assert!(!assessment.requires_negotiation);
    assert_eq!(
        assessment.approval_path,
        vec!["Manager", "Finance (Auto-Approved)", "Contracting"]
    );

    let negotiation = graph.step(StepId::Negotiation).unwrap();
    assert_eq!(negotiation.status, StepStatus::Skipped);
    assert_eq!(
        negotiation.condition_label.as_deref(),
        Some("Under $25K threshold")
    );
    assert!(!graph.contains(StepId::CioApproval));
    assert_eq!(
        graph.step(StepId::FinanceFinalApproval).unwrap().status,
        StepStatus::Completed
    );
}

#[test]
fn test_large_ai_purchase_from_new_vendor() {
    let mut attrs = RequestAttributes {
        amount: dollars(75_000),
        category: RequestCategory::Software,
        vendor_name: "Cortex Insights".into(),
        description: "Forecasting platform for the deal team".into(),
        ..Default::default()
    };
    attrs.risk_factors.has_ai_ml_capabilities = Some(true);

    let RoutingDecision { assessment, graph } = evaluate(&attrs);

    assert!(assessment.requires_cio);
    assert!(assessment
        .cio_triggers
        .iter()
        .any(|t| t.starts_with("Amount $75,000")));
    assert!(assessment
        .cio_triggers
        .iter()
        .any(|t| t == "AI/ML capabilities detected"));

    assert!(assessment.requires_negotiation);
    assert!(assessment.requires_finance);
    assert!(!assessment.finance_auto_approved);
    assert!(assessment
        .finance_reason
        .as_deref()
        .is_some_and(|r| r.starts_with("Amount $75,000")));

    assert!(assessment.requires_it);
    assert!(assessment
        .it_triggers
        .contains(&"New vendor (not on pre-approved list)".to_string()));

    assert!(graph.contains(StepId::CioApproval));
    assert_eq!(
        graph.step(StepId::DepartmentFinalApproval).unwrap().status,
        StepStatus::Pending
    );
}

#[test]
fn test_use_case_change_on_pre_approved_renewal() {
    let attrs = RequestAttributes {
        amount: dollars(8_000),
        request_type: RequestType::Renewal,
        category: RequestCategory::Saas,
        vendor_name: "Zoom".into(),
        description: "Renewal adding the new webinar recording feature".into(),
        use_case_changed: true,
        use_case_change_description: "Record webinars for investor events".into(),
        ..Default::default()
    };
    let RoutingDecision { assessment, graph } = evaluate(&attrs);

    assert!(assessment.is_pre_approved_vendor);
    assert!(assessment.requires_it);
    assert!(assessment
        .it_triggers
        .iter()
        .any(|t| t.contains("Use case changed")));

    assert!(assessment.requires_compliance);
    assert_eq!(assessment.compliance_triggers, vec![USE_CASE_CHANGED]);
    assert_eq!(
        assessment.compliance_review_track,
        Some(ReviewTrack::Expedited)
    );

    let compliance = graph.step(StepId::ComplianceReview).unwrap();
    assert_eq!(compliance.status, StepStatus::Pending);
    assert_eq!(compliance.sla_hours_remaining, Some(72));
    assert!(compliance
        .condition_label
        .as_deref()
        .is_some_and(|c| c.contains("2-3 business days")));
}

#[test]
fn test_finance_amount_threshold_beats_healthy_budget() {
    let attrs = RequestAttributes {
        amount: dollars(12_000),
        vendor_name: "Atlassian".into(),
        department_budget_remaining: Some(dollars(80_000)),
        contract_term: ContractTerm::OneYear,
        ..Default::default()
    };
    let RoutingDecision { assessment, .. } = evaluate(&attrs);

    assert!(assessment.requires_finance);
    assert!(!assessment.finance_auto_approved);
    assert!(!assessment.over_budget);
    assert_eq!(assessment.finance_triggers.len(), 1);
    assert!(assessment
        .finance_reason
        .as_deref()
        .is_some_and(|r| r.contains("auto-approval limit")));
}

#[test]
fn test_over_budget_exception() {
    let attrs = RequestAttributes {
        amount: dollars(30_000),
        vendor_name: "Salesforce".into(),
        department_budget_remaining: Some(dollars(10_000)),
        ..Default::default()
    };
    let RoutingDecision { assessment, .. } = evaluate(&attrs);

    assert!(assessment.over_budget);
    assert!(assessment
        .finance_triggers
        .iter()
        .any(|t| t.starts_with("Over-budget exception")));
    // Amount is checked first, so it stays the headline reason
    assert!(assessment
        .finance_reason
        .as_deref()
        .is_some_and(|r| r.starts_with("Amount $30,000")));
    assert!(!assessment.requires_legal);
    assert!(!assessment.requires_cio);
    assert!(assessment.requires_negotiation);
}

#[test]
fn test_unrecognized_integration_fails_closed() {
    let attrs: RequestAttributes = serde_json::from_str(
        r#"{
            "amount": 4000,
            "request_type": "renewal",
            "vendor_name": "Okta",
            "risk_factors": { "integration_type": "mainframe_bridge" }
        }"#,
    )
    .unwrap();
    let RoutingDecision { assessment, .. } = evaluate(&attrs);

    assert!(assessment.requires_it);
    assert!(assessment.requires_cio);
    assert!(assessment
        .cio_triggers
        .iter()
        .any(|t| t.contains("Unrecognized integration type")));
}

#[test]
fn test_renewal_without_reviews_renders_skipped_pair() {
    let attrs = RequestAttributes {
        amount: dollars(2_500),
        request_type: RequestType::Renewal,
        vendor_name: "DocuSign".into(),
        ..Default::default()
    };
    let RoutingDecision { graph, .. } = evaluate(&attrs);

    let group = graph
        .nodes
        .iter()
        .find_map(|node| match node {
            WorkflowNode::ParallelGroup(group)
                if group.steps.iter().any(|s| s.id == StepId::ItReview) =>
            {
                Some(group)
            }
            _ => None,
        })
        .expect("review group rendered for renewal");
    assert!(group.steps.iter().all(WorkflowStep::is_skipped));
    assert!(group
        .steps
        .iter()
        .all(|s| s.condition_label.as_deref().is_some_and(|c| !c.is_empty())));
}

#[test]
fn test_stored_request_resolution() {
    let engine = engine();
    let attrs = RequestAttributes {
        amount: dollars(40_000),
        vendor_name: "Globex Data".into(),
        ..Default::default()
    };
    let assessment = engine.assess_risk(&attrs);
    let skips = AssessmentSkips::new(engine.policy(), &assessment);

    let resolved = engine.resolve_step_states(
        &StepId::CANONICAL,
        CurrentStep::At(StepId::Negotiation),
        &skips,
    );
    let status = |id: StepId| resolved.iter().find(|r| r.step_id == id).map(|r| r.status);

    assert_eq!(status(StepId::IntakeRequirements), Some(StepStatus::Completed));
    assert_eq!(status(StepId::DepartmentPreApproval), Some(StepStatus::Completed));
    assert_eq!(status(StepId::ComplianceReview), Some(StepStatus::Skipped));
    assert_eq!(status(StepId::ItReview), Some(StepStatus::Completed));
    assert_eq!(status(StepId::Negotiation), Some(StepStatus::Current));
    assert_eq!(status(StepId::FinanceFinalApproval), Some(StepStatus::Pending));
    assert_eq!(status(StepId::Contracting), Some(StepStatus::Pending));
    // Not applicable, so absent rather than skipped
    assert_eq!(status(StepId::DepartmentFinalApproval), None);
    assert_eq!(status(StepId::CioApproval), None);
}

#[test]
fn test_global_entry_points_match_engine() {
    let attrs = RequestAttributes {
        amount: dollars(18_000),
        vendor_name: "Initech".into(),
        description: "Portfolio company reporting portal".into(),
        ..Default::default()
    };
    let assessment = procurement_routing::assess_risk(&attrs);
    assert!(assessment.portfolio_access_detected);
    assert!(assessment.requires_cio);

    let graph =
        procurement_routing::build_workflow_graph(attrs.request_type, attrs.amount, &assessment);
    assert_eq!(graph.approval_labels(), assessment.approval_path);
    assert_eq!(engine().evaluate(&attrs).assessment, assessment);
}
