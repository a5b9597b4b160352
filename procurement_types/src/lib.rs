//! Procurement Types - Level 1 Foundation Types
//!
//! Pure data structures shared by the routing engine and whatever hosts it
//! (intake form, dashboards, stored-request views).
//!
//! ## Architecture Level: LEVEL 1 (Foundation)
//!
//! Nothing in this crate depends on another workspace crate. The routing rules
//! live in `procurement-routing`; this crate only describes the values flowing
//! through them.
//!
//! ## Contents
//!
//! - Request attributes and declared risk factors (engine input)
//! - Risk assessment (engine output)
//! - Workflow graph nodes and step states
//!
//! ## Rules
//!
//! 1. **NO ROUTING LOGIC** - thresholds and gates belong to the engine
//! 2. **SERIALIZABLE** - every type round-trips through serde
//! 3. **UNKNOWN ENUM VALUES ARE KEPT** - they deserialize into an explicit
//!    `Unrecognized` variant so the engine can fail closed on them

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// REQUEST ENUMS
// ============================================================================

/// Whether the request buys something new or renews an existing contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    #[default]
    NewPurchase,
    Renewal,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::NewPurchase => "new_purchase",
            RequestType::Renewal => "renewal",
        }
    }

    pub fn is_renewal(&self) -> bool {
        matches!(self, RequestType::Renewal)
    }
}

/// Purchase category selected on the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestCategory {
    Saas,
    Software,
    Hardware,
    ProfessionalServices,
    DataServices,
    #[default]
    #[serde(other)]
    Other,
}

/// Contract commitment length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContractTerm {
    #[serde(rename = "month_to_month")]
    MonthToMonth,
    #[default]
    #[serde(rename = "1_year")]
    OneYear,
    #[serde(rename = "multi_year")]
    MultiYear,
    /// Any term outside the known set. Treated as a multi-year commitment.
    #[serde(other, rename = "unrecognized")]
    Unrecognized,
}

impl ContractTerm {
    /// Month-to-month and single-year terms are the only short commitments
    pub fn is_short_commitment(&self) -> bool {
        matches!(self, ContractTerm::MonthToMonth | ContractTerm::OneYear)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContractTerm::MonthToMonth => "month-to-month",
            ContractTerm::OneYear => "1 year",
            ContractTerm::MultiYear => "multi-year",
            ContractTerm::Unrecognized => "unrecognized term",
        }
    }
}

/// How deeply the purchased product integrates with company systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationType {
    #[default]
    None,
    SsoOnly,
    ReadOnlyApi,
    BidirectionalApi,
    CoreSystem,
    NetworkVpn,
    NotSure,
    /// Any value outside the known set. Treated as the highest-risk integration.
    #[serde(other)]
    Unrecognized,
}

impl IntegrationType {
    pub fn label(&self) -> &'static str {
        match self {
            IntegrationType::None => "none",
            IntegrationType::SsoOnly => "SSO only",
            IntegrationType::ReadOnlyApi => "read-only API",
            IntegrationType::BidirectionalApi => "bidirectional API",
            IntegrationType::CoreSystem => "core system",
            IntegrationType::NetworkVpn => "network/VPN",
            IntegrationType::NotSure => "not sure",
            IntegrationType::Unrecognized => "unrecognized",
        }
    }

    /// Integrations through which the vendor can read company data
    pub fn touches_data(&self) -> bool {
        matches!(
            self,
            IntegrationType::ReadOnlyApi
                | IntegrationType::BidirectionalApi
                | IntegrationType::CoreSystem
                | IntegrationType::NetworkVpn
                | IntegrationType::NotSure
                | IntegrationType::Unrecognized
        )
    }
}

// ============================================================================
// REQUEST ATTRIBUTES
// ============================================================================

/// Sensitive data categories the purchased product will access.
/// Each flag is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitiveDataAccess {
    pub phi: bool,
    pub investment_data: bool,
    pub pii: bool,
}

impl SensitiveDataAccess {
    pub fn any(&self) -> bool {
        self.phi || self.investment_data || self.pii
    }
}

/// Declared risk factors from the intake form.
///
/// The AI/ML and portfolio questions are tri-state: `None` means the requester
/// has not answered, in which case the engine falls back to keyword detection.
/// An explicit answer always wins over detection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskFactors {
    pub has_ai_ml_capabilities: Option<bool>,
    pub has_llm_api_access: Option<bool>,
    pub uses_ml_for_analysis: Option<bool>,

    pub has_portfolio_company_access: Option<bool>,
    pub integrates_with_portfolio_networks: Option<bool>,
    pub used_by_portfolio_staff: Option<bool>,

    pub integration_type: IntegrationType,
    pub requires_data_storage: bool,
    pub requires_network_access: bool,
    pub requires_custom_development: bool,
    /// Vendor stores company data outside the home jurisdiction
    pub cross_border_data_storage: bool,
    pub sensitive_data_access: SensitiveDataAccess,
}

/// Everything the engine knows about a purchase request.
/// Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestAttributes {
    /// Requested amount in USD. Missing or null reads as zero.
    #[serde(deserialize_with = "null_as_default")]
    pub amount: Decimal,
    pub request_type: RequestType,
    pub category: RequestCategory,
    pub department: String,
    /// Remaining department budget. `None` triggers the budget registry lookup.
    pub department_budget_remaining: Option<Decimal>,
    pub description: String,
    pub vendor_name: String,
    pub contract_term: ContractTerm,
    pub use_case_changed: bool,
    pub use_case_change_description: String,
    /// Licensed seats, for SaaS requests
    pub seat_count: Option<u32>,
    pub risk_factors: RiskFactors,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// RISK ASSESSMENT
// ============================================================================

/// Ordinal risk classification with its display text.
/// Only `level` takes part in routing; label and description are for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskTier {
    /// 0 (lowest) to 4 (highest)
    pub level: u8,
    pub label: String,
    pub description: String,
}

/// Which compliance review branch a request follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewTrack {
    /// Full review, 5-7 business days
    Standard,
    /// Use-case change on an already approved vendor, 2-3 business days
    Expedited,
}

impl ReviewTrack {
    pub fn sla_note(&self) -> &'static str {
        match self {
            ReviewTrack::Standard => "Standard compliance review: 5-7 business days",
            ReviewTrack::Expedited => "Use case change review: 2-3 business days",
        }
    }
}

/// Output of the risk assessment engine.
///
/// A domain is never both required and skipped, and every skip carries a
/// reason. `approval_path` lists the non-skipped approval steps in workflow
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    /// 0-100
    pub risk_score: u8,

    pub ai_ml_detected: bool,
    pub portfolio_access_detected: bool,
    pub is_pre_approved_vendor: bool,

    pub requires_manager: bool,

    pub requires_it: bool,
    pub it_skipped: bool,
    pub it_skip_reason: Option<String>,
    pub it_triggers: Vec<String>,

    pub requires_compliance: bool,
    pub compliance_skipped: bool,
    pub compliance_skip_reason: Option<String>,
    pub compliance_triggers: Vec<String>,
    /// Set only when compliance is required
    pub compliance_review_track: Option<ReviewTrack>,

    pub requires_legal: bool,
    pub legal_triggers: Vec<String>,

    /// Manual finance approval needed. Always the negation of `finance_auto_approved`.
    pub requires_finance: bool,
    pub finance_auto_approved: bool,
    /// First finance condition that fired, in priority order
    pub finance_reason: Option<String>,
    pub finance_triggers: Vec<String>,
    pub over_budget: bool,

    pub requires_negotiation: bool,
    /// Why negotiation is required, or why it was skipped
    pub negotiation_reason: String,

    pub requires_cio: bool,
    pub cio_triggers: Vec<String>,

    /// Compliance and IT both need human review
    pub requires_parallel_it_compliance: bool,

    pub routing_reasons: Vec<String>,
    pub approval_path: Vec<String>,
}

/// Labels used in `RiskAssessment::approval_path`
pub mod path_labels {
    pub const MANAGER: &str = "Manager";
    pub const COMPLIANCE: &str = "Compliance";
    pub const IT: &str = "IT";
    pub const NEGOTIATION: &str = "Negotiation";
    pub const FINANCE: &str = "Finance";
    pub const FINANCE_AUTO: &str = "Finance (Auto-Approved)";
    pub const DEPARTMENT_FINAL: &str = "Department Final";
    pub const CIO: &str = "CIO";
    pub const CONTRACTING: &str = "Contracting";
    pub const LEGAL_CONTRACTING: &str = "Legal & Contracting";
}

// ============================================================================
// WORKFLOW STEPS
// ============================================================================

/// Canonical workflow step identifiers, in workflow order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    IntakeRequirements,
    DepartmentPreApproval,
    ComplianceReview,
    ItReview,
    Negotiation,
    FinanceFinalApproval,
    DepartmentFinalApproval,
    CioApproval,
    Contracting,
}

impl StepId {
    /// Every step in canonical order
    pub const CANONICAL: [StepId; 9] = [
        StepId::IntakeRequirements,
        StepId::DepartmentPreApproval,
        StepId::ComplianceReview,
        StepId::ItReview,
        StepId::Negotiation,
        StepId::FinanceFinalApproval,
        StepId::DepartmentFinalApproval,
        StepId::CioApproval,
        StepId::Contracting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::IntakeRequirements => "intake_requirements",
            StepId::DepartmentPreApproval => "department_pre_approval",
            StepId::ComplianceReview => "compliance_review",
            StepId::ItReview => "it_review",
            StepId::Negotiation => "negotiation",
            StepId::FinanceFinalApproval => "finance_final_approval",
            StepId::DepartmentFinalApproval => "department_final_approval",
            StepId::CioApproval => "cio_approval",
            StepId::Contracting => "contracting",
        }
    }

    /// Display label for the step
    pub fn label(&self) -> &'static str {
        match self {
            StepId::IntakeRequirements => "Intake & Requirements",
            StepId::DepartmentPreApproval => "Department Pre-Approval",
            StepId::ComplianceReview => "Compliance Review",
            StepId::ItReview => "IT Review",
            StepId::Negotiation => "Negotiation",
            StepId::FinanceFinalApproval => "Finance Final Approval",
            StepId::DepartmentFinalApproval => "Department Final Approval",
            StepId::CioApproval => "CIO Approval",
            StepId::Contracting => "Contracting",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown workflow step '{0}'")]
pub struct ParseStepIdError(pub String);

impl FromStr for StepId {
    type Err = ParseStepIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepId::CANONICAL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| ParseStepIdError(s.to_string()))
    }
}

/// Display status of a workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Current,
    Pending,
    Skipped,
}

/// Who acts on a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    pub name: String,
    pub role: String,
}

impl Approver {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }
}

/// A single rendered workflow step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: StepId,
    pub label: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver: Option<Approver>,
    /// Skip reason or condition note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla_hours_remaining: Option<u32>,
    /// Audit text naming the triggers that put this step on the path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_required: Option<String>,
}

impl WorkflowStep {
    /// Create a step with the canonical label
    pub fn new(id: StepId, status: StepStatus) -> Self {
        Self {
            id,
            label: id.label().to_string(),
            status,
            approver: None,
            condition_label: None,
            sla_hours_remaining: None,
            why_required: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_approver(mut self, approver: Approver) -> Self {
        self.approver = Some(approver);
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition_label = Some(condition.into());
        self
    }

    pub fn with_sla_hours(mut self, hours: u32) -> Self {
        self.sla_hours_remaining = Some(hours);
        self
    }

    pub fn with_why_required(mut self, why: impl Into<String>) -> Self {
        self.why_required = Some(why.into());
        self
    }

    pub fn is_skipped(&self) -> bool {
        self.status == StepStatus::Skipped
    }

    /// The approval-path label for this step, or `None` when the step does not
    /// appear on the path (intake, or skipped).
    pub fn path_label(&self) -> Option<&str> {
        if self.is_skipped() {
            return None;
        }
        let label = match self.id {
            StepId::IntakeRequirements => return None,
            StepId::DepartmentPreApproval => path_labels::MANAGER,
            StepId::ComplianceReview => path_labels::COMPLIANCE,
            StepId::ItReview => path_labels::IT,
            StepId::Negotiation => path_labels::NEGOTIATION,
            StepId::FinanceFinalApproval if self.status == StepStatus::Completed => {
                path_labels::FINANCE_AUTO
            }
            StepId::FinanceFinalApproval => path_labels::FINANCE,
            StepId::DepartmentFinalApproval => path_labels::DEPARTMENT_FINAL,
            StepId::CioApproval => path_labels::CIO,
            StepId::Contracting if self.label == path_labels::LEGAL_CONTRACTING => {
                path_labels::LEGAL_CONTRACTING
            }
            StepId::Contracting => path_labels::CONTRACTING,
        };
        Some(label)
    }
}

/// Steps that may be worked in any order but must all finish (or be skipped)
/// before anything downstream proceeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelStepGroup {
    pub label: String,
    pub steps: Vec<WorkflowStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowNode {
    Step(WorkflowStep),
    ParallelGroup(ParallelStepGroup),
}

/// Ordered sequence of workflow nodes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowGraph {
    pub nodes: Vec<WorkflowNode>,
}

impl WorkflowGraph {
    /// All steps in order, with parallel groups flattened in member order
    pub fn steps(&self) -> impl Iterator<Item = &WorkflowStep> {
        self.nodes.iter().flat_map(|node| match node {
            WorkflowNode::Step(step) => std::slice::from_ref(step).iter(),
            WorkflowNode::ParallelGroup(group) => group.steps.iter(),
        })
    }

    pub fn step(&self, id: StepId) -> Option<&WorkflowStep> {
        self.steps().find(|s| s.id == id)
    }

    pub fn contains(&self, id: StepId) -> bool {
        self.step(id).is_some()
    }

    /// Approval-path labels of every non-skipped step, in order
    pub fn approval_labels(&self) -> Vec<String> {
        self.steps()
            .filter_map(|s| s.path_label().map(str::to_string))
            .collect()
    }
}

// ============================================================================
// RESOLVED STEP STATES
// ============================================================================

/// Status of one canonical step of a persisted request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStep {
    pub step_id: StepId,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    /// Why a step completed without human action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_integration_type_is_kept() {
        let factors: RiskFactors =
            serde_json::from_str(r#"{"integration_type": "mainframe_bridge"}"#).unwrap();
        assert_eq!(factors.integration_type, IntegrationType::Unrecognized);
    }

    #[test]
    fn test_contract_term_wire_names() {
        let term: ContractTerm = serde_json::from_str(r#""1_year""#).unwrap();
        assert_eq!(term, ContractTerm::OneYear);
        let term: ContractTerm = serde_json::from_str(r#""five_year""#).unwrap();
        assert_eq!(term, ContractTerm::Unrecognized);
        assert!(!term.is_short_commitment());
    }

    #[test]
    fn test_null_amount_reads_as_zero() {
        let attrs: RequestAttributes =
            serde_json::from_str(r#"{"amount": null, "vendor_name": "Acme"}"#).unwrap();
        assert_eq!(attrs.amount, Decimal::ZERO);
        assert_eq!(attrs.department_budget_remaining, None);
        assert_eq!(attrs.request_type, RequestType::NewPurchase);
    }

    #[test]
    fn test_step_id_from_str() {
        assert_eq!("cio_approval".parse::<StepId>(), Ok(StepId::CioApproval));
        assert!("legal".parse::<StepId>().is_err());
        for step in StepId::CANONICAL {
            assert_eq!(step.as_str().parse::<StepId>(), Ok(step));
        }
    }

    #[test]
    fn test_path_label_for_auto_approved_finance() {
        let step = WorkflowStep::new(StepId::FinanceFinalApproval, StepStatus::Completed);
        assert_eq!(step.path_label(), Some(path_labels::FINANCE_AUTO));

        let skipped = WorkflowStep::new(StepId::Negotiation, StepStatus::Skipped);
        assert_eq!(skipped.path_label(), None);
    }

    #[test]
    fn test_graph_flattens_parallel_groups() {
        let graph = WorkflowGraph {
            nodes: vec![
                WorkflowNode::Step(WorkflowStep::new(
                    StepId::IntakeRequirements,
                    StepStatus::Completed,
                )),
                WorkflowNode::ParallelGroup(ParallelStepGroup {
                    label: "Review".into(),
                    steps: vec![
                        WorkflowStep::new(StepId::ComplianceReview, StepStatus::Pending),
                        WorkflowStep::new(StepId::ItReview, StepStatus::Skipped),
                    ],
                }),
            ],
        };

        let ids: Vec<StepId> = graph.steps().map(|s| s.id).collect();
        assert_eq!(
            ids,
            vec![
                StepId::IntakeRequirements,
                StepId::ComplianceReview,
                StepId::ItReview
            ]
        );
        assert_eq!(graph.approval_labels(), vec!["Compliance".to_string()]);
    }
}
