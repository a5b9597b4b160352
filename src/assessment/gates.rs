//! Per-approver gating rules
//!
//! Each gate is evaluated independently against `RiskFacts`. A gate either
//! requires its domain (with triggers), skips it (with a reason), or leaves it
//! not required. `GateDecision` can only be built through those three
//! constructors, so required-and-skipped is unrepresentable.

use procurement_types::{IntegrationType, RequestCategory, ReviewTrack};
use rust_decimal::Decimal;

use super::facts::RiskFacts;
use crate::format::{usd, usd_short};
use crate::policy::{LegalPolicy, Thresholds};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Required { triggers: Vec<String> },
    Skipped { reason: String },
    NotRequired,
}

impl GateDecision {
    fn from_triggers(triggers: Vec<String>, otherwise: GateDecision) -> Self {
        if triggers.is_empty() {
            otherwise
        } else {
            GateDecision::Required { triggers }
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, GateDecision::Required { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, GateDecision::Skipped { .. })
    }

    pub fn triggers(&self) -> &[String] {
        match self {
            GateDecision::Required { triggers } => triggers,
            _ => &[],
        }
    }

    pub fn skip_reason(&self) -> Option<&str> {
        match self {
            GateDecision::Skipped { reason } => Some(reason),
            _ => None,
        }
    }
}

pub const USE_CASE_CHANGED: &str = "Use case changed on pre-approved vendor";

// ============================================================================
// IT
// ============================================================================

pub fn it_review(facts: &RiskFacts) -> GateDecision {
    let mut triggers = Vec::new();

    if !facts.pre_approved_vendor {
        triggers.push("New vendor (not on pre-approved list)".to_string());
    }
    match facts.integration {
        IntegrationType::None => {}
        IntegrationType::Unrecognized => {
            tracing::warn!("Unrecognized integration type; routing as highest risk");
            triggers.push("Unrecognized integration type (treated as highest risk)".to_string());
        }
        other => triggers.push(format!("Integration: {}", other.label())),
    }
    if facts.pre_approved_vendor && facts.use_case_changed {
        triggers.push(USE_CASE_CHANGED.to_string());
    }
    triggers.extend(sensitive_data_triggers(facts));

    GateDecision::from_triggers(
        triggers,
        GateDecision::Skipped {
            reason: "Pre-approved vendor with no integration or use case changes".to_string(),
        },
    )
}

fn sensitive_data_triggers(facts: &RiskFacts) -> Vec<String> {
    let mut triggers = Vec::new();
    if facts.sensitive.phi {
        triggers.push("Sensitive data access: PHI".to_string());
    }
    if facts.sensitive.investment_data {
        triggers.push("Sensitive data access: investment data".to_string());
    }
    if facts.sensitive.pii {
        triggers.push("Sensitive data access: PII".to_string());
    }
    triggers
}

// ============================================================================
// COMPLIANCE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceDecision {
    pub gate: GateDecision,
    /// Set when the gate is required
    pub track: Option<ReviewTrack>,
}

pub fn compliance_review(facts: &RiskFacts, thresholds: &Thresholds) -> ComplianceDecision {
    let mut triggers = Vec::new();

    if facts.sensitive.phi {
        triggers.push("PHI access (HIPAA review)".to_string());
    }
    if facts.sensitive.investment_data {
        triggers.push("Investment data access".to_string());
    }
    if facts.sensitive.pii && facts.category == RequestCategory::Saas {
        if let Some(seats) = facts.seat_count {
            if seats > thresholds.large_scale_seat_threshold {
                triggers.push(format!(
                    "Large-scale PII: {} seats exceeds {}-seat threshold",
                    seats, thresholds.large_scale_seat_threshold
                ));
            }
        }
    }
    if !facts.pre_approved_vendor && facts.processes_data() {
        triggers.push("New vendor processing company data".to_string());
    }
    if facts.cross_border_data_storage {
        triggers.push("Cross-border data storage".to_string());
    }
    if !facts.healthcare_terms.is_empty() {
        triggers.push(format!(
            "Healthcare/FDA terms in description: {}",
            facts.healthcare_terms.join(", ")
        ));
    }
    let use_case_only = triggers.is_empty();
    if facts.pre_approved_vendor && facts.use_case_changed {
        triggers.push(USE_CASE_CHANGED.to_string());
    }

    if triggers.is_empty() {
        let reason = if facts.pre_approved_vendor && facts.request_type.is_renewal() {
            "Pre-approved vendor renewal, no changes"
        } else {
            "No regulated or sensitive data processing detected"
        };
        return ComplianceDecision {
            gate: GateDecision::Skipped {
                reason: reason.to_string(),
            },
            track: None,
        };
    }

    let track = if use_case_only {
        ReviewTrack::Expedited
    } else {
        ReviewTrack::Standard
    };
    ComplianceDecision {
        gate: GateDecision::Required { triggers },
        track: Some(track),
    }
}

// ============================================================================
// LEGAL
// ============================================================================

/// Legal review. Never required while the policy is disabled.
pub fn legal_review(facts: &RiskFacts, legal: &LegalPolicy) -> GateDecision {
    if !legal.enabled {
        return GateDecision::NotRequired;
    }

    let mut triggers = Vec::new();
    if !facts.contract_term.is_short_commitment() && facts.amount > legal.multi_year_threshold {
        triggers.push(format!(
            "Multi-year commitment above {}",
            usd(legal.multi_year_threshold)
        ));
    }
    GateDecision::from_triggers(triggers, GateDecision::NotRequired)
}

// ============================================================================
// FINANCE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinanceDecision {
    pub auto_approved: bool,
    /// Every finance condition that fired, highest priority first
    pub triggers: Vec<String>,
    pub over_budget: bool,
}

impl FinanceDecision {
    pub fn reason(&self) -> Option<&str> {
        self.triggers.first().map(String::as_str)
    }
}

/// Auto-approval holds only when no condition fires, so it cannot coexist
/// with an amount at or above the limit.
pub fn finance_approval(facts: &RiskFacts, thresholds: &Thresholds) -> FinanceDecision {
    let mut triggers = Vec::new();

    let limit = thresholds.finance_auto_approve_limit;
    if facts.amount >= limit {
        triggers.push(format!(
            "Amount {} is at or above the {} auto-approval limit",
            usd(facts.amount),
            usd(limit)
        ));
    }

    let over_budget = !facts.within_budget();
    if over_budget {
        triggers.push(format!(
            "Over-budget exception: {} requested against {} remaining",
            usd(facts.amount),
            usd(facts.budget_remaining)
        ));
    }

    if !facts.contract_term.is_short_commitment() {
        triggers.push(format!(
            "Multi-year commitment ({})",
            facts.contract_term.label()
        ));
    }

    FinanceDecision {
        auto_approved: triggers.is_empty(),
        triggers,
        over_budget,
    }
}

/// Reason text for an auto-approved finance step
pub fn finance_auto_approval_note(thresholds: &Thresholds) -> String {
    format!(
        "Auto-approved: under {}, within budget, single-year term",
        usd_short(thresholds.finance_auto_approve_limit)
    )
}

// ============================================================================
// CIO
// ============================================================================

/// CIO approval. Absent (not skipped) when no trigger fires.
pub fn cio_approval(facts: &RiskFacts, thresholds: &Thresholds) -> GateDecision {
    let mut triggers = Vec::new();

    if facts.amount > thresholds.cio_amount_threshold {
        triggers.push(format!(
            "Amount {} exceeds {} CIO threshold",
            usd(facts.amount),
            usd(thresholds.cio_amount_threshold)
        ));
    }
    if facts.ai_ml {
        triggers.push("AI/ML capabilities detected".to_string());
    }
    if facts.portfolio_access {
        triggers.push("Portfolio company access detected".to_string());
    }
    if facts.sensitive.phi {
        triggers.push("PHI access".to_string());
    }
    if facts.sensitive.investment_data {
        triggers.push("Investment data access".to_string());
    }
    match facts.integration {
        IntegrationType::CoreSystem => triggers.push("Core system integration".to_string()),
        IntegrationType::Unrecognized => triggers
            .push("Unrecognized integration type (treated as core system)".to_string()),
        _ => {}
    }

    GateDecision::from_triggers(triggers, GateDecision::NotRequired)
}

// ============================================================================
// NEGOTIATION
// ============================================================================

pub fn negotiation(amount: Decimal, thresholds: &Thresholds) -> GateDecision {
    let threshold = thresholds.negotiation_threshold;
    if amount > threshold {
        GateDecision::Required {
            triggers: vec![format!(
                "Amount {} exceeds {} negotiation threshold",
                usd(amount),
                usd(threshold)
            )],
        }
    } else {
        GateDecision::Skipped {
            reason: format!("Under {} threshold", usd_short(threshold)),
        }
    }
}
