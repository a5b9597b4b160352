//! Risk Assessment Engine
//!
//! `assess` is a pure function of the request and the policy: score, tier,
//! per-approver gates, audit trail and approval path.

pub mod facts;
pub mod gates;
pub mod scoring;

use procurement_types::{path_labels, RequestAttributes, RiskAssessment, RiskTier};

use crate::extractor;
use crate::policy::RoutingPolicy;
use facts::RiskFacts;
use gates::{ComplianceDecision, FinanceDecision, GateDecision};

pub const MANAGER_REASON: &str = "All purchase requests require department manager approval";

/// Every gate outcome for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcomes {
    pub compliance: ComplianceDecision,
    pub it: GateDecision,
    pub negotiation: GateDecision,
    pub finance: FinanceDecision,
    pub cio: GateDecision,
    pub legal: GateDecision,
}

impl GateOutcomes {
    pub fn evaluate(policy: &RoutingPolicy, facts: &RiskFacts) -> Self {
        let config = policy.config();
        let thresholds = &config.thresholds;
        Self {
            compliance: gates::compliance_review(facts, thresholds),
            it: gates::it_review(facts),
            negotiation: gates::negotiation(facts.amount, thresholds),
            finance: gates::finance_approval(facts, thresholds),
            cio: gates::cio_approval(facts, thresholds),
            legal: gates::legal_review(facts, &config.legal),
        }
    }

    /// Approval-path labels in canonical workflow order
    pub fn approval_path(&self) -> Vec<String> {
        let mut path = vec![path_labels::MANAGER];
        if self.compliance.gate.is_required() {
            path.push(path_labels::COMPLIANCE);
        }
        if self.it.is_required() {
            path.push(path_labels::IT);
        }
        if self.negotiation.is_required() {
            path.push(path_labels::NEGOTIATION);
        }
        path.push(if self.finance.auto_approved {
            path_labels::FINANCE_AUTO
        } else {
            path_labels::FINANCE
        });
        // Department re-approves only when negotiation can move the price
        if self.negotiation.is_required() {
            path.push(path_labels::DEPARTMENT_FINAL);
        }
        if self.cio.is_required() {
            path.push(path_labels::CIO);
        }
        path.push(if self.legal.is_required() {
            path_labels::LEGAL_CONTRACTING
        } else {
            path_labels::CONTRACTING
        });
        path.into_iter().map(str::to_string).collect()
    }

    /// Flattened audit trail, in canonical workflow order
    pub fn routing_reasons(&self, policy: &RoutingPolicy) -> Vec<String> {
        let mut reasons = vec![format!("Manager: {MANAGER_REASON}")];

        push_gate(&mut reasons, "Compliance", &self.compliance.gate);
        if let Some(track) = self.compliance.track {
            reasons.push(format!("Compliance: {}", track.sla_note()));
        }
        push_gate(&mut reasons, "IT", &self.it);
        push_gate(&mut reasons, "Negotiation", &self.negotiation);

        if self.finance.auto_approved {
            reasons.push(format!(
                "Finance: {}",
                gates::finance_auto_approval_note(&policy.config().thresholds)
            ));
        } else {
            reasons.extend(self.finance.triggers.iter().map(|t| format!("Finance: {t}")));
        }

        push_gate(&mut reasons, "CIO", &self.cio);
        push_gate(&mut reasons, "Legal", &self.legal);
        reasons
    }
}

fn push_gate(reasons: &mut Vec<String>, domain: &str, gate: &GateDecision) {
    match gate {
        GateDecision::Required { triggers } => {
            reasons.extend(triggers.iter().map(|t| format!("{domain}: {t}")));
        }
        GateDecision::Skipped { reason } => reasons.push(format!("{domain} skipped: {reason}")),
        GateDecision::NotRequired => {}
    }
}

/// Assess a request against the policy
pub fn assess(policy: &RoutingPolicy, attrs: &RequestAttributes) -> RiskAssessment {
    let signals = extractor::extract_from_request(policy, attrs);
    let facts = RiskFacts::derive(policy, attrs, &signals);
    let config = policy.config();

    let breakdown = scoring::score(&config.scoring, &facts);
    let band = config.tiers.band_for(breakdown.total);
    let outcomes = GateOutcomes::evaluate(policy, &facts);

    tracing::debug!(
        score = breakdown.total,
        tier = band.level,
        vendor = %attrs.vendor_name,
        "Assessed procurement request"
    );

    let approval_path = outcomes.approval_path();
    let routing_reasons = outcomes.routing_reasons(policy);
    let GateOutcomes {
        compliance,
        it,
        negotiation,
        finance,
        cio,
        legal,
    } = outcomes;

    RiskAssessment {
        tier: RiskTier {
            level: band.level,
            label: band.label.clone(),
            description: band.description.clone(),
        },
        risk_score: breakdown.total,

        ai_ml_detected: facts.ai_ml,
        portfolio_access_detected: facts.portfolio_access,
        is_pre_approved_vendor: facts.pre_approved_vendor,

        requires_manager: true,

        requires_it: it.is_required(),
        it_skipped: it.is_skipped(),
        it_skip_reason: it.skip_reason().map(str::to_string),
        it_triggers: it.triggers().to_vec(),

        requires_compliance: compliance.gate.is_required(),
        compliance_skipped: compliance.gate.is_skipped(),
        compliance_skip_reason: compliance.gate.skip_reason().map(str::to_string),
        compliance_triggers: compliance.gate.triggers().to_vec(),
        compliance_review_track: compliance.track,

        requires_legal: legal.is_required(),
        legal_triggers: legal.triggers().to_vec(),

        requires_finance: !finance.auto_approved,
        finance_auto_approved: finance.auto_approved,
        finance_reason: finance.reason().map(str::to_string),
        over_budget: finance.over_budget,
        finance_triggers: finance.triggers,

        requires_negotiation: negotiation.is_required(),
        negotiation_reason: match &negotiation {
            GateDecision::Required { triggers } => triggers.join("; "),
            GateDecision::Skipped { reason } => reason.clone(),
            GateDecision::NotRequired => String::new(),
        },

        requires_cio: cio.is_required(),
        cio_triggers: cio.triggers().to_vec(),

        requires_parallel_it_compliance: it.is_required() && compliance.gate.is_required(),

        routing_reasons,
        approval_path,
    }
}
