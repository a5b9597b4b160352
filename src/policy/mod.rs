//! Routing policy tables
//!
//! Every threshold, keyword list, registry and display table the engine
//! consults. `PolicyConfig` is the serde form loaded from YAML; `RoutingPolicy`
//! is the validated, compiled form the engine reads.
//!
//! `PolicyConfig::default()` carries the documented constants, so a missing
//! policy file is never an error.

mod compiled;
mod loader;

pub use compiled::{RoutingPolicy, VendorRegistry, Vocabulary};
pub use loader::ConfigLoader;

use procurement_types::{Approver, IntegrationType, StepId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{RoutingError, RoutingResult};

/// Complete routing policy as loaded from `routing_policy.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PolicyConfig {
    pub vocabularies: Vocabularies,
    pub vendors: VendorPolicy,
    pub thresholds: Thresholds,
    pub scoring: ScoringWeights,
    pub tiers: TierTable,
    pub legal: LegalPolicy,
    /// Remaining budget per department, used when a request carries none
    pub department_budgets: BTreeMap<String, Decimal>,
    pub sla_hours: SlaHours,
    pub approvers: ApproverDirectory,
}

impl PolicyConfig {
    /// Check structural invariants the engine relies on
    pub fn validate(&self) -> RoutingResult<()> {
        self.scoring.validate()?;
        self.tiers.validate()?;
        self.vendors.validate()?;
        Ok(())
    }
}

// ============================================================================
// KEYWORDS AND VENDORS
// ============================================================================

/// Keyword vocabularies scanned against description and vendor text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabularies {
    pub ai_ml: Vec<String>,
    pub portfolio: Vec<String>,
    /// Healthcare and FDA terms; any hit requires compliance review
    pub healthcare: Vec<String>,
}

impl Default for Vocabularies {
    fn default() -> Self {
        Self {
            ai_ml: strings(&[
                "ai",
                "artificial intelligence",
                "machine learning",
                "ml",
                "llm",
                "large language model",
                "gpt",
                "chatgpt",
                "openai",
                "generative",
                "genai",
                "gen ai",
                "neural network",
                "deep learning",
                "predictive model",
                "natural language processing",
                "nlp",
                "computer vision",
                "chatbot",
                "copilot",
            ]),
            portfolio: strings(&[
                "portfolio company",
                "portfolio companies",
                "portco",
                "portcos",
                "portfolio network",
                "portfolio networks",
                "portfolio staff",
                "portfolio data",
                "operating partner",
            ]),
            healthcare: strings(&[
                "healthcare",
                "health care",
                "hipaa",
                "fda",
                "clinical",
                "patient",
                "medical device",
                "ehr",
            ]),
        }
    }
}

/// How vendor names are matched against the pre-approved registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorMatchMode {
    /// Case-insensitive containment in either direction
    #[default]
    Substring,
    /// Case-insensitive equality after trimming
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorPolicy {
    pub pre_approved: Vec<String>,
    pub match_mode: VendorMatchMode,
    /// Shorter side of a substring match must have at least this many characters
    pub min_match_len: usize,
}

impl Default for VendorPolicy {
    fn default() -> Self {
        Self {
            pre_approved: strings(&[
                "Microsoft",
                "Salesforce",
                "Slack",
                "Zoom",
                "Atlassian",
                "DocuSign",
                "Adobe",
                "Google Workspace",
                "Workday",
                "Okta",
                "Box",
                "Dropbox",
            ]),
            match_mode: VendorMatchMode::Substring,
            min_match_len: 3,
        }
    }
}

impl VendorPolicy {
    fn validate(&self) -> RoutingResult<()> {
        if self.min_match_len == 0 {
            return Err(RoutingError::InvalidPolicy(
                "vendors.min_match_len must be at least 1".to_string(),
            ));
        }
        if self.pre_approved.iter().any(|v| v.trim().is_empty()) {
            return Err(RoutingError::InvalidPolicy(
                "vendors.pre_approved contains an empty name".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Canonical dollar and seat thresholds.
/// Every consumer reads these; nothing re-derives them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Finance auto-approval requires the amount to be strictly below this
    pub finance_auto_approve_limit: Decimal,
    /// Negotiation is required strictly above this
    pub negotiation_threshold: Decimal,
    /// CIO approval is required strictly above this
    pub cio_amount_threshold: Decimal,
    /// SaaS seat count above which PII access counts as large-scale
    pub large_scale_seat_threshold: u32,
    /// Remaining budget assumed when neither the request nor the registry has one
    pub fallback_budget_remaining: Decimal,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            finance_auto_approve_limit: Decimal::new(10_000, 0),
            negotiation_threshold: Decimal::new(25_000, 0),
            cio_amount_threshold: Decimal::new(50_000, 0),
            large_scale_seat_threshold: 100,
            fallback_budget_remaining: Decimal::new(250_000, 0),
        }
    }
}

// ============================================================================
// SCORING
// ============================================================================

/// Base points for amounts at or above `min`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBand {
    pub min: Decimal,
    pub points: u32,
}

/// Points added per active risk factor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Ascending by `min`; the first band must start at zero
    pub amount_bands: Vec<AmountBand>,
    pub ai_ml: u32,
    pub portfolio_access: u32,
    pub phi: u32,
    pub investment_data: u32,
    pub pii: u32,
    pub custom_development: u32,
    pub data_storage: u32,
    pub network_access: u32,
    pub cross_border: u32,
    pub integration: IntegrationWeights,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            amount_bands: vec![
                AmountBand {
                    min: Decimal::ZERO,
                    points: 0,
                },
                AmountBand {
                    min: Decimal::new(10_000, 0),
                    points: 10,
                },
                AmountBand {
                    min: Decimal::new(25_000, 0),
                    points: 20,
                },
                AmountBand {
                    min: Decimal::new(50_000, 0),
                    points: 30,
                },
            ],
            ai_ml: 20,
            portfolio_access: 20,
            phi: 15,
            investment_data: 15,
            pii: 10,
            custom_development: 5,
            data_storage: 3,
            network_access: 5,
            cross_border: 5,
            integration: IntegrationWeights::default(),
        }
    }
}

impl ScoringWeights {
    fn validate(&self) -> RoutingResult<()> {
        match self.amount_bands.first() {
            Some(first) if first.min == Decimal::ZERO => {}
            _ => {
                return Err(RoutingError::InvalidPolicy(
                    "scoring.amount_bands must start at 0".to_string(),
                ))
            }
        }
        if self.amount_bands.windows(2).any(|w| w[0].min >= w[1].min) {
            return Err(RoutingError::InvalidPolicy(
                "scoring.amount_bands must be strictly ascending".to_string(),
            ));
        }
        if self.amount_bands.windows(2).any(|w| w[0].points > w[1].points) {
            return Err(RoutingError::InvalidPolicy(
                "scoring.amount_bands points must not decrease".to_string(),
            ));
        }
        Ok(())
    }

    /// Base points for an amount
    pub fn amount_points(&self, amount: Decimal) -> u32 {
        self.amount_bands
            .iter()
            .rev()
            .find(|band| amount >= band.min)
            .map(|band| band.points)
            .unwrap_or(0)
    }
}

/// Risk weight per integration type.
/// `unrecognized` must be the highest weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationWeights {
    pub none: u32,
    pub sso_only: u32,
    pub read_only_api: u32,
    pub bidirectional_api: u32,
    pub core_system: u32,
    pub network_vpn: u32,
    pub not_sure: u32,
    pub unrecognized: u32,
}

impl Default for IntegrationWeights {
    fn default() -> Self {
        Self {
            none: 0,
            sso_only: 3,
            read_only_api: 5,
            bidirectional_api: 8,
            core_system: 10,
            network_vpn: 10,
            not_sure: 7,
            unrecognized: 10,
        }
    }
}

impl IntegrationWeights {
    pub fn weight(&self, integration: IntegrationType) -> u32 {
        match integration {
            IntegrationType::None => self.none,
            IntegrationType::SsoOnly => self.sso_only,
            IntegrationType::ReadOnlyApi => self.read_only_api,
            IntegrationType::BidirectionalApi => self.bidirectional_api,
            IntegrationType::CoreSystem => self.core_system,
            IntegrationType::NetworkVpn => self.network_vpn,
            IntegrationType::NotSure => self.not_sure,
            IntegrationType::Unrecognized => self.max_weight(),
        }
    }

    fn max_weight(&self) -> u32 {
        [
            self.none,
            self.sso_only,
            self.read_only_api,
            self.bidirectional_api,
            self.core_system,
            self.network_vpn,
            self.not_sure,
            self.unrecognized,
        ]
        .into_iter()
        .max()
        .unwrap_or(self.unrecognized)
    }
}

// ============================================================================
// TIERS
// ============================================================================

/// One score band of the tier table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBand {
    pub level: u8,
    /// Lowest score (inclusive) in this tier
    pub min_score: u8,
    pub label: String,
    pub description: String,
}

/// Five contiguous bands covering 0..=100
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierTable(pub Vec<TierBand>);

impl Default for TierTable {
    fn default() -> Self {
        let band = |level, min_score, label: &str, description: &str| TierBand {
            level,
            min_score,
            label: label.to_string(),
            description: description.to_string(),
        };
        Self(vec![
            band(
                0,
                0,
                "Minimal",
                "Routine purchase; standard departmental approval",
            ),
            band(
                1,
                15,
                "Low",
                "Limited exposure; targeted review where triggered",
            ),
            band(
                2,
                35,
                "Moderate",
                "Material spend or data exposure; cross-functional review",
            ),
            band(
                3,
                55,
                "High",
                "Significant spend, data or AI exposure; executive visibility",
            ),
            band(
                4,
                75,
                "Critical",
                "Maximum exposure; full review by every approving function",
            ),
        ])
    }
}

impl TierTable {
    fn validate(&self) -> RoutingResult<()> {
        let bands = &self.0;
        if bands.len() != 5 {
            return Err(RoutingError::InvalidPolicy(format!(
                "tiers must define exactly 5 bands, found {}",
                bands.len()
            )));
        }
        if bands[0].min_score != 0 {
            return Err(RoutingError::InvalidPolicy(
                "tiers must start at score 0".to_string(),
            ));
        }
        for (index, band) in bands.iter().enumerate() {
            if usize::from(band.level) != index {
                return Err(RoutingError::InvalidPolicy(format!(
                    "tier at position {} has level {}",
                    index, band.level
                )));
            }
            if band.min_score > 100 {
                return Err(RoutingError::InvalidPolicy(format!(
                    "tier {} starts above 100",
                    band.level
                )));
            }
            if band.label.trim().is_empty() {
                return Err(RoutingError::InvalidPolicy(format!(
                    "tier {} has an empty label",
                    band.level
                )));
            }
        }
        if bands.windows(2).any(|w| w[0].min_score >= w[1].min_score) {
            return Err(RoutingError::InvalidPolicy(
                "tier bands must be strictly ascending".to_string(),
            ));
        }
        Ok(())
    }

    /// Band containing `score`
    pub fn band_for(&self, score: u8) -> &TierBand {
        self.0
            .iter()
            .rev()
            .find(|band| score >= band.min_score)
            .unwrap_or(&self.0[0])
    }
}

// ============================================================================
// LEGAL
// ============================================================================

/// Legal review gate.
///
/// Disabled by default: until a Legal policy is agreed, Legal is never
/// required. When enabled, multi-year commitments above the threshold require
/// Legal review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalPolicy {
    pub enabled: bool,
    pub multi_year_threshold: Decimal,
}

impl Default for LegalPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            multi_year_threshold: Decimal::new(100_000, 0),
        }
    }
}

// ============================================================================
// SLA AND APPROVERS
// ============================================================================

/// SLA hours copied onto rendered steps. Descriptive only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaHours {
    pub department_pre_approval: u32,
    pub compliance_standard: u32,
    pub compliance_expedited: u32,
    pub it_review: u32,
    pub negotiation: u32,
    pub finance_final_approval: u32,
    pub department_final_approval: u32,
    pub cio_approval: u32,
    pub contracting: u32,
}

impl Default for SlaHours {
    fn default() -> Self {
        Self {
            department_pre_approval: 48,
            compliance_standard: 168,
            compliance_expedited: 72,
            it_review: 120,
            negotiation: 120,
            finance_final_approval: 48,
            department_final_approval: 48,
            cio_approval: 72,
            contracting: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproverDirectory {
    pub steps: BTreeMap<StepId, Approver>,
    /// Takes over the contracting step when Legal review is required
    pub legal: Approver,
}

impl Default for ApproverDirectory {
    fn default() -> Self {
        let steps = [
            (
                StepId::DepartmentPreApproval,
                Approver::new("Department Manager", "Manager"),
            ),
            (
                StepId::ComplianceReview,
                Approver::new("Compliance Office", "Compliance"),
            ),
            (StepId::ItReview, Approver::new("IT Security", "IT")),
            (
                StepId::Negotiation,
                Approver::new("Strategic Sourcing", "Procurement"),
            ),
            (
                StepId::FinanceFinalApproval,
                Approver::new("Finance Controller", "Finance"),
            ),
            (
                StepId::DepartmentFinalApproval,
                Approver::new("Department Head", "Department Head"),
            ),
            (StepId::CioApproval, Approver::new("Office of the CIO", "CIO")),
            (
                StepId::Contracting,
                Approver::new("Procurement Contracts", "Contracting"),
            ),
        ]
        .into_iter()
        .collect();

        Self {
            steps,
            legal: Approver::new("Legal Counsel", "Legal"),
        }
    }
}

impl ApproverDirectory {
    pub fn for_step(&self, step: StepId) -> Option<&Approver> {
        self.steps.get(&step)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
