//! Risk scoring
//!
//! Score = amount band points + fixed points per active factor, clamped to
//! 0..=100. Purely additive, so enabling a factor never lowers the score.

use procurement_types::IntegrationType;

use super::facts::RiskFacts;
use crate::policy::ScoringWeights;

pub const MAX_SCORE: u8 = 100;

/// One contribution to the score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreComponent {
    pub factor: &'static str,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub components: Vec<ScoreComponent>,
    /// Clamped total
    pub total: u8,
}

pub fn score(weights: &ScoringWeights, facts: &RiskFacts) -> ScoreBreakdown {
    let mut components = vec![ScoreComponent {
        factor: "amount",
        points: weights.amount_points(facts.amount),
    }];

    let mut add = |active: bool, factor: &'static str, points: u32| {
        if active && points > 0 {
            components.push(ScoreComponent { factor, points });
        }
    };

    add(facts.ai_ml, "ai_ml", weights.ai_ml);
    add(
        facts.portfolio_access,
        "portfolio_access",
        weights.portfolio_access,
    );
    add(facts.sensitive.phi, "phi", weights.phi);
    add(
        facts.sensitive.investment_data,
        "investment_data",
        weights.investment_data,
    );
    add(facts.sensitive.pii, "pii", weights.pii);
    add(
        facts.integration != IntegrationType::None,
        "integration",
        weights.integration.weight(facts.integration),
    );
    add(
        facts.requires_custom_development,
        "custom_development",
        weights.custom_development,
    );
    add(
        facts.requires_data_storage,
        "data_storage",
        weights.data_storage,
    );
    add(
        facts.requires_network_access,
        "network_access",
        weights.network_access,
    );
    add(
        facts.cross_border_data_storage,
        "cross_border",
        weights.cross_border,
    );

    let sum = components
        .iter()
        .map(|c| c.points)
        .fold(0u32, u32::saturating_add);
    ScoreBreakdown {
        components,
        total: sum.min(u32::from(MAX_SCORE)) as u8,
    }
}
