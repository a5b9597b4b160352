//! Normalized request facts
//!
//! One place where explicit answers, extracted signals and policy fallbacks
//! are reconciled. Every gate reads `RiskFacts`, never the raw request.

use procurement_types::{
    ContractTerm, IntegrationType, RequestAttributes, RequestCategory, RequestType,
    SensitiveDataAccess,
};
use rust_decimal::Decimal;

use crate::extractor::ExtractedSignals;
use crate::policy::RoutingPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskFacts {
    /// Never negative
    pub amount: Decimal,
    pub budget_remaining: Decimal,
    pub budget_from_fallback: bool,
    pub request_type: RequestType,
    pub category: RequestCategory,
    pub contract_term: ContractTerm,
    pub integration: IntegrationType,
    pub ai_ml: bool,
    pub portfolio_access: bool,
    pub pre_approved_vendor: bool,
    pub use_case_changed: bool,
    pub sensitive: SensitiveDataAccess,
    pub requires_data_storage: bool,
    pub requires_network_access: bool,
    pub requires_custom_development: bool,
    pub cross_border_data_storage: bool,
    pub seat_count: Option<u32>,
    pub healthcare_terms: Vec<String>,
}

impl RiskFacts {
    pub fn derive(
        policy: &RoutingPolicy,
        attrs: &RequestAttributes,
        signals: &ExtractedSignals,
    ) -> Self {
        let factors = &attrs.risk_factors;
        let (budget_remaining, budget_from_fallback) = resolve_budget(policy, attrs);

        Self {
            amount: attrs.amount.max(Decimal::ZERO),
            budget_remaining,
            budget_from_fallback,
            request_type: attrs.request_type,
            category: attrs.category,
            contract_term: attrs.contract_term,
            integration: factors.integration_type,
            ai_ml: explicit_or_detected(
                &[
                    factors.has_ai_ml_capabilities,
                    factors.has_llm_api_access,
                    factors.uses_ml_for_analysis,
                ],
                signals.ai_ml_detected,
            ),
            portfolio_access: explicit_or_detected(
                &[
                    factors.has_portfolio_company_access,
                    factors.integrates_with_portfolio_networks,
                    factors.used_by_portfolio_staff,
                ],
                signals.portfolio_access_detected,
            ),
            pre_approved_vendor: signals.is_pre_approved_vendor,
            use_case_changed: attrs.use_case_changed,
            sensitive: factors.sensitive_data_access,
            requires_data_storage: factors.requires_data_storage,
            requires_network_access: factors.requires_network_access,
            requires_custom_development: factors.requires_custom_development,
            cross_border_data_storage: factors.cross_border_data_storage,
            seat_count: attrs.seat_count,
            healthcare_terms: signals.healthcare_terms.clone(),
        }
    }

    /// The vendor will hold or read company data
    pub fn processes_data(&self) -> bool {
        self.requires_data_storage || self.sensitive.any() || self.integration.touches_data()
    }

    pub fn within_budget(&self) -> bool {
        self.amount <= self.budget_remaining
    }
}

/// Any explicit yes wins. Otherwise an explicit no on any question suppresses
/// detection. Only when every question is unanswered does detection decide.
fn explicit_or_detected(answers: &[Option<bool>], detected: bool) -> bool {
    if answers.iter().any(|a| *a == Some(true)) {
        true
    } else if answers.iter().any(Option::is_some) {
        false
    } else {
        detected
    }
}

/// Request value, then the department registry, then the fallback constant
fn resolve_budget(policy: &RoutingPolicy, attrs: &RequestAttributes) -> (Decimal, bool) {
    if let Some(remaining) = attrs.department_budget_remaining {
        return (remaining, false);
    }
    let config = policy.config();
    match config.department_budgets.get(attrs.department.trim()) {
        Some(remaining) => (*remaining, false),
        None => {
            tracing::debug!(
                department = %attrs.department,
                "No remaining budget on record; using fallback"
            );
            (config.thresholds.fallback_budget_remaining, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor;

    fn facts(attrs: &RequestAttributes) -> RiskFacts {
        let policy = RoutingPolicy::builtin();
        let signals = extractor::extract_from_request(&policy, attrs);
        RiskFacts::derive(&policy, attrs, &signals)
    }

    #[test]
    fn test_explicit_no_overrides_detection() {
        let mut attrs = RequestAttributes {
            description: "Chatbot for the help desk".into(),
            ..Default::default()
        };
        assert!(facts(&attrs).ai_ml);

        attrs.risk_factors.has_ai_ml_capabilities = Some(false);
        assert!(!facts(&attrs).ai_ml);
    }

    #[test]
    fn test_any_explicit_yes_wins() {
        let mut attrs = RequestAttributes::default();
        attrs.risk_factors.has_ai_ml_capabilities = Some(false);
        attrs.risk_factors.has_llm_api_access = Some(true);
        assert!(facts(&attrs).ai_ml);

        attrs.risk_factors.used_by_portfolio_staff = Some(true);
        assert!(facts(&attrs).portfolio_access);
    }

    #[test]
    fn test_budget_resolution_order() {
        let policy = RoutingPolicy::from_config(crate::policy::PolicyConfig {
            department_budgets: [("Marketing".to_string(), Decimal::new(8_000, 0))]
                .into_iter()
                .collect(),
            ..Default::default()
        })
        .unwrap();

        let mut attrs = RequestAttributes {
            department: "Marketing".into(),
            ..Default::default()
        };
        assert_eq!(
            resolve_budget(&policy, &attrs),
            (Decimal::new(8_000, 0), false)
        );

        attrs.department_budget_remaining = Some(Decimal::new(1_000, 0));
        assert_eq!(
            resolve_budget(&policy, &attrs),
            (Decimal::new(1_000, 0), false)
        );

        attrs.department_budget_remaining = None;
        attrs.department = "Facilities".into();
        assert_eq!(
            resolve_budget(&policy, &attrs),
            (Decimal::new(250_000, 0), true)
        );
    }

    #[test]
    fn test_negative_amount_clamped() {
        let attrs = RequestAttributes {
            amount: Decimal::new(-500, 0),
            ..Default::default()
        };
        assert_eq!(facts(&attrs).amount, Decimal::ZERO);
    }
}
