//! Risk factor extraction
//!
//! Derives implicit signals from free text and the vendor name. Signals are
//! advisory: explicit answers on the request always take precedence (see
//! `assessment::facts`).

use procurement_types::RequestAttributes;
use serde::Serialize;

use crate::policy::RoutingPolicy;

/// Signals found in request text
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExtractedSignals {
    pub ai_ml_detected: bool,
    pub portfolio_access_detected: bool,
    pub is_pre_approved_vendor: bool,
    pub ai_ml_terms: Vec<String>,
    pub portfolio_terms: Vec<String>,
    pub healthcare_terms: Vec<String>,
    /// Registry entry the vendor name matched
    pub matched_vendor: Option<String>,
}

/// Scan `text` against the keyword vocabularies and `vendor_name` against the
/// pre-approved registry. The vendor name is scanned for keywords too.
pub fn extract(policy: &RoutingPolicy, text: &str, vendor_name: &str) -> ExtractedSignals {
    let haystack = format!("{text}\n{vendor_name}");

    let ai_ml_terms = policy.ai_ml().matches(&haystack);
    let portfolio_terms = policy.portfolio().matches(&haystack);
    let healthcare_terms = policy.healthcare().matches(&haystack);
    let matched_vendor = policy.vendors().lookup(vendor_name).map(str::to_string);

    ExtractedSignals {
        ai_ml_detected: !ai_ml_terms.is_empty(),
        portfolio_access_detected: !portfolio_terms.is_empty(),
        is_pre_approved_vendor: matched_vendor.is_some(),
        ai_ml_terms,
        portfolio_terms,
        healthcare_terms,
        matched_vendor,
    }
}

/// Extract from a request's description, use-case change note and vendor name
pub fn extract_from_request(policy: &RoutingPolicy, attrs: &RequestAttributes) -> ExtractedSignals {
    let text = if attrs.use_case_change_description.trim().is_empty() {
        attrs.description.clone()
    } else {
        format!(
            "{}\n{}",
            attrs.description, attrs.use_case_change_description
        )
    };
    extract(policy, &text, &attrs.vendor_name)
}
