//! Compiled routing policy
//!
//! Loaded once at startup and read-only afterwards.

use regex::{Regex, RegexBuilder};
use std::sync::{Arc, OnceLock};

use super::{PolicyConfig, VendorMatchMode, VendorPolicy};
use crate::error::{RoutingError, RoutingResult};

static GLOBAL_POLICY: OnceLock<Arc<RoutingPolicy>> = OnceLock::new();

/// Validated policy with compiled keyword matchers
#[derive(Debug)]
pub struct RoutingPolicy {
    config: PolicyConfig,
    ai_ml: Vocabulary,
    portfolio: Vocabulary,
    healthcare: Vocabulary,
    vendors: VendorRegistry,
}

impl RoutingPolicy {
    pub fn from_config(config: PolicyConfig) -> RoutingResult<Self> {
        config.validate()?;
        Ok(Self {
            ai_ml: Vocabulary::compile("ai_ml", &config.vocabularies.ai_ml)?,
            portfolio: Vocabulary::compile("portfolio", &config.vocabularies.portfolio)?,
            healthcare: Vocabulary::compile("healthcare", &config.vocabularies.healthcare)?,
            vendors: VendorRegistry::new(&config.vendors),
            config,
        })
    }

    /// Policy built from `PolicyConfig::default()`
    pub fn builtin() -> Self {
        Self::from_config(PolicyConfig::default()).expect("built-in routing policy is valid")
    }

    /// Install the process-wide policy. Only the first call takes effect;
    /// returns false if a policy was already installed.
    pub fn install(policy: RoutingPolicy) -> bool {
        let installed = GLOBAL_POLICY.set(Arc::new(policy)).is_ok();
        if !installed {
            tracing::warn!("Routing policy already installed; ignoring replacement");
        }
        installed
    }

    /// The process-wide policy, or the built-in one if none was installed
    pub fn global() -> Arc<RoutingPolicy> {
        GLOBAL_POLICY
            .get_or_init(|| {
                tracing::info!("No routing policy installed; using built-in defaults");
                Arc::new(Self::builtin())
            })
            .clone()
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn ai_ml(&self) -> &Vocabulary {
        &self.ai_ml
    }

    pub fn portfolio(&self) -> &Vocabulary {
        &self.portfolio
    }

    pub fn healthcare(&self) -> &Vocabulary {
        &self.healthcare
    }

    pub fn vendors(&self) -> &VendorRegistry {
        &self.vendors
    }
}

/// A keyword list compiled to one case-insensitive pattern.
///
/// Terms must start on a word boundary ("email" never matches "ai") and may
/// carry a plural suffix, so "LLMs" and "patients" match "llm" and "patient".
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pattern: Option<Regex>,
}

impl Vocabulary {
    pub fn compile(name: &str, terms: &[String]) -> RoutingResult<Self> {
        let alternatives: Vec<String> = terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&format!(r"\b({})(?:s|es)?\b", alternatives.join("|")))
            .case_insensitive(true)
            .build()
            .map_err(|source| RoutingError::Vocabulary {
                name: name.to_string(),
                source,
            })?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Distinct matched terms, lowercased and without plural suffix, in order
    /// of first appearance
    pub fn matches(&self, text: &str) -> Vec<String> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        let mut found: Vec<String> = Vec::new();
        for caps in pattern.captures_iter(text) {
            let Some(m) = caps.get(1) else {
                continue;
            };
            let term = m.as_str().to_lowercase();
            if !found.contains(&term) {
                found.push(term);
            }
        }
        found
    }
}

/// Pre-approved vendor registry.
///
/// Substring mode matches when either name contains the other, so a short
/// registry entry like "Box" also matches "Dropbox Business". This is a known
/// imprecision of the registry; `min_match_len` bounds it and `exact` mode
/// removes it.
#[derive(Debug, Clone)]
pub struct VendorRegistry {
    /// (display name, normalized name)
    entries: Vec<(String, String)>,
    mode: VendorMatchMode,
    min_match_len: usize,
}

impl VendorRegistry {
    pub fn new(policy: &VendorPolicy) -> Self {
        Self {
            entries: policy
                .pre_approved
                .iter()
                .map(|name| (name.trim().to_string(), normalize(name)))
                .collect(),
            mode: policy.match_mode,
            min_match_len: policy.min_match_len,
        }
    }

    /// First registry entry matching `vendor_name`
    pub fn lookup(&self, vendor_name: &str) -> Option<&str> {
        let vendor = normalize(vendor_name);
        if vendor.is_empty() {
            return None;
        }

        self.entries
            .iter()
            .find(|(_, entry)| match self.mode {
                VendorMatchMode::Exact => *entry == vendor,
                VendorMatchMode::Substring => {
                    (vendor.contains(entry.as_str())
                        && entry.chars().count() >= self.min_match_len)
                        || (entry.contains(vendor.as_str())
                            && vendor.chars().count() >= self.min_match_len)
                }
            })
            .map(|(display, _)| display.as_str())
    }

}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
