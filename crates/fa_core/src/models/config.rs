//! Strategy configuration consumed per analysis call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::i18n::Lang;

/// Explanation style for the hard-rule audit pipeline.
///
/// `Auto` resolves to `Short` on the mobile device hint, else `Long`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationStyle {
    Auto,
    Short,
    Long,
}

/// Immutable configuration for one analysis call.
///
/// Out-of-range values are not validated: thresholds and budgets are
/// used as given and flow through arithmetic unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    /// Share percentage at or above which the picked direction counts as crowded.
    pub crowd_threshold: f64,
    /// Absolute heat value at or above which the picked direction counts as very hot.
    pub heat_threshold: f64,
    pub total_budget: f64,
    pub parlay_budget: f64,
    pub single_budget: f64,
    pub cold_budget: f64,

    pub handicap_enabled: bool,
    pub handicap_crowd_threshold: f64,
    pub handicap_heat_threshold: f64,
    pub handicap_extra_budget: f64,

    /// Selects the hard-rule audit pipeline instead of the heuristic one.
    pub policy_v38_enabled: bool,
    pub v38_explanation_style: ExplanationStyle,
    /// Device-class hint used only to resolve `ExplanationStyle::Auto`.
    pub v38_is_mobile: bool,
    /// Rule-id → custom short-tag text; falls back to a fixed default per rule.
    #[serde(default)]
    pub v38_tag_overrides: BTreeMap<String, String>,
    pub lang: Lang,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            crowd_threshold: 80.0,
            heat_threshold: 50.0,
            total_budget: 100.0,
            parlay_budget: 70.0,
            single_budget: 20.0,
            cold_budget: 10.0,

            handicap_enabled: true,
            handicap_crowd_threshold: 80.0,
            handicap_heat_threshold: 50.0,
            handicap_extra_budget: 50.0,

            policy_v38_enabled: false,
            v38_explanation_style: ExplanationStyle::Auto,
            v38_is_mobile: false,
            v38_tag_overrides: BTreeMap::new(),
            lang: Lang::Zh,
        }
    }
}
