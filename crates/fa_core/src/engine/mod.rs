//! Rule engine: strategy/risk classifier.
//!
//! One entry point, two mutually exclusive pipelines selected per call
//! by `config.policy_v38_enabled`:
//!
//! - [`heuristic`] — threshold-based recommendation, stake and budget
//!   planning;
//! - [`hard_rules`] — the v3.8 hard-rule audit: completeness gate,
//!   ordered rule sequence, priority-ranked explanations, zero budget.
//!
//! Both pipelines are pure functions of their inputs; the engine holds
//! no state across calls.

pub mod explain;
pub mod hard_rules;
pub mod heuristic;


use tracing::debug;

use crate::models::{
    AnalysisResult, HandicapOutcome, MatchInput, Outcome, StrategyConfig, Triple,
};

/// Analyze a parsed fixture list under the given configuration.
///
/// Mode is selected per call, not per fixture. The result owns fresh
/// records; inputs are read-only.
pub fn analyze_matches(matches: &[MatchInput], config: &StrategyConfig) -> AnalysisResult {
    debug!(
        fixtures = matches.len(),
        hard_rules = config.policy_v38_enabled,
        "running analysis"
    );
    if config.policy_v38_enabled {
        hard_rules::analyze(matches, config)
    } else {
        heuristic::analyze(matches, config)
    }
}

/// Outcome with the largest value, missing fields counting as zero.
///
/// Ties resolve left-to-right with `>=`, so an exact three-way tie
/// defaults to `Home`. Preserved behavior, not to be corrected: changing
/// it would alter recommendations silently.
pub(crate) fn pick_max(t: Option<&Triple>) -> Outcome {
    let h = t.and_then(|t| t.home).unwrap_or(0.0);
    let d = t.and_then(|t| t.draw).unwrap_or(0.0);
    let a = t.and_then(|t| t.away).unwrap_or(0.0);
    if h >= d && h >= a {
        Outcome::Home
    } else if d >= h && d >= a {
        Outcome::Draw
    } else {
        Outcome::Away
    }
}

/// Handicap outcome with the largest odds value, or `None` when no
/// handicap odds were parsed. Missing fields compare as negative
/// infinity; ties resolve toward `Win` by the same `>=` rule.
pub(crate) fn pick_handicap_max(t: Option<&Triple>) -> Option<HandicapOutcome> {
    let t = t?;
    let h = t.home.unwrap_or(f64::NEG_INFINITY);
    let d = t.draw.unwrap_or(f64::NEG_INFINITY);
    let a = t.away.unwrap_or(f64::NEG_INFINITY);
    if h >= d && h >= a {
        Some(HandicapOutcome::Win)
    } else if d >= h && d >= a {
        Some(HandicapOutcome::Draw)
    } else {
        Some(HandicapOutcome::Loss)
    }
}

/// Value of an optional triple at the given direction.
pub(crate) fn triple_value(t: Option<&Triple>, outcome: Outcome) -> Option<f64> {
    t.and_then(|t| t.get(outcome))
}

/// Unsigned decimal token, digits with at most one interior dot. No
/// sign, no exponent, no `inf`/`nan` spellings.
fn parse_unsigned_decimal(v: &str) -> Option<f64> {
    let valid = match v.split_once('.') {
        Some((int, frac)) => {
            !int.is_empty()
                && !frac.is_empty()
                && int.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()),
    };
    if valid {
        v.parse::<f64>().ok()
    } else {
        None
    }
}

/// Derive hours-to-kickoff from a free-form time point.
///
/// Accepts `"0.8h"`, `"45m"`, or a bare number of hours; anything else
/// is unknown and the imminent-kickoff rule will not fire. The unit
/// forms take unsigned decimals only.
pub(crate) fn parse_time_to_hours(t: Option<&str>) -> Option<f64> {
    let v = t?.trim().to_lowercase();
    if let Some(stripped) = v.strip_suffix('h') {
        return parse_unsigned_decimal(stripped);
    }
    if let Some(stripped) = v.strip_suffix('m') {
        return parse_unsigned_decimal(stripped).map(|m| m / 60.0);
    }
    v.parse::<f64>().ok().filter(|n| n.is_finite())
}
