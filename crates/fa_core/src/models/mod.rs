//! Data model shared by the parser and the rule engine.
//!
//! Everything here is a plain value type: records are created once (by
//! the parser or by an analysis call) and never mutated afterwards.
//! Serde names follow the collaborator-facing record shape, so stored
//! history snapshots round-trip unchanged.

pub mod config;

use serde::{Deserialize, Serialize};

use crate::i18n::Lang;

pub use config::{ExplanationStyle, StrategyConfig};

/// Three optional numeric fields keyed by outcome direction.
///
/// Used for odds, traded volume, share-of-volume, book profit/loss,
/// heat and handicap odds. A `None` field means "unparsed/unsupplied",
/// never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    #[serde(default)]
    pub home: Option<f64>,
    #[serde(default)]
    pub draw: Option<f64>,
    #[serde(default)]
    pub away: Option<f64>,
}

impl Triple {
    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

/// Main market outcome direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub fn label(self, lang: Lang) -> &'static str {
        match (self, lang) {
            (Outcome::Home, Lang::Zh) => "主胜",
            (Outcome::Draw, Lang::Zh) => "平",
            (Outcome::Away, Lang::Zh) => "客胜",
            (Outcome::Home, Lang::En) => "Home win",
            (Outcome::Draw, Lang::En) => "Draw",
            (Outcome::Away, Lang::En) => "Away win",
        }
    }
}

/// Handicap-market outcome, mapping one-to-one onto [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandicapOutcome {
    Win,
    Draw,
    Loss,
}

impl HandicapOutcome {
    /// Corresponding main-market direction.
    pub fn to_main(self) -> Outcome {
        match self {
            HandicapOutcome::Win => Outcome::Home,
            HandicapOutcome::Draw => Outcome::Draw,
            HandicapOutcome::Loss => Outcome::Away,
        }
    }

    pub fn label(self, lang: Lang) -> &'static str {
        match (self, lang) {
            (HandicapOutcome::Win, Lang::Zh) => "让胜",
            (HandicapOutcome::Draw, Lang::Zh) => "让平",
            (HandicapOutcome::Loss, Lang::Zh) => "让负",
            (HandicapOutcome::Win, Lang::En) => "Handicap home",
            (HandicapOutcome::Draw, Lang::En) => "Handicap draw",
            (HandicapOutcome::Loss, Lang::En) => "Handicap away",
        }
    }
}

/// Ordered risk tier. `Ord` follows severity: Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(self, lang: Lang) -> &'static str {
        match (self, lang) {
            (RiskLevel::Low, Lang::Zh) => "低",
            (RiskLevel::Medium, Lang::Zh) => "中",
            (RiskLevel::High, Lang::Zh) => "高",
            (RiskLevel::Low, Lang::En) => "Low",
            (RiskLevel::Medium, Lang::En) => "Medium",
            (RiskLevel::High, Lang::En) => "High",
        }
    }

    /// Escalate: the more severe of the two.
    pub fn at_least(self, floor: RiskLevel) -> RiskLevel {
        self.max(floor)
    }

    /// Cap: the less severe of the two. Can only lower, never raise.
    pub fn capped_at(self, cap: RiskLevel) -> RiskLevel {
        self.min(cap)
    }
}

/// One fixture, produced by the parser from one non-empty input line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInput {
    /// Unique per parse (`m_<unix_millis>_<line_index>`).
    pub id: String,
    pub raw_line: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub market_odds: Option<Triple>,
    #[serde(default)]
    pub volume: Option<Triple>,
    #[serde(default)]
    pub share: Option<Triple>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub pnl: Option<Triple>,
    #[serde(default)]
    pub heat: Option<Triple>,
    #[serde(default)]
    pub handicap_line: Option<f64>,
    #[serde(default)]
    pub handicap_odds: Option<Triple>,
    /// Free-form duration-to-kickoff string, e.g. `"0.8h"` or `"45m"`.
    #[serde(default)]
    pub time_point: Option<String>,
    #[serde(default)]
    pub snapshot_count: Option<u32>,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub h_early: Option<f64>,
    #[serde(default)]
    pub h_last: Option<f64>,
    #[serde(default)]
    pub loss_pressure: Option<f64>,
}

/// One fixture's verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAnalysis {
    #[serde(rename = "match")]
    pub input: MatchInput,
    pub recommendation: Outcome,
    #[serde(default)]
    pub handicap_recommendation: Option<HandicapOutcome>,
    #[serde(default)]
    pub handicap_risk: Option<RiskLevel>,
    pub risk: RiskLevel,
    /// Relative stake units.
    pub stake_u: f64,
    pub reasons: Vec<String>,
    pub trigger_cold_draw: bool,
}

/// Budget amounts attached to an [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPlan {
    pub total: f64,
    pub parlay: f64,
    pub single: f64,
    pub cold_hedge: f64,
    pub note: String,
}

/// The engine's sole externally visible output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub parsed_count: usize,
    pub analyses: Vec<MatchAnalysis>,
    pub budget_plan: BudgetPlan,
    pub output_text: String,
}

/// Persisted-history record owned by external collaborators.
///
/// The config snapshot is kept as raw JSON: stored history may predate
/// the current config shape, and decoding it is the one place where
/// re-derivation can legitimately fail (see [`crate::export`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub created_at: String,
    pub input_text: String,
    pub output_text: String,
    pub parsed_count: usize,
    pub config_snapshot: serde_json::Value,
}
