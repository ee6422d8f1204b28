//! # fa_core - Betting-Market Text Analysis Engine
//!
//! This library parses free-form pasted betting-market text into
//! structured fixture records and runs one of two deterministic
//! analysis pipelines over them:
//!
//! - a heuristic strategy that classifies risk from share, heat and
//!   book P-L signals and plans a stake budget;
//! - the v3.8 hard-rule audit that runs a fixed ordered rule sequence
//!   and emits research-only risk output with zero budget.
//!
//! ## Features
//! - Lossy line-based parsing: unrecognized lines are skipped, fields
//!   that fail to parse stay absent
//! - Deterministic output (same input + config = same report text)
//! - Dual-language report rendering (Chinese / English)
//! - History comparison and export re-derivation helpers

pub mod compare;
pub mod engine;
pub mod error;
pub mod export;
pub mod i18n;
pub mod models;
pub mod parser;
pub mod report;

pub use compare::{compare_history_items, find_latest_two_same_match, CompareResult};
pub use engine::analyze_matches;
pub use error::{CoreError, Result};
pub use export::{build_export_payload, build_export_text, ExportPayload};
pub use i18n::Lang;
pub use models::{
    AnalysisResult, BudgetPlan, ExplanationStyle, HistoryItem, MatchAnalysis, MatchInput,
    RiskLevel, StrategyConfig,
};
pub use parser::parse_input;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
