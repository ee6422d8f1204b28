//! Heuristic strategy pipeline.
//!
//! Per fixture: pick the direction with the largest share, classify
//! risk from three boolean signals (crowded / very hot / negative book
//! P-L), derive stake units, optionally run the handicap sub-analysis,
//! and flag the cold-draw hedge. Then aggregate the budget plan and
//! render the report.

use std::collections::HashMap;

use crate::engine::{pick_handicap_max, pick_max, triple_value};
use crate::models::{
    AnalysisResult, BudgetPlan, HandicapOutcome, MatchAnalysis, MatchInput, RiskLevel,
    StrategyConfig,
};
use crate::report;

pub(crate) struct Signals {
    pub risk: RiskLevel,
    pub crowded: bool,
    pub very_hot: bool,
}

/// Three-signal classification shared by the main and handicap picks.
pub(crate) fn compute_risk(
    share: f64,
    heat: f64,
    negative_pnl: bool,
    crowd_threshold: f64,
    heat_threshold: f64,
) -> Signals {
    let crowded = share >= crowd_threshold;
    let very_hot = heat >= heat_threshold;

    let risk = if (crowded && (very_hot || negative_pnl)) || (very_hot && negative_pnl) {
        RiskLevel::High
    } else if crowded || very_hot || negative_pnl {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    Signals { risk, crowded, very_hot }
}

fn stake_by_risk(risk: RiskLevel, crowded: bool) -> f64 {
    match risk {
        RiskLevel::Low => 1.0,
        RiskLevel::Medium => {
            if crowded {
                0.75
            } else {
                0.5
            }
        }
        RiskLevel::High => 0.25,
    }
}

fn risk_score(risk: RiskLevel) -> u8 {
    match risk {
        RiskLevel::Low => 1,
        RiskLevel::Medium => 2,
        RiskLevel::High => 3,
    }
}

fn analyze_fixture(m: &MatchInput, config: &StrategyConfig) -> MatchAnalysis {
    let rec = pick_max(m.share.as_ref());
    let rec_share = triple_value(m.share.as_ref(), rec).unwrap_or(0.0);
    let rec_heat = triple_value(m.heat.as_ref(), rec).unwrap_or(0.0).abs();
    let rec_pnl = triple_value(m.pnl.as_ref(), rec);
    let negative_pnl = rec_pnl.map_or(false, |v| v < 0.0);

    let main = compute_risk(
        rec_share,
        rec_heat,
        negative_pnl,
        config.crowd_threshold,
        config.heat_threshold,
    );
    let stake_u = stake_by_risk(main.risk, main.crowded);

    let mut handicap_recommendation: Option<HandicapOutcome> = None;
    let mut handicap_risk: Option<RiskLevel> = None;
    if config.handicap_enabled && (m.handicap_line.is_some() || m.handicap_odds.is_some()) {
        if let Some(pick) = pick_handicap_max(m.handicap_odds.as_ref()) {
            let mapped = pick.to_main();
            let h_share = triple_value(m.share.as_ref(), mapped).unwrap_or(rec_share);
            let h_heat = triple_value(m.heat.as_ref(), mapped).map(f64::abs).unwrap_or(rec_heat);
            let h_pnl = triple_value(m.pnl.as_ref(), mapped);
            let h_negative = h_pnl.map_or(false, |v| v < 0.0);
            let h_sig = compute_risk(
                h_share,
                h_heat,
                h_negative,
                config.handicap_crowd_threshold,
                config.handicap_heat_threshold,
            );
            // High handicap risk is still output, flagged with a warning
            // marker in the report rather than suppressed.
            handicap_recommendation = Some(pick);
            handicap_risk = Some(h_sig.risk);
        }
    }

    let trigger_cold_draw = (main.crowded || main.very_hot) && negative_pnl;

    let share_text =
        if rec_share == 0.0 { "—".to_string() } else { format!("{}", rec_share) };
    let pnl_text = rec_pnl.map_or_else(|| "—".to_string(), |v| format!("{}", v));
    let reasons = if config.lang.is_en() {
        vec![
            format!("Top share direction: {} ({}%)", rec.label(config.lang), share_text),
            format!("Heat signal: {}", rec_heat),
            format!("Book P/L (pick side): {}", pnl_text),
        ]
    } else {
        vec![
            format!("交易占比最大方向：{}（{}%）", rec.label(config.lang), share_text),
            format!("冷热信号：{}", rec_heat),
            format!("庄家盈亏（推荐方向）：{}", pnl_text),
        ]
    };

    MatchAnalysis {
        input: m.clone(),
        recommendation: rec,
        handicap_recommendation,
        handicap_risk,
        risk: main.risk,
        stake_u,
        reasons,
        trigger_cold_draw,
    }
}

pub(crate) fn analyze(matches: &[MatchInput], config: &StrategyConfig) -> AnalysisResult {
    let analyses: Vec<MatchAnalysis> =
        matches.iter().map(|m| analyze_fixture(m, config)).collect();

    // Ascending by risk severity, stable on original order.
    let mut sorted: Vec<&MatchAnalysis> = analyses.iter().collect();
    sorted.sort_by_key(|a| risk_score(a.risk));
    let parlay_picks: Vec<&MatchAnalysis> = sorted.iter().take(2).copied().collect();
    let single_pick: Option<&MatchAnalysis> = sorted.first().copied();

    let cold_triggered = analyses.iter().any(|a| a.trigger_cold_draw);
    let budget_plan = BudgetPlan {
        total: config.total_budget,
        parlay: if parlay_picks.len() >= 2 { config.parlay_budget } else { 0.0 },
        single: if single_pick.is_some() { config.single_budget } else { 0.0 },
        cold_hedge: if cold_triggered { config.cold_budget } else { 0.0 },
        note: if cold_triggered {
            if config.lang.is_en() {
                format!("Conditional hedge triggered (draw) {} RMB", config.cold_budget)
            } else {
                format!("触发条件博冷（防平）{} RMB", config.cold_budget)
            }
        } else if config.lang.is_en() {
            format!("{} RMB reserved", config.cold_budget)
        } else {
            format!("{} RMB 留空", config.cold_budget)
        },
    };

    // Handicap budget: 30 to the lowest handicap risk, 20 to the next,
    // zero to the rest; absent risk sorts as High.
    let handicap_rows: Vec<&MatchAnalysis> =
        analyses.iter().filter(|a| a.handicap_recommendation.is_some()).collect();
    let mut handicap_sorted = handicap_rows.clone();
    handicap_sorted.sort_by_key(|a| risk_score(a.handicap_risk.unwrap_or(RiskLevel::High)));
    let mut handicap_budget: HashMap<String, f64> = HashMap::new();
    if config.handicap_enabled && !handicap_sorted.is_empty() {
        handicap_budget.insert(handicap_sorted[0].input.id.clone(), 30.0);
        if let Some(second) = handicap_sorted.get(1) {
            handicap_budget.insert(second.input.id.clone(), 20.0);
        }
    }

    let output_text = report::render_heuristic_report(
        &analyses,
        &parlay_picks,
        single_pick,
        &handicap_budget,
        &budget_plan,
        config,
    );

    AnalysisResult { parsed_count: matches.len(), analyses, budget_plan, output_text }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_combinations_follow_the_matrix() {
        // crowded + negative pnl → High regardless of heat.
        let s = compute_risk(90.0, 0.0, true, 80.0, 50.0);
        assert_eq!(s.risk, RiskLevel::High);
        assert!(s.crowded);
        // very hot + negative pnl → High.
        assert_eq!(compute_risk(10.0, 60.0, true, 80.0, 50.0).risk, RiskLevel::High);
        // crowded alone → Medium.
        assert_eq!(compute_risk(85.0, 0.0, false, 80.0, 50.0).risk, RiskLevel::Medium);
        // negative pnl alone → Medium.
        assert_eq!(compute_risk(10.0, 0.0, true, 80.0, 50.0).risk, RiskLevel::Medium);
        // nothing → Low.
        assert_eq!(compute_risk(10.0, 0.0, false, 80.0, 50.0).risk, RiskLevel::Low);
    }

    #[test]
    fn stake_units_by_risk_and_crowding() {
        assert_eq!(stake_by_risk(RiskLevel::Low, false), 1.0);
        assert_eq!(stake_by_risk(RiskLevel::Medium, true), 0.75);
        assert_eq!(stake_by_risk(RiskLevel::Medium, false), 0.5);
        assert_eq!(stake_by_risk(RiskLevel::High, true), 0.25);
    }
}
