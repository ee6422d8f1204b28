//! Hard-rule audit pipeline (policy v3.8).
//!
//! Per fixture: a completeness gate first, then a fixed-order rule
//! sequence mutating a `{risk, tag}` accumulator, then explanation
//! selection by a separate priority-rank table. Evaluation order and
//! priority ranks are deliberately decoupled: reordering the sequence
//! changes risk outcomes, while ranks only choose which explanation is
//! shown.
//!
//! This mode produces no execution budget; all amounts are zero and the
//! note states the output is research-only.

use crate::engine::{explain, parse_time_to_hours, pick_max, triple_value};
use crate::models::{
    AnalysisResult, BudgetPlan, MatchAnalysis, MatchInput, Outcome, RiskLevel, StrategyConfig,
};
use crate::report;

/// Identity of one audit rule. Ranks are fixed per identity and
/// independent of firing order; lower rank = more decisive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RuleId {
    /// B1 red-zone meltdown (55% ≤ ratio < 60%), overrides the tier logic.
    RedZone,
    /// C0 auto-void: insufficient liquidity.
    AutoVoid,
    /// C1 imminent-kickoff override (≤ 1h), evidence only.
    Imminent,
    /// C2 mega-volume exemption (meltdown line 70%).
    MegaExempt,
    /// C3 standard-volume exemption (meltdown line 60%).
    StandardExempt,
    /// C4 explanatory-only mega-consensus tag.
    MegaConsensus,
    /// C5 weak-evidence parabola note.
    Parabola,
    /// C6 mid-low-volume derate (risk cap Medium).
    LowVolumeDerate,
    /// C7 regression reversal (risk cap Medium).
    Regression,
    /// C8 high-risk corridor (hard escalation to High).
    Corridor,
    /// C9 hollow heat (risk at least Medium).
    HollowHeat,
    /// C10 extreme hollow heat (High).
    ExtremeHollow,
    /// C11 structurally healthy (risk cap Medium).
    Healthy,
    /// D-layer league calibration, explanatory only.
    LeagueCalibration,
}

impl RuleId {
    /// Fixed priority rank; used only for decisive/top-3 selection.
    pub(crate) fn rank(self) -> u32 {
        match self {
            RuleId::RedZone => 10,
            RuleId::AutoVoid => 20,
            RuleId::Imminent => 30,
            RuleId::MegaExempt => 40,
            RuleId::StandardExempt => 50,
            RuleId::MegaConsensus => 60,
            RuleId::Parabola => 70,
            RuleId::LowVolumeDerate => 80,
            RuleId::Regression => 90,
            RuleId::Corridor => 100,
            RuleId::HollowHeat => 110,
            RuleId::ExtremeHollow => 120,
            RuleId::Healthy => 130,
            RuleId::LeagueCalibration => 200,
        }
    }

    /// Key under which a custom tag override may be supplied.
    pub(crate) fn override_key(self) -> &'static str {
        match self {
            RuleId::RedZone => "B1",
            RuleId::AutoVoid => "C0",
            RuleId::Imminent => "C1",
            RuleId::MegaExempt => "C2",
            RuleId::StandardExempt => "C3",
            RuleId::MegaConsensus => "C4",
            RuleId::Parabola => "C5",
            RuleId::LowVolumeDerate => "C6",
            RuleId::Regression => "C7",
            RuleId::Corridor => "C8",
            RuleId::HollowHeat => "C9",
            RuleId::ExtremeHollow => "C10",
            RuleId::Healthy => "C11",
            RuleId::LeagueCalibration => "D",
        }
    }
}

/// A rule that fired for one fixture. The name is the report-facing
/// identifier (league calibration embeds the recognized league).
#[derive(Debug, Clone)]
pub(crate) struct FiredRule {
    pub id: RuleId,
    pub name: String,
}

impl FiredRule {
    fn new(id: RuleId, name: &str) -> Self {
        Self { id, name: name.to_string() }
    }

    pub(crate) fn rank(&self) -> u32 {
        self.id.rank()
    }
}

/// Leagues recognized by the D-layer calibration tag.
const CALIBRATED_LEAGUES: &[&str] = &["EPL", "UCL", "LALIGA", "LA_LIGA"];

/// Everything the report and the analysis record need for one fixture.
#[derive(Debug, Clone)]
pub(crate) struct AuditFixture {
    pub rec: Outcome,
    pub hard_stopped: bool,
    pub risk: RiskLevel,
    pub tag: String,
    pub ratio: f64,
    pub meltdown_line: f64,
    /// Firing order.
    pub fired: Vec<FiredRule>,
    pub evidence: Vec<String>,
    /// Sorted by rank ascending, stable on firing order.
    pub ranked: Vec<FiredRule>,
    pub explanation: String,
}

fn evaluate(m: &MatchInput, config: &StrategyConfig) -> AuditFixture {
    let rec = pick_max(m.share.as_ref());
    let h_fav = triple_value(m.share.as_ref(), rec);
    let pl_fav = triple_value(m.pnl.as_ref(), rec);
    let v_total = m.total_volume;
    let snapshot_count = m.snapshot_count.unwrap_or(0);
    let hours_to_kickoff = parse_time_to_hours(m.time_point.as_deref());

    // Completeness gate: no rule below runs for a hard-stopped fixture.
    let time_missing = m.time_point.as_deref().map_or(true, str::is_empty);
    if v_total.is_none() || h_fav.is_none() || pl_fav.is_none() || time_missing || snapshot_count < 2
    {
        return AuditFixture {
            rec,
            hard_stopped: true,
            risk: RiskLevel::High,
            tag: String::new(),
            ratio: 0.0,
            meltdown_line: 50.0,
            fired: Vec::new(),
            evidence: Vec::new(),
            ranked: Vec::new(),
            explanation: String::new(),
        };
    }
    let v_total = v_total.unwrap_or_default();
    let h_fav = h_fav.unwrap_or_default();
    let pl_fav = pl_fav.unwrap_or_default();

    let mut risk = RiskLevel::Low;
    let mut tag = "✅ 低压力通道".to_string();
    let mut fired: Vec<FiredRule> = Vec::new();
    let mut evidence: Vec<String> = Vec::new();

    // C0: auto-void on insufficient liquidity.
    if v_total < 500_000.0 {
        fired.push(FiredRule::new(RuleId::AutoVoid, "C0 D0 Auto-Void"));
        tag = "🗑️ 样本作废：流动性不足".to_string();
        risk = RiskLevel::Medium;
        evidence.push(format!("V_total={} < 500000", v_total));
    }

    // C1: imminent-kickoff override, evidence only.
    if let Some(hours) = hours_to_kickoff {
        if hours <= 1.0 {
            fired.push(FiredRule::new(RuleId::Imminent, "C1 F-T 临场强制覆盖"));
            evidence.push(format!("距开赛≈{:.2}h，使用T_last口径", hours));
        }
    }

    let ratio = pl_fav.abs() / v_total * 100.0;
    let mut meltdown_line = 50.0;

    // B1 takes precedence: when it fires the tier logic is skipped.
    if (55.0..60.0).contains(&ratio) {
        fired.push(FiredRule::new(RuleId::RedZone, "B1 Red-Zone Meltdown"));
        tag = "⚠️ Red-Zone Meltdown".to_string();
        risk = RiskLevel::High;
    } else {
        // C2/C3 volume exemptions raise the meltdown line.
        if v_total >= 8_000_000.0 {
            meltdown_line = 70.0;
            fired.push(FiredRule::new(RuleId::MegaExempt, "C2 FΩ-Mega"));
        } else if (3_000_000.0..8_000_000.0).contains(&v_total) {
            meltdown_line = 60.0;
            fired.push(FiredRule::new(RuleId::StandardExempt, "C3 FΩ-Standard"));
        }

        if ratio > 100.0 {
            tag = "⚠️ 系统性异常区".to_string();
            risk = RiskLevel::High;
        } else if ratio > meltdown_line {
            tag = "⚠️ 压力熔断区".to_string();
            risk = RiskLevel::High;
        } else if ratio >= 25.0 {
            tag = "⚠️ 中高压力区".to_string();
            risk = risk.at_least(RiskLevel::Medium);
        }
    }

    // C4: explanatory-only tag, no risk effect.
    if v_total > 5_000_000.0 {
        fired.push(FiredRule::new(RuleId::MegaConsensus, "C4 FΩ-EX-R 超大体量共识场（解释标签）"));
    }

    // C5: weak-evidence parabola note.
    if snapshot_count >= 3 && h_fav >= 80.0 {
        fired.push(FiredRule::new(RuleId::Parabola, "C5 F-S 抛物线增量（弱证据）"));
        evidence.push("快照数≥3且集中度较高，需防噪声高".to_string());
    }

    // C7: regression reversal caps risk at Medium.
    if let (Some(h_early), Some(h_last)) = (m.h_early, m.h_last) {
        if (h_last - h_early).abs() > 10.0 && h_last < 88.0 {
            fired.push(FiredRule::new(RuleId::Regression, "C7 F3-R 回归撤销"));
            risk = risk.capped_at(RiskLevel::Medium);
            evidence.push(format!("H_last({}) 较 H_early({}) 回落明显", h_last, h_early));
        }
    }

    // C8: high-risk corridor, unconditional escalation.
    if v_total > 2_000_000.0 && h_fav > 80.0 && pl_fav < 0.0 {
        fired.push(FiredRule::new(RuleId::Corridor, "C8 F1-C 高风险走廊"));
        risk = RiskLevel::High;
    }

    // C9: hollow heat.
    if h_fav > 70.0 && (pl_fav.abs() < 500_000.0 || pl_fav.abs() < 0.05 * v_total) {
        fired.push(FiredRule::new(RuleId::HollowHeat, "C9 F0-W 空心热度"));
        risk = risk.at_least(RiskLevel::Medium);
    }

    // C10: extreme hollow heat.
    if h_fav > 90.0 && m.loss_pressure.unwrap_or(ratio) < 10.0 {
        fired.push(FiredRule::new(RuleId::ExtremeHollow, "C10 F0-W-X 极端空心热度"));
        risk = RiskLevel::High;
    }

    // C11: structurally healthy, caps at Medium.
    if (60.0..=80.0).contains(&h_fav) && pl_fav.abs() < 0.05 * v_total && v_total >= 1_000_000.0 {
        fired.push(FiredRule::new(RuleId::Healthy, "C11 F2 结构相对健康"));
        risk = risk.capped_at(RiskLevel::Medium);
    }

    // C6: mid-low-volume derate, caps at Medium.
    if (500_000.0..1_500_000.0).contains(&v_total) {
        fired.push(FiredRule::new(RuleId::LowVolumeDerate, "C6 Fσ-L 中低体量降级阀"));
        risk = risk.capped_at(RiskLevel::Medium);
    }

    // D-layer: league calibration, explanatory only.
    if let Some(league) = m.league.as_deref() {
        let lg = league.to_uppercase();
        if CALIBRATED_LEAGUES.contains(&lg.as_str()) {
            fired.push(FiredRule {
                id: RuleId::LeagueCalibration,
                name: format!("D层联赛校准：{}", lg),
            });
        }
    }

    evidence.insert(0, format!("当前 ratio={:.2}%，熔断线={}%", ratio, meltdown_line));
    evidence.push("双证据核验：至少两档快照已提供".to_string());

    let mut ranked = fired.clone();
    ranked.sort_by_key(FiredRule::rank);

    let style = explain::resolve_style(config);
    let explanation = explain::explain_decisive(ranked.first(), ratio, &ranked, style, risk, config);
    if style == explain::Style::Short {
        if let Some(first) = evidence.first_mut() {
            *first = format!("{} | {}", first, explanation);
        }
    }

    AuditFixture {
        rec,
        hard_stopped: false,
        risk,
        tag,
        ratio,
        meltdown_line,
        fired,
        evidence,
        ranked,
        explanation,
    }
}

pub(crate) fn analyze(matches: &[MatchInput], config: &StrategyConfig) -> AnalysisResult {
    let audits: Vec<AuditFixture> = matches.iter().map(|m| evaluate(m, config)).collect();

    let analyses: Vec<MatchAnalysis> = matches
        .iter()
        .zip(&audits)
        .map(|(m, audit)| {
            if audit.hard_stopped {
                MatchAnalysis {
                    input: m.clone(),
                    recommendation: audit.rec,
                    handicap_recommendation: None,
                    handicap_risk: None,
                    risk: RiskLevel::High,
                    stake_u: 0.0,
                    reasons: vec!["停机协议触发：关键字段缺失/冲突".to_string()],
                    trigger_cold_draw: false,
                }
            } else {
                let mut reasons = vec![format!("ratio={:.2}%", audit.ratio), audit.tag.clone()];
                reasons.extend(audit.fired.iter().take(2).map(|r| r.name.clone()));
                MatchAnalysis {
                    input: m.clone(),
                    recommendation: audit.rec,
                    handicap_recommendation: None,
                    handicap_risk: None,
                    risk: audit.risk,
                    stake_u: 0.0,
                    reasons,
                    trigger_cold_draw: false,
                }
            }
        })
        .collect();

    let budget_plan = BudgetPlan {
        total: 0.0,
        parlay: 0.0,
        single: 0.0,
        cold_hedge: 0.0,
        note: config
            .lang
            .pick(
                "v3.8硬规则模式：仅输出研究性风险信息，不输出执行建议",
                "v3.8 hard-rule mode: research-only risk output (no execution suggestion)",
            )
            .to_string(),
    };

    let output_text = report::render_audit_report(matches, &audits, config);

    AnalysisResult { parsed_count: matches.len(), analyses, budget_plan, output_text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Triple;

    fn base_fixture() -> MatchInput {
        MatchInput {
            id: "m_0_0".into(),
            raw_line: String::new(),
            home_team: "曼城".into(),
            away_team: "利物浦".into(),
            market_odds: None,
            volume: None,
            share: Some(Triple { home: Some(82.0), draw: Some(9.0), away: Some(9.0) }),
            total_volume: Some(3_200_000.0),
            pnl: Some(Triple {
                home: Some(-1_760_000.0),
                draw: Some(520_000.0),
                away: Some(810_000.0),
            }),
            heat: None,
            handicap_line: None,
            handicap_odds: None,
            time_point: Some("0.8h".into()),
            snapshot_count: Some(2),
            league: Some("EPL".into()),
            h_early: Some(94.0),
            h_last: Some(81.0),
            loss_pressure: Some(8.0),
        }
    }

    #[test]
    fn gate_stops_before_any_rule_even_in_red_zone() {
        let mut m = base_fixture();
        m.time_point = None;
        let audit = evaluate(&m, &StrategyConfig::default());
        assert!(audit.hard_stopped);
        assert_eq!(audit.risk, RiskLevel::High);
        assert!(audit.fired.is_empty());
    }

    #[test]
    fn gate_requires_two_snapshots() {
        let mut m = base_fixture();
        m.snapshot_count = Some(1);
        assert!(evaluate(&m, &StrategyConfig::default()).hard_stopped);
        m.snapshot_count = None;
        assert!(evaluate(&m, &StrategyConfig::default()).hard_stopped);
    }

    #[test]
    fn red_zone_at_exactly_55_skips_tier_logic() {
        // |pnl| / volume = 1.76M / 3.2M = 55.00%, standard volume tier.
        let m = base_fixture();
        let audit = evaluate(&m, &StrategyConfig::default());
        assert!(!audit.hard_stopped);
        assert_eq!(audit.tag, "⚠️ Red-Zone Meltdown");
        // Tier exemption must not run: the line stays at the default 50.
        assert_eq!(audit.meltdown_line, 50.0);
        assert!(audit.fired.iter().any(|r| r.id == RuleId::RedZone));
        assert!(!audit.fired.iter().any(|r| r.id == RuleId::StandardExempt));
    }

    #[test]
    fn decisive_rule_is_lowest_rank_not_firing_order() {
        // C1 fires before B1 in sequence; B1 (rank 10) must be decisive.
        let m = base_fixture();
        let audit = evaluate(&m, &StrategyConfig::default());
        assert_eq!(audit.ranked[0].id, RuleId::RedZone);
        assert_eq!(audit.ranked[0].rank(), 10);
        // Corridor (C8) fired as well: risk stays High despite C7's cap
        // because C8 runs after C7 in the fixed sequence.
        assert!(audit.fired.iter().any(|r| r.id == RuleId::Corridor));
        assert_eq!(audit.risk, RiskLevel::High);
    }

    #[test]
    fn regression_reversal_caps_but_never_raises() {
        let mut m = base_fixture();
        // Defuse B1/C8: positive pnl at the favorite, low ratio.
        m.pnl = Some(Triple { home: Some(100_000.0), draw: None, away: None });
        m.share = Some(Triple { home: Some(82.0), draw: Some(9.0), away: Some(9.0) });
        let audit = evaluate(&m, &StrategyConfig::default());
        // ratio = 3.125% → base Low; C7's cap is a no-op on Low, then
        // C9 hollow heat lifts to Medium.
        assert!(audit.fired.iter().any(|r| r.id == RuleId::Regression));
        assert_eq!(audit.risk, RiskLevel::Medium);
    }

    #[test]
    fn auto_void_marks_small_samples() {
        let mut m = base_fixture();
        m.total_volume = Some(400_000.0);
        m.pnl = Some(Triple { home: Some(10_000.0), draw: None, away: None });
        let audit = evaluate(&m, &StrategyConfig::default());
        assert!(audit.fired.iter().any(|r| r.id == RuleId::AutoVoid));
        assert_eq!(audit.tag, "🗑️ 样本作废：流动性不足");
        assert!(audit.risk >= RiskLevel::Medium);
    }

    #[test]
    fn systemic_anomaly_above_100_percent() {
        let mut m = base_fixture();
        m.total_volume = Some(1_000_000.0);
        m.pnl = Some(Triple { home: Some(-1_200_000.0), draw: None, away: None });
        m.h_early = None;
        m.h_last = None;
        let audit = evaluate(&m, &StrategyConfig::default());
        assert_eq!(audit.tag, "⚠️ 系统性异常区");
        // C6 fires afterwards (1.0M < 1.5M) and caps back to Medium.
        assert_eq!(audit.risk, RiskLevel::Medium);
    }

    #[test]
    fn mega_volume_raises_meltdown_line_to_70() {
        let mut m = base_fixture();
        m.total_volume = Some(9_000_000.0);
        m.pnl = Some(Triple { home: Some(-5_850_000.0), draw: None, away: None });
        m.h_early = None;
        m.h_last = None;
        // ratio = 65%: above the 50/60 lines but under the mega line.
        let audit = evaluate(&m, &StrategyConfig::default());
        assert_eq!(audit.meltdown_line, 70.0);
        assert!(audit.fired.iter().any(|r| r.id == RuleId::MegaExempt));
        assert_ne!(audit.tag, "⚠️ 压力熔断区");
    }

    #[test]
    fn league_calibration_is_explanatory_only() {
        let mut m = base_fixture();
        m.pnl = Some(Triple { home: Some(100_000.0), draw: None, away: None });
        m.league = Some("laliga".into());
        let with = evaluate(&m, &StrategyConfig::default());
        m.league = Some("SERIE_A".into());
        let without = evaluate(&m, &StrategyConfig::default());
        assert!(with.fired.iter().any(|r| r.name == "D层联赛校准：LALIGA"));
        assert!(!without.fired.iter().any(|r| r.id == RuleId::LeagueCalibration));
        assert_eq!(with.risk, without.risk);
    }
}
