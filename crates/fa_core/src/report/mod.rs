//! Plain-text report rendering for both pipelines.
//!
//! Output is deterministic line-by-line text. Every label exists in a
//! Chinese and an English variant selected by `config.lang`; a few
//! audit snapshot labels (V_total / H_fav / PL_fav) are metric names
//! and stay as-is in both languages.

use std::collections::HashMap;

use crate::engine::hard_rules::AuditFixture;
use crate::engine::triple_value;
use crate::models::{BudgetPlan, MatchAnalysis, MatchInput, RiskLevel, StrategyConfig};

/// Formats an f64 the way the report expects: integral values without
/// a trailing `.0`, fractional values with their natural digits.
pub(crate) fn fmt_num(v: f64) -> String {
    format!("{}", v)
}

fn opt_num(v: Option<f64>, missing: &str) -> String {
    v.map_or_else(|| missing.to_string(), fmt_num)
}

pub(crate) fn render_heuristic_report(
    analyses: &[MatchAnalysis],
    parlay_picks: &[&MatchAnalysis],
    single_pick: Option<&MatchAnalysis>,
    handicap_budget: &HashMap<String, f64>,
    budget_plan: &BudgetPlan,
    config: &StrategyConfig,
) -> String {
    let en = config.lang.is_en();
    let lang = config.lang;
    let mut lines: Vec<String> = Vec::new();

    lines.push(
        config.lang.pick("【Footy Analyzer V1 建议】", "[Footy Analyzer V1 Suggestions]").to_string(),
    );
    if en {
        lines.push(format!("Parsed matches: {}", analyses.len()));
    } else {
        lines.push(format!("已解析场次：{}", analyses.len()));
    }
    lines.push(String::new());

    lines.push(config.lang.pick("【胜平负建议】", "[1X2 Suggestions]").to_string());
    for (idx, a) in analyses.iter().enumerate() {
        let m = &a.input;
        lines.push(format!("{}. {} vs {}", idx + 1, m.home_team, m.away_team));
        if en {
            lines.push(format!("- Pick: {}", a.recommendation.label(lang)));
            lines.push(format!("- Risk: {} (stake {}u)", a.risk.label(lang), fmt_num(a.stake_u)));
            lines.push(format!("- Reasons: {}", a.reasons.join("; ")));
            if a.trigger_cold_draw {
                lines.push(format!("- Conditional hedge: draw ({} RMB)", fmt_num(config.cold_budget)));
            }
        } else {
            lines.push(format!("- 推荐：{}", a.recommendation.label(lang)));
            lines.push(format!("- 风险：{}（仓位 {}u）", a.risk.label(lang), fmt_num(a.stake_u)));
            lines.push(format!("- 理由：{}", a.reasons.join("；")));
            if a.trigger_cold_draw {
                lines.push(format!("- 条件博冷：防平（{} RMB）", fmt_num(config.cold_budget)));
            }
        }
        lines.push(String::new());
    }

    lines.push(config.lang.pick("【让球建议】", "[Handicap Suggestions]").to_string());
    let handicap_rows: Vec<&MatchAnalysis> =
        analyses.iter().filter(|a| a.handicap_recommendation.is_some()).collect();
    if !config.handicap_enabled {
        lines.push(config.lang.pick("- 已关闭让球推荐", "- Handicap suggestion is disabled").to_string());
    } else if handicap_rows.is_empty() {
        lines.push(
            config.lang.pick("- 无满足条件的让球推荐", "- No qualifying handicap suggestion").to_string(),
        );
    } else {
        for (idx, a) in handicap_rows.iter().enumerate() {
            let m = &a.input;
            let line = opt_num(m.handicap_line, "—");
            let budget = handicap_budget.get(&m.id).copied().unwrap_or(0.0);
            let risk = a.handicap_risk.unwrap_or(RiskLevel::High);
            let warn = if risk == RiskLevel::High {
                config.lang.pick("（警示）", " (warning)")
            } else {
                ""
            };
            let pick = a
                .handicap_recommendation
                .map(|h| h.label(lang))
                .unwrap_or_default();
            lines.push(format!("{}. {} vs {}", idx + 1, m.home_team, m.away_team));
            if en {
                lines.push(format!("- Line: {}", line));
                lines.push(format!("- Pick: {}", pick));
                lines.push(format!("- Risk tag: {}{}", risk.label(lang), warn));
                lines.push(format!("- Handicap budget: {} RMB", fmt_num(budget)));
            } else {
                lines.push(format!("- 让球线：{}", line));
                lines.push(format!("- 推荐：{}", pick));
                lines.push(format!("- 风险标签：{}{}", risk.label(lang), warn));
                lines.push(format!("- 让球预算分配：{} RMB", fmt_num(budget)));
            }
            lines.push(String::new());
        }
    }

    if en {
        lines.push(format!(
            "[Budget ({} RMB + handicap extra {} RMB)]",
            fmt_num(config.total_budget),
            fmt_num(config.handicap_extra_budget)
        ));
    } else {
        lines.push(format!(
            "【预算（{} RMB + 让球额外{} RMB）】",
            fmt_num(config.total_budget),
            fmt_num(config.handicap_extra_budget)
        ));
    }
    if parlay_picks.len() >= 2 {
        let legs = format!(
            "{} vs {} + {} vs {}",
            parlay_picks[0].input.home_team,
            parlay_picks[0].input.away_team,
            parlay_picks[1].input.home_team,
            parlay_picks[1].input.away_team
        );
        if en {
            lines.push(format!("- Parlay (2-leg): {} RMB ({})", fmt_num(config.parlay_budget), legs));
        } else {
            lines.push(format!("- 主串(2串1)：{} RMB（{}）", fmt_num(config.parlay_budget), legs));
        }
    } else {
        lines.push(
            config
                .lang
                .pick("- 主串(2串1)：0 RMB（场次不足）", "- Parlay (2-leg): 0 RMB (insufficient matches)")
                .to_string(),
        );
    }
    if let Some(single) = single_pick {
        let pair = format!("{} vs {}", single.input.home_team, single.input.away_team);
        if en {
            lines.push(format!("- Single flex: {} RMB ({})", fmt_num(config.single_budget), pair));
        } else {
            lines.push(format!("- 机动单场：{} RMB（{}）", fmt_num(config.single_budget), pair));
        }
    } else {
        lines.push(config.lang.pick("- 机动单场：0 RMB", "- Single flex: 0 RMB").to_string());
    }
    if en {
        lines.push(format!("- Conditional hedge: {} RMB", fmt_num(budget_plan.cold_hedge)));
        lines.push(format!(
            "- Handicap extra budget: {} RMB (allocation: 30+20)",
            fmt_num(config.handicap_extra_budget)
        ));
        lines.push(format!("- Notes: {}", budget_plan.note));
    } else {
        lines.push(format!("- 条件博冷：{} RMB", fmt_num(budget_plan.cold_hedge)));
        lines.push(format!(
            "- 让球独立预算：{} RMB（分配规则：30+20）",
            fmt_num(config.handicap_extra_budget)
        ));
        lines.push(format!("- 说明：{}", budget_plan.note));
    }

    lines.join("\n")
}

pub(crate) fn render_audit_report(
    matches: &[MatchInput],
    audits: &[AuditFixture],
    config: &StrategyConfig,
) -> String {
    let en = config.lang.is_en();
    let mut lines: Vec<String> = Vec::new();

    lines.push(
        config
            .lang
            .pick("【Footy Analyzer v3.8.x 硬规则审计】", "[Footy Analyzer v3.8.x Hard-rule Audit]")
            .to_string(),
    );
    lines.push(String::new());

    for (idx, (m, audit)) in matches.iter().zip(audits).enumerate() {
        let h_fav = triple_value(m.share.as_ref(), audit.rec);
        let pl_fav = triple_value(m.pnl.as_ref(), audit.rec);
        let snapshot_count = m.snapshot_count.unwrap_or(0);

        lines.push(format!("{}. {} vs {}", idx + 1, m.home_team, m.away_team));
        lines.push(config.lang.pick("1) 数据快照与来源", "1) Snapshots & Source").to_string());
        lines.push(
            config
                .lang
                .pick("- 来源：用户粘贴文本（本地）", "- Source: user-pasted text (local)")
                .to_string(),
        );
        if en {
            lines.push(format!("- League: {}", m.league.as_deref().unwrap_or("N/A")));
        } else {
            lines.push(format!("- 联赛：{}", m.league.as_deref().unwrap_or("未提供")));
        }
        // Metric names, same in both languages.
        lines.push(format!("- V_total：{}", opt_num(m.total_volume, "数据缺失/未验证")));
        lines.push(format!("- H_fav：{}", opt_num(h_fav, "数据缺失/未验证")));
        lines.push(format!("- PL_fav：{}", opt_num(pl_fav, "数据缺失/未验证")));
        if en {
            lines.push(format!(
                "- Time T: {}",
                m.time_point.as_deref().unwrap_or("missing/unverified")
            ));
            lines.push(format!("- Snapshot count (T1/T2...): {}", snapshot_count));
        } else {
            lines.push(format!(
                "- 时间点T：{}",
                m.time_point.as_deref().unwrap_or("数据缺失/未验证")
            ));
            lines.push(format!("- 快照数(T1/T2...)：{}", snapshot_count));
        }

        if audit.hard_stopped {
            lines.push(config.lang.pick("2) 风险审计表", "2) Risk Audit Table").to_string());
            lines.push("| 项目 | 结果 |".to_string());
            lines.push("|---|---|".to_string());
            lines.push(
                config.lang.pick("| 状态 | 停机协议触发 |", "| Status | Hard-stop triggered |").to_string(),
            );
            lines.push(config.lang.pick("3) 关键证据", "3) Key Evidence").to_string());
            lines.push(
                config
                    .lang
                    .pick(
                        "- A1失败：关键字段缺失或快照不足（需至少T1/T2）",
                        "- A1 failed: critical fields missing or snapshots < 2 (need T1/T2)",
                    )
                    .to_string(),
            );
            lines.push(
                config.lang.pick("4) 研究性建议（非执行）", "4) Research Notes (non-execution)").to_string(),
            );
            lines.push(
                config
                    .lang
                    .pick(
                        "- 当前禁止风险判定，请补齐数据后重算",
                        "- Risk audit is blocked. Please complete fields and rerun.",
                    )
                    .to_string(),
            );
            lines.push(config.lang.pick("5) 数据索取清单", "5) Data request checklist").to_string());
            lines.push(
                config
                    .lang
                    .pick(
                        "- 至少两档快照：T1/T2（H_fav, PL_fav, V_total）",
                        "- At least two snapshots: T1/T2 (H_fav, PL_fav, V_total)",
                    )
                    .to_string(),
            );
            lines.push(
                config
                    .lang
                    .pick(
                        "- 明确时间点T（示例：T=0.8h / T=45m）",
                        "- Explicit time point T (e.g. T=0.8h / T=45m)",
                    )
                    .to_string(),
            );
            lines.push(String::new());
            continue;
        }

        let sep = config.lang.pick("；", "; ");
        let decisive = audit.ranked.first();

        lines.push(config.lang.pick("2) 风险审计表", "2) Risk Audit Table").to_string());
        lines.push(config.lang.pick("| 项目 | 数值 |", "| Item | Value |").to_string());
        lines.push("|---|---|".to_string());
        lines.push(format!("| ratio | {:.2}% |", audit.ratio));
        if en {
            lines.push(format!("| Tag | {} |", audit.tag));
        } else {
            lines.push(format!("| 标签 | {} |", audit.tag));
        }
        match decisive {
            Some(rule) if en => {
                lines.push(format!("| Decisive Rule | {} (priority #{}) |", rule.name, rule.rank()));
            }
            Some(rule) => {
                lines.push(format!("| 决定性规则 | {}（优先级#{}） |", rule.name, rule.rank()));
            }
            None if en => lines.push("| Decisive Rule | none |".to_string()),
            None => lines.push("| 决定性规则 | 无 |".to_string()),
        }
        if en {
            lines.push(format!("| Decisive Rule Explanation | {} |", audit.explanation));
        } else {
            lines.push(format!("| 决定性规则解释 | {} |", audit.explanation));
        }
        let top3 = if audit.ranked.is_empty() {
            config.lang.pick("无", "none").to_string()
        } else {
            audit
                .ranked
                .iter()
                .take(3)
                .map(|r| format!("{}(#{})", r.name, r.rank()))
                .collect::<Vec<_>>()
                .join(sep)
        };
        if en {
            lines.push(format!("| Top 3 Rules | {} |", top3));
        } else {
            lines.push(format!("| Top3规则 | {} |", top3));
        }
        let all_fired = if audit.ranked.is_empty() {
            config.lang.pick("无", "none").to_string()
        } else {
            audit.ranked.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(sep)
        };
        if en {
            lines.push(format!("| Triggered Rules | {} |", all_fired));
        } else {
            lines.push(format!("| 触发规则 | {} |", all_fired));
        }
        lines.push(config.lang.pick("3) 关键证据", "3) Key Evidence").to_string());
        for e in audit.evidence.iter().take(6) {
            lines.push(format!("- {}", e));
        }
        lines.push(
            config.lang.pick("4) 研究性建议（非执行）", "4) Research Notes (non-execution)").to_string(),
        );
        if en {
            lines.push(format!(
                "- Risk level: {} (research-only, not execution advice)",
                audit.risk.label(config.lang)
            ));
        } else {
            lines.push(format!("- 风险等级：{}（仅研究用途，不构成执行建议）", audit.risk.label(config.lang)));
        }
        lines.push(config.lang.pick("5) 复盘映射（可选）", "5) Review Mapping (optional)").to_string());
        lines.push(
            config
                .lang
                .pick(
                    "- 可用 /lock /settle /review /tune 归档迭代",
                    "- Use /lock /settle /review /tune for review workflow",
                )
                .to_string(),
        );
        lines.push(String::new());
    }

    lines.join("\n")
}
