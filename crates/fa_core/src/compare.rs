//! Review comparison between two stored history entries.
//!
//! Both entries are re-analyzed from their stored input text under
//! their own config snapshots, with only the output language forced,
//! then diffed fixture by fixture.

use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::engine::analyze_matches;
use crate::error::Result;
use crate::i18n::Lang;
use crate::models::{AnalysisResult, HistoryItem, StrategyConfig};
use crate::parser::parse_input;
use crate::report::fmt_num;

static FIRST_FIXTURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*(?:vs|VS|Vs|vS|对)\s*(\S+)").unwrap());

/// Re-derived results for both sides plus the rendered diff text.
#[derive(Debug)]
pub struct CompareResult {
    pub text: String,
    pub a: AnalysisResult,
    pub b: AnalysisResult,
}

/// Identity key for "same fixture": home and away of the first
/// non-empty input line. Entries with unparseable first lines compare
/// by the raw line itself.
fn comparable_key(input_text: &str) -> String {
    let first = input_text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    match FIRST_FIXTURE_RE.captures(first) {
        Some(caps) => format!("{}__{}", caps[1].trim(), caps[2].trim()),
        None => first.to_string(),
    }
}

/// The newest two history entries covering the same fixture as `base`,
/// assuming `history` is ordered newest first.
pub fn find_latest_two_same_match<'a>(
    history: &'a [HistoryItem],
    base: &HistoryItem,
) -> Vec<&'a HistoryItem> {
    let key = comparable_key(&base.input_text);
    history
        .iter()
        .filter(|h| comparable_key(&h.input_text) == key)
        .take(2)
        .collect()
}

fn rerun(item: &HistoryItem, lang: Lang) -> Result<AnalysisResult> {
    let mut config: StrategyConfig = serde_json::from_value(item.config_snapshot.clone())?;
    config.lang = lang;
    let matches = parse_input(&item.input_text);
    Ok(analyze_matches(&matches, &config))
}

fn format_timestamp(iso: &str, lang: Lang) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(dt) => dt
            .format(lang.pick("%Y/%m/%d %H:%M:%S", "%m/%d/%Y %H:%M:%S"))
            .to_string(),
        Err(_) => iso.to_string(),
    }
}

pub fn compare_history_items(
    a: &HistoryItem,
    b: &HistoryItem,
    lang: Lang,
) -> Result<CompareResult> {
    debug!(a = %a.id, b = %b.id, "comparing history entries");
    let ra = rerun(a, lang)?;
    let rb = rerun(b, lang)?;
    let en = lang.is_en();

    let mut lines: Vec<String> = Vec::new();
    lines.push(lang.pick("【复盘对比】", "[Review Compare]").to_string());
    lines.push(format!("A: {}", format_timestamp(&a.created_at, lang)));
    lines.push(format!("B: {}", format_timestamp(&b.created_at, lang)));
    lines.push(String::new());

    let max = ra.analyses.len().max(rb.analyses.len());
    for i in 0..max {
        let ma = ra.analyses.get(i);
        let mb = rb.analyses.get(i);
        let home = ma
            .or(mb)
            .map(|m| m.input.home_team.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("—");
        let away = ma
            .or(mb)
            .map(|m| m.input.away_team.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("—");
        lines.push(format!("{}. {} vs {}", i + 1, home, away));

        let rec = |m: Option<&crate::models::MatchAnalysis>| {
            m.map_or("—", |m| m.recommendation.label(lang))
        };
        let risk =
            |m: Option<&crate::models::MatchAnalysis>| m.map_or("—", |m| m.risk.label(lang));
        let handicap = |m: Option<&crate::models::MatchAnalysis>| {
            m.and_then(|m| m.handicap_recommendation)
                .map_or("—", |h| h.label(lang))
        };
        lines.push(format!(
            "{}: {} → {}",
            lang.pick("- 推荐", "- Recommendation"),
            rec(ma),
            rec(mb)
        ));
        lines.push(format!("{}: {} → {}", lang.pick("- 风险", "- Risk"), risk(ma), risk(mb)));
        lines.push(format!(
            "{}: {} → {}",
            lang.pick("- 让球", "- Handicap"),
            handicap(ma),
            handicap(mb)
        ));
        lines.push(String::new());
    }

    lines.push(lang.pick("【预算对比】", "[Budget Compare]").to_string());
    lines.push(format!(
        "{}: {} → {}",
        lang.pick("- 主预算", "- Main budget"),
        fmt_num(ra.budget_plan.total),
        fmt_num(rb.budget_plan.total)
    ));
    lines.push(format!(
        "{}: {} → {}",
        lang.pick("- 主串", "- Parlay"),
        fmt_num(ra.budget_plan.parlay),
        fmt_num(rb.budget_plan.parlay)
    ));
    lines.push(format!(
        "{}: {} → {}",
        lang.pick("- 单场", "- Single"),
        fmt_num(ra.budget_plan.single),
        fmt_num(rb.budget_plan.single)
    ));
    lines.push(format!(
        "{}: {} → {}",
        lang.pick("- 博冷", "- Cold hedge"),
        fmt_num(ra.budget_plan.cold_hedge),
        fmt_num(rb.budget_plan.cold_hedge)
    ));

    Ok(CompareResult { text: lines.join("\n"), a: ra, b: rb })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrategyConfig;

    const SAMPLE: &str = "布伦特福德 vs 阿森纳 成交价主 5.70 | 平 4.10 | 客 1.73 占比主 9.1% | 平 3.1% | 客 87.8% 总交易量 1886713 盈亏主 905948 | 平 1649450 | 客 -979516 冷热主 -51 | 平 -87 | 客 55 让球 -1 让胜 2.23 | 让平 3.22 | 让负 2.70";

    fn history_item(id: &str, created_at: &str, config: &StrategyConfig) -> HistoryItem {
        let matches = parse_input(SAMPLE);
        let result = analyze_matches(&matches, config);
        HistoryItem {
            id: id.to_string(),
            created_at: created_at.to_string(),
            input_text: SAMPLE.to_string(),
            output_text: result.output_text,
            parsed_count: result.parsed_count,
            config_snapshot: serde_json::to_value(config).unwrap(),
        }
    }

    #[test]
    fn same_fixture_entries_are_paired_newest_first() {
        let config = StrategyConfig::default();
        let h1 = history_item("h1", "2026-02-13T08:00:00Z", &config);
        let h2 = history_item("h2", "2026-02-13T07:59:59Z", &config);
        let other = HistoryItem {
            input_text: "皇马 vs 拜仁 占比主 50 | 平 25 | 客 25".to_string(),
            ..history_item("h3", "2026-02-13T07:00:00Z", &config)
        };
        let history = vec![h1.clone(), h2, other];

        let pair = find_latest_two_same_match(&history, &h1);
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0].id, "h1");
        assert_eq!(pair[1].id, "h2");
    }

    #[test]
    fn compare_renders_review_and_budget_sections() {
        let a = history_item("h1", "2026-02-13T08:00:00Z", &StrategyConfig::default());
        let loose =
            StrategyConfig { crowd_threshold: 70.0, ..StrategyConfig::default() };
        let b = history_item("h2", "2026-02-13T07:59:59Z", &loose);

        let cmp = compare_history_items(&a, &b, Lang::Zh).unwrap();
        assert!(cmp.text.contains("【复盘对比】"));
        assert!(cmp.text.contains("【预算对比】"));
        assert!(cmp.text.contains("布伦特福德 vs 阿森纳"));
        assert!(cmp.text.contains("- 推荐: 客胜 → 客胜"));

        let cmp_en = compare_history_items(&a, &b, Lang::En).unwrap();
        assert!(cmp_en.text.contains("[Review Compare]"));
        assert!(cmp_en.text.contains("[Budget Compare]"));
        assert!(cmp_en.text.contains("- Risk: High → High"));
    }

    #[test]
    fn undecodable_snapshot_is_an_error() {
        let mut item = history_item("h1", "2026-02-13T08:00:00Z", &StrategyConfig::default());
        item.config_snapshot = serde_json::json!({"crowdThreshold": "oops"});
        assert!(compare_history_items(&item, &item, Lang::Zh).is_err());
    }
}
