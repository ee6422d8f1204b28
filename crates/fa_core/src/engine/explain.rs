//! Decisive-rule explanation rendering.
//!
//! Two styles: `short` renders a compact tag line (per-rule label with
//! config override, risk tag, ratio tag), `long` maps each rule id to
//! one fixed explanatory sentence. `auto` resolves to short on the
//! mobile device hint and long otherwise. Overrides are a lookup with
//! default-on-miss semantics; defaults are never mutated.

use crate::engine::hard_rules::{FiredRule, RuleId};
use crate::models::config::ExplanationStyle;
use crate::models::{RiskLevel, StrategyConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Style {
    Short,
    Long,
}

pub(crate) fn resolve_style(config: &StrategyConfig) -> Style {
    match config.v38_explanation_style {
        ExplanationStyle::Short => Style::Short,
        ExplanationStyle::Long => Style::Long,
        ExplanationStyle::Auto => {
            if config.v38_is_mobile {
                Style::Short
            } else {
                Style::Long
            }
        }
    }
}

/// Override key and static fallback label for the short tag line.
fn short_label_parts(rule: Option<&FiredRule>) -> (&'static str, &'static str) {
    let rule = match rule {
        None => return ("BASE", "#基础分段"),
        Some(r) => r,
    };
    match rule.id {
        RuleId::RedZone => ("B1", "#B1红区熔断"),
        RuleId::AutoVoid => ("C0", "#样本作废"),
        RuleId::Imminent => ("C1", "#临场覆盖"),
        RuleId::MegaExempt => ("C2", "#巨量豁免"),
        RuleId::StandardExempt => ("C3", "#标准豁免"),
        RuleId::Corridor => ("C8", "#高风险走廊"),
        RuleId::HollowHeat => ("C9", "#空心热度"),
        RuleId::ExtremeHollow => ("C10", "#极端空心"),
        RuleId::Regression => ("C7", "#回归撤销"),
        RuleId::LowVolumeDerate => ("C6", "#降级阀"),
        RuleId::Healthy => ("C11", "#结构健康"),
        RuleId::LeagueCalibration => ("D", "#联赛校准"),
        RuleId::MegaConsensus | RuleId::Parabola => ("OTHER", "#主规则"),
    }
}

fn pick_label<'a>(config: &'a StrategyConfig, key: &str, fallback: &'a str) -> &'a str {
    match config.v38_tag_overrides.get(key) {
        Some(text) if !text.trim().is_empty() => text.trim(),
        _ => fallback,
    }
}

/// Compact tag line: rule label + risk tag + one-decimal ratio tag.
pub(crate) fn short_tags(
    rule: Option<&FiredRule>,
    risk: RiskLevel,
    ratio: f64,
    config: &StrategyConfig,
) -> String {
    let risk_tag = match risk {
        RiskLevel::High => "#高风险",
        RiskLevel::Medium => "#中风险",
        RiskLevel::Low => "#低风险",
    };
    let (key, fallback) = short_label_parts(rule);
    format!("{} {} #ratio{:.1}", pick_label(config, key, fallback), risk_tag, ratio)
}

/// Explanation for the decisive rule (lowest rank among fired rules).
pub(crate) fn explain_decisive(
    decisive: Option<&FiredRule>,
    ratio: f64,
    ranked: &[FiredRule],
    style: Style,
    risk: RiskLevel,
    config: &StrategyConfig,
) -> String {
    let rule = match decisive {
        None => {
            return match style {
                Style::Short => short_tags(None, risk, ratio, config),
                Style::Long => "未命中规则，按基础压力分段。".to_string(),
            }
        }
        Some(r) => r,
    };

    if style == Style::Short {
        return short_tags(Some(rule), risk, ratio, config);
    }

    match rule.id {
        RuleId::RedZone => format!(
            "命中B1红区（ratio={:.2}%落在55%~60%）。该规则优先级最高，直接触发熔断解释。",
            ratio
        ),
        RuleId::AutoVoid => {
            "样本体量不足（V_total<50万），先判定样本作废。该判定优先于常规风险细分。".to_string()
        }
        RuleId::Imminent => {
            "已进入临场窗口（≤1小时），临场规则优先覆盖常规判定。结论以最终时点口径解释。".to_string()
        }
        RuleId::MegaExempt => {
            "巨量体量场（≥800万），触发更高熔断线口径。该规则改变压力阈值解释边界。".to_string()
        }
        RuleId::StandardExempt => {
            "标准体量豁免（300万~800万），熔断线按60%口径执行。用于避免中体量误熔断。".to_string()
        }
        RuleId::Corridor => {
            "高集中且庄家对热门方向承压，命中高风险走廊。该结构优先解释为高风险形态。".to_string()
        }
        RuleId::HollowHeat => {
            "热度高但盈亏压力不足，结构偏空心。故风险解释上调为谨慎级别。".to_string()
        }
        RuleId::ExtremeHollow => {
            "极端热度且损失压力偏低，触发极端空心警示。优先解释为异常结构而非常规热度。".to_string()
        }
        RuleId::Regression => {
            "末段集中度显著回落，触发回归撤销。用于抑制过度趋势化解读。".to_string()
        }
        RuleId::LowVolumeDerate => {
            "中低体量区间触发降级阀，风险上限被限制。避免小样本放大解释。".to_string()
        }
        RuleId::Healthy => {
            "结构指标满足健康条件，结论偏中性/健康解释。用于对冲单一风险信号。".to_string()
        }
        RuleId::LeagueCalibration => {
            format!("命中联赛校准标签（{}）。该层仅做解释增强，不覆盖B/C层主判定。", rule.name)
        }
        RuleId::MegaConsensus | RuleId::Parabola => {
            let top3: Vec<&str> =
                ranked.iter().take(3).map(|r| r.name.as_str()).collect();
            let top_hint = if top3.len() > 1 {
                format!(" 同时命中：{}。", top3[1..].join("；"))
            } else {
                String::new()
            };
            format!("命中优先级最高规则：{}。{}", rule.name, top_hint)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fired(id: RuleId, name: &str) -> FiredRule {
        FiredRule { id, name: name.to_string() }
    }

    #[test]
    fn short_tags_use_default_labels() {
        let config = StrategyConfig::default();
        let rule = fired(RuleId::RedZone, "B1 Red-Zone Meltdown");
        assert_eq!(
            short_tags(Some(&rule), RiskLevel::High, 55.0, &config),
            "#B1红区熔断 #高风险 #ratio55.0"
        );
        assert_eq!(short_tags(None, RiskLevel::Low, 3.2, &config), "#基础分段 #低风险 #ratio3.2");
    }

    #[test]
    fn overrides_replace_label_but_blank_falls_back() {
        let mut config = StrategyConfig::default();
        config.v38_tag_overrides.insert("B1".into(), "#自定义红区".into());
        config.v38_tag_overrides.insert("C0".into(), "   ".into());
        let b1 = fired(RuleId::RedZone, "B1 Red-Zone Meltdown");
        let c0 = fired(RuleId::AutoVoid, "C0 D0 Auto-Void");
        assert_eq!(
            short_tags(Some(&b1), RiskLevel::High, 55.0, &config),
            "#自定义红区 #高风险 #ratio55.0"
        );
        assert_eq!(
            short_tags(Some(&c0), RiskLevel::Medium, 2.5, &config),
            "#样本作废 #中风险 #ratio2.5"
        );
    }

    #[test]
    fn long_style_maps_rule_to_fixed_sentence() {
        let config = StrategyConfig::default();
        let rule = fired(RuleId::RedZone, "B1 Red-Zone Meltdown");
        let text = explain_decisive(
            Some(&rule),
            55.0,
            &[rule.clone()],
            Style::Long,
            RiskLevel::High,
            &config,
        );
        assert!(text.contains("ratio=55.00%"));
        assert!(text.contains("该规则优先级最高，直接触发熔断解释。"));
    }

    #[test]
    fn explanatory_rules_fall_back_to_generic_sentence_with_co_hits() {
        let config = StrategyConfig::default();
        let c4 = fired(RuleId::MegaConsensus, "C4 FΩ-EX-R 超大体量共识场（解释标签）");
        let c5 = fired(RuleId::Parabola, "C5 F-S 抛物线增量（弱证据）");
        let ranked = vec![c4.clone(), c5];
        let text =
            explain_decisive(Some(&c4), 12.0, &ranked, Style::Long, RiskLevel::Low, &config);
        assert!(text.starts_with("命中优先级最高规则：C4"));
        assert!(text.contains("同时命中：C5"));
    }

    #[test]
    fn no_rule_renders_neutral_sentence() {
        let config = StrategyConfig::default();
        let text = explain_decisive(None, 10.0, &[], Style::Long, RiskLevel::Low, &config);
        assert_eq!(text, "未命中规则，按基础压力分段。");
    }

    #[test]
    fn auto_style_resolves_by_device_hint() {
        let mut config = StrategyConfig::default();
        assert_eq!(resolve_style(&config), Style::Long);
        config.v38_is_mobile = true;
        assert_eq!(resolve_style(&config), Style::Short);
        config.v38_explanation_style = ExplanationStyle::Long;
        assert_eq!(resolve_style(&config), Style::Long);
    }
}
