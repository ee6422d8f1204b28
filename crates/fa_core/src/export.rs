//! History export: a plain-text archive block per entry.
//!
//! Export prefers re-deriving the output under the requested language
//! so the archived text matches what the entry's config would produce
//! today. When the stored config snapshot no longer decodes, the
//! stored output text is used instead and the payload says so.

use chrono::DateTime;
use tracing::warn;

use crate::engine::analyze_matches;
use crate::error::Result;
use crate::i18n::Lang;
use crate::models::{HistoryItem, StrategyConfig};
use crate::parser::parse_input;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub text: String,
    pub used_fallback: bool,
    /// Decode failure message when `used_fallback` is set, else empty.
    pub reason: String,
}

fn format_timestamp(iso: &str, lang: Lang) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(dt) => dt
            .format(lang.pick("%Y/%m/%d %H:%M:%S", "%m/%d/%Y %H:%M:%S"))
            .to_string(),
        Err(_) => iso.to_string(),
    }
}

/// Renders one history entry as archive text with its stored output.
pub fn build_export_text(item: &HistoryItem, lang: Lang) -> String {
    let config_json = serde_json::to_string_pretty(&item.config_snapshot)
        .unwrap_or_else(|_| item.config_snapshot.to_string());
    [
        format!("{}: {}", lang.pick("时间", "Time"), format_timestamp(&item.created_at, lang)),
        format!("{}: {}", lang.pick("解析场次", "Parsed matches"), item.parsed_count),
        String::new(),
        lang.pick("--- 输入 ---", "--- INPUT ---").to_string(),
        item.input_text.clone(),
        String::new(),
        lang.pick("--- 参数 ---", "--- CONFIG ---").to_string(),
        config_json,
        String::new(),
        lang.pick("--- 输出 ---", "--- OUTPUT ---").to_string(),
        item.output_text.clone(),
        String::new(),
    ]
    .join("\n")
}

fn recompute_output(item: &HistoryItem, lang: Lang) -> Result<String> {
    let mut config: StrategyConfig = serde_json::from_value(item.config_snapshot.clone())?;
    config.lang = lang;
    let matches = parse_input(&item.input_text);
    Ok(analyze_matches(&matches, &config).output_text)
}

/// Builds the export text, re-deriving the output in the requested
/// language and falling back to the stored output when the snapshot
/// fails to decode.
pub fn build_export_payload(item: &HistoryItem, lang: Lang) -> ExportPayload {
    match recompute_output(item, lang) {
        Ok(output_text) => {
            let fresh = HistoryItem { output_text, ..item.clone() };
            ExportPayload {
                text: build_export_text(&fresh, lang),
                used_fallback: false,
                reason: String::new(),
            }
        }
        Err(err) => {
            warn!(id = %item.id, error = %err, "export recompute failed, using stored output");
            let reason = err.to_string();
            let note = if lang.is_en() {
                format!(
                    "\n\n[fallback] Recompute failed, fell back to stored historical output. Reason: {}",
                    reason
                )
            } else {
                format!("\n\n[fallback] 重算失败，已回退历史存档输出。原因：{}", reason)
            };
            let stale = HistoryItem {
                output_text: format!("{}{}", item.output_text, note),
                ..item.clone()
            };
            ExportPayload { text: build_export_text(&stale, lang), used_fallback: true, reason }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "马德里竞技 vs 巴塞罗那 成交价主 2.82 | 平 4.10 | 客 2.50 占比主 26.3% | 平 9.1% | 客 64.6% 总交易量 1144341 盈亏主 294963 | 平 719159 | 客 -704259 让球 -0.25 让胜 1.95 | 让平 3.50 | 让负 3.60";

    fn sample_item() -> HistoryItem {
        let config = StrategyConfig::default();
        let matches = parse_input(SAMPLE);
        let result = analyze_matches(&matches, &config);
        HistoryItem {
            id: "h1".to_string(),
            created_at: "2026-02-13T08:00:00Z".to_string(),
            input_text: SAMPLE.to_string(),
            output_text: result.output_text,
            parsed_count: result.parsed_count,
            config_snapshot: serde_json::to_value(&config).unwrap(),
        }
    }

    #[test]
    fn export_text_has_input_config_output_sections() {
        let item = sample_item();

        let zh = build_export_text(&item, Lang::Zh);
        assert!(zh.contains("--- 输入 ---"));
        assert!(zh.contains("--- 参数 ---"));
        assert!(zh.contains("--- 输出 ---"));
        assert!(zh.contains("解析场次: 1"));

        let en = build_export_text(&item, Lang::En);
        assert!(en.contains("--- INPUT ---"));
        assert!(en.contains("--- CONFIG ---"));
        assert!(en.contains("--- OUTPUT ---"));
        assert!(en.contains("Time: 02/13/2026 08:00:00"));
    }

    #[test]
    fn payload_recomputes_in_requested_language() {
        let item = sample_item();

        let zh = build_export_payload(&item, Lang::Zh);
        assert!(!zh.used_fallback);
        assert!(zh.text.contains("【Footy Analyzer V1 建议】"));

        let en = build_export_payload(&item, Lang::En);
        assert!(!en.used_fallback);
        assert!(en.text.contains("[Footy Analyzer V1 Suggestions]"));
    }

    #[test]
    fn poisoned_snapshot_falls_back_to_stored_output() {
        let mut item = sample_item();
        let stored = item.output_text.clone();
        item.config_snapshot = serde_json::json!({"crowdThreshold": "oops"});

        let payload = build_export_payload(&item, Lang::Zh);
        assert!(payload.used_fallback);
        assert!(!payload.reason.is_empty());
        assert!(payload.text.contains(&stored));
        assert!(payload.text.contains("[fallback] 重算失败，已回退历史存档输出。"));
    }
}
