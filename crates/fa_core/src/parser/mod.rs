//! Market-text parser.
//!
//! Converts free-form, human-pasted betting-market text into ordered
//! [`MatchInput`] records, one per non-blank line that contains a
//! recognizable team separator (`vs` in any Latin casing, or `对`).
//! Lines without a separator are silently dropped; there is no partial
//! record and no error for unparseable lines.
//!
//! Every field extractor is independent and optional. For each triple
//! field several label synonyms are tried in a fixed priority order and
//! the first pattern that matches wins.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::models::{MatchInput, Triple};

/// Numeric token: optionally signed, thousands separators, optional `%`.
const NUM: &str = r"[-+]?\d[\d,.]*%?";

fn triple_pattern(labels: [&str; 3]) -> Regex {
    let p = format!(
        r"{l0}[:：]?\s*({n})\s*[|｜/\s]+{l1}[:：]?\s*({n})\s*[|｜/\s]+{l2}[:：]?\s*({n})",
        l0 = labels[0],
        l1 = labels[1],
        l2 = labels[2],
        n = NUM,
    );
    Regex::new(&p).expect("triple pattern is valid")
}

fn compile(sets: &[[&str; 3]]) -> Vec<Regex> {
    sets.iter().map(|s| triple_pattern(*s)).collect()
}

static ODDS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        ["成交价主", "平", "客"],
        ["成交价", "平", "客"],
        ["主", "平", "客"],
        ["主胜", "平", "客胜"],
    ])
});

static VOLUME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        ["交易量主", "平", "客"],
        ["量主", "平", "客"],
        ["主量", "平量", "客量"],
    ])
});

static SHARE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        ["占比主", "平", "客"],
        ["占比", "平", "客"],
        ["主占比", "平占比", "客占比"],
    ])
});

static PNL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        ["盈亏主", "平", "客"],
        ["庄家盈亏主", "平", "客"],
        ["庄盈主", "平", "客"],
        ["主盈亏", "平盈亏", "客盈亏"],
    ])
});

static HEAT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        ["冷热主", "平", "客"],
        ["热度主", "平", "客"],
        ["主冷热", "平冷热", "客冷热"],
    ])
});

static HANDICAP_ODDS_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[["让胜", "让平", "让负"], ["让主", "让平", "让客"]]));

static TEAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*(?:vs|VS|Vs|vS|对)\s*(.*)$").expect("team pattern"));

/// First labeled field after the away-team name; the away name stops here.
static FIELD_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+(?:成交价|交易量|占比|总交易量|盈亏|庄盈|冷热|让球)").expect("field pattern")
});

static TOTAL_VOLUME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"总交易量[:：]?\s*([\d,，.]+)").expect("total volume pattern"));

static HANDICAP_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"让球\s*([-+]?\d+(?:\.\d+)?)").expect("handicap line pattern"));

static TIME_POINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)T[:=]\s*(\S+)").expect("time point pattern"));

static SNAPSHOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"快照[:=]\s*(\d+)").expect("snapshot pattern"));

static LEAGUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)联赛[:=]\s*([^\s|]+)").expect("league pattern"));

static H_EARLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)H_early[:=]\s*([-+]?\d+(?:\.\d+)?)").expect("h_early pattern"));

static H_LAST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)H_last[:=]\s*([-+]?\d+(?:\.\d+)?)").expect("h_last pattern"));

static LOSS_PRESSURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)loss_pressure[:=]\s*([-+]?\d+(?:\.\d+)?)").expect("loss_pressure pattern")
});

/// Normalize and parse one numeric token.
///
/// Thousands separators (`,`/`，`) and percent signs are stripped first.
/// The placeholder `—` and the empty string parse to `None`, never to
/// zero; a token that still fails numeric parsing is also `None`.
fn to_num(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| !matches!(c, ',' | '，' | '%')).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "—" {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn parse_triple(line: &str, patterns: &[Regex]) -> Option<Triple> {
    for re in patterns {
        if let Some(caps) = re.captures(line) {
            return Some(Triple {
                home: caps.get(1).and_then(|m| to_num(m.as_str())),
                draw: caps.get(2).and_then(|m| to_num(m.as_str())),
                away: caps.get(3).and_then(|m| to_num(m.as_str())),
            });
        }
    }
    None
}

fn capture(line: &str, re: &Regex) -> Option<String> {
    re.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

fn capture_num(line: &str, re: &Regex) -> Option<f64> {
    capture(line, re).as_deref().and_then(to_num)
}

/// Split a line into home/away team names, or `None` when the line has
/// no team separator. The away name runs up to the first labeled field.
fn parse_teams(line: &str) -> Option<(String, String)> {
    let caps = TEAM_RE.captures(line)?;
    let home = caps.get(1)?.as_str().trim();
    let rest = caps.get(2)?.as_str();
    let away = match FIELD_START_RE.find(rest) {
        Some(m) => rest[..m.start()].trim(),
        None => rest.trim(),
    };
    Some((home.to_string(), away.to_string()))
}

fn parse_line(line: &str, idx: usize, now_millis: i64) -> Option<MatchInput> {
    let (home_team, away_team) = match parse_teams(line) {
        Some(teams) => teams,
        None => {
            trace!(line, "dropping line without team separator");
            return None;
        }
    };

    Some(MatchInput {
        id: format!("m_{}_{}", now_millis, idx),
        raw_line: line.to_string(),
        home_team,
        away_team,
        market_odds: parse_triple(line, &ODDS_PATTERNS),
        volume: parse_triple(line, &VOLUME_PATTERNS),
        share: parse_triple(line, &SHARE_PATTERNS),
        total_volume: capture_num(line, &TOTAL_VOLUME_RE),
        pnl: parse_triple(line, &PNL_PATTERNS),
        heat: parse_triple(line, &HEAT_PATTERNS),
        handicap_line: capture_num(line, &HANDICAP_LINE_RE),
        handicap_odds: parse_triple(line, &HANDICAP_ODDS_PATTERNS),
        time_point: capture(line, &TIME_POINT_RE),
        snapshot_count: capture(line, &SNAPSHOT_RE).and_then(|s| s.parse().ok()),
        league: capture(line, &LEAGUE_RE),
        h_early: capture_num(line, &H_EARLY_RE),
        h_last: capture_num(line, &H_LAST_RE),
        loss_pressure: capture_num(line, &LOSS_PRESSURE_RE),
    })
}

/// Parse raw multi-line text into an ordered sequence of [`MatchInput`].
///
/// Line order is preserved. Ids embed wall-clock millis plus the line
/// index, so only the non-id fields are reproducible across calls.
pub fn parse_input(raw: &str) -> Vec<MatchInput> {
    let now_millis = Utc::now().timestamp_millis();
    let parsed: Vec<MatchInput> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
        .filter_map(|(idx, line)| parse_line(line, idx, now_millis))
        .collect();
    debug!(parsed = parsed.len(), "parsed market text");
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "马德里竞技 vs 巴塞罗那 成交价主 2.82 | 平 4.10 | 客 2.50 交易量主 301198 | 平 103703 | 客 739440 占比主 26.3% | 平 9.1% | 客 64.6% 总交易量 1144341 盈亏主 294963 | 平 719159 | 客 -704259 让球 -0.25 让胜 1.95 | 让平 3.50 | 让负 3.60";

    #[test]
    fn to_num_normalizes_separators_and_percent() {
        assert_eq!(to_num("1,144,341"), Some(1144341.0));
        assert_eq!(to_num("26.3%"), Some(26.3));
        assert_eq!(to_num("-704259"), Some(-704259.0));
        assert_eq!(to_num("+0.5"), Some(0.5));
        assert_eq!(to_num("—"), None);
        assert_eq!(to_num(""), None);
        assert_eq!(to_num("n/a"), None);
    }

    #[test]
    fn triple_extraction_is_exact_on_normalized_text() {
        let t = parse_triple("主 2.82 | 平 4.10 | 客 2.50", &ODDS_PATTERNS).unwrap();
        assert_eq!(t.home, Some(2.82));
        assert_eq!(t.draw, Some(4.10));
        assert_eq!(t.away, Some(2.50));
    }

    #[test]
    fn full_sample_line_extracts_every_field() {
        let parsed = parse_input(SAMPLE);
        assert_eq!(parsed.len(), 1);
        let m = &parsed[0];
        assert_eq!(m.home_team, "马德里竞技");
        assert_eq!(m.away_team, "巴塞罗那");
        assert_eq!(m.market_odds.unwrap().home, Some(2.82));
        assert_eq!(m.volume.unwrap().away, Some(739440.0));
        assert_eq!(m.share.unwrap().away, Some(64.6));
        assert_eq!(m.total_volume, Some(1144341.0));
        assert_eq!(m.pnl.unwrap().away, Some(-704259.0));
        assert_eq!(m.handicap_line, Some(-0.25));
        assert_eq!(m.handicap_odds.unwrap().draw, Some(3.50));
        assert!(m.heat.is_none());
    }

    #[test]
    fn hard_rule_fields_are_recognized() {
        let line = "曼城 vs 利物浦 占比主 82 | 平 9 | 客 9 总交易量 3200000 盈亏主 -1760000 | 平 520000 | 客 810000 T=0.8h 快照=2 联赛=EPL H_early=94 H_last=81 loss_pressure=8";
        let m = &parse_input(line)[0];
        assert_eq!(m.time_point.as_deref(), Some("0.8h"));
        assert_eq!(m.snapshot_count, Some(2));
        assert_eq!(m.league.as_deref(), Some("EPL"));
        assert_eq!(m.h_early, Some(94.0));
        assert_eq!(m.h_last, Some(81.0));
        assert_eq!(m.loss_pressure, Some(8.0));
    }

    #[test]
    fn chinese_separator_and_pipe_variants_parse() {
        let m = &parse_input("国安 对 申花 成交价主 2.10｜平 3.30｜客 3.40")[0];
        assert_eq!(m.home_team, "国安");
        assert_eq!(m.away_team, "申花");
        assert_eq!(m.market_odds.unwrap().draw, Some(3.30));
    }

    #[test]
    fn win_draw_loss_label_variant_parses() {
        let t = parse_triple("主胜 2.10｜平 3.30｜客胜 3.40", &ODDS_PATTERNS).unwrap();
        assert_eq!(t.home, Some(2.10));
        assert_eq!(t.away, Some(3.40));
    }

    #[test]
    fn lines_without_separator_are_dropped_and_order_preserved() {
        let raw = format!("无效行 没有分隔符\n{}\n\n另一行垃圾\n曼城 vs 利物浦 占比主 82 | 平 9 | 客 9", SAMPLE);
        let parsed = parse_input(&raw);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].home_team, "马德里竞技");
        assert_eq!(parsed[1].home_team, "曼城");
    }

    #[test]
    fn placeholder_field_leaves_the_triple_absent() {
        // A dash is not a numeric token, so no label set matches.
        let m = &parse_input("A队 vs B队 占比主 — | 平 20 | 客 30")[0];
        assert!(m.share.is_none());
        assert_eq!(m.away_team, "B队");
    }

    #[test]
    fn ids_are_unique_within_a_parse() {
        let parsed = parse_input("甲 vs 乙\n丙 vs 丁\n戊 vs 己");
        assert_eq!(parsed.len(), 3);
        assert_ne!(parsed[0].id, parsed[1].id);
        assert_ne!(parsed[1].id, parsed[2].id);
    }

    proptest! {
        // Lines that cannot contain a team separator never yield records
        // and never panic the parser.
        #[test]
        fn junk_without_separator_parses_to_nothing(raw in "[abcdefgh0-9,.%|: ]{0,80}") {
            prop_assert!(parse_input(&raw).is_empty());
        }

        #[test]
        fn num_tokens_never_panic(tok in r"[-+,，%.\d—]{0,16}") {
            let _ = to_num(&tok);
        }
    }
}
