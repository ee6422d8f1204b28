//! Footy Analyzer CLI
//!
//! Paste-text → analysis report, on the command line. Reads the raw
//! market text from a file or stdin and prints either the rendered
//! report or the structured result as JSON.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use std::io::Read;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing::info;

#[cfg(feature = "cli")]
use fa_core::{analyze_matches, parse_input, ExplanationStyle, Lang, StrategyConfig};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "fa")]
#[command(version = fa_core::VERSION)]
#[command(about = "Analyze pasted betting-market text", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum LangArg {
    Zh,
    En,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Auto,
    Short,
    Long,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Run the analysis pipeline and print the report
    Analyze {
        /// Input text file; reads stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        /// Report language
        #[arg(long, value_enum, default_value = "zh")]
        lang: LangArg,

        /// Run the v3.8 hard-rule audit instead of the heuristic strategy
        #[arg(long)]
        policy_v38: bool,

        /// Explanation style for the hard-rule audit
        #[arg(long, value_enum, default_value = "auto")]
        style: StyleArg,

        /// Resolve the auto explanation style to the short variant
        #[arg(long)]
        mobile: bool,

        /// Disable handicap suggestions
        #[arg(long)]
        no_handicap: bool,

        /// Crowding threshold on the picked direction's share (%)
        #[arg(long)]
        crowd_threshold: Option<f64>,

        /// Very-hot threshold on the picked direction's heat
        #[arg(long)]
        heat_threshold: Option<f64>,

        /// Total main budget in RMB
        #[arg(long)]
        total_budget: Option<f64>,

        /// Parlay share of the main budget in RMB
        #[arg(long)]
        parlay_budget: Option<f64>,

        /// Single-flex share of the main budget in RMB
        #[arg(long)]
        single_budget: Option<f64>,

        /// Conditional cold-hedge amount in RMB
        #[arg(long)]
        cold_budget: Option<f64>,

        /// Short-tag override, RULE=TEXT (repeatable, e.g. B1=#红区)
        #[arg(long = "tag-override", value_name = "RULE=TEXT")]
        tag_overrides: Vec<String>,

        /// Print the full result as JSON instead of the report text
        #[arg(long)]
        json: bool,
    },

    /// Parse only: print the structured fixture records as JSON
    Parse {
        /// Input text file; reads stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn read_raw(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

#[cfg(feature = "cli")]
fn parse_tag_override(spec: &str) -> Result<(String, String)> {
    let (rule, text) = spec
        .split_once('=')
        .with_context(|| format!("invalid --tag '{}', expected RULE=TEXT", spec))?;
    Ok((rule.trim().to_string(), text.trim().to_string()))
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            lang,
            policy_v38,
            style,
            mobile,
            no_handicap,
            crowd_threshold,
            heat_threshold,
            total_budget,
            parlay_budget,
            single_budget,
            cold_budget,
            tag_overrides,
            json,
        } => {
            let mut config = StrategyConfig {
                lang: match lang {
                    LangArg::Zh => Lang::Zh,
                    LangArg::En => Lang::En,
                },
                policy_v38_enabled: policy_v38,
                v38_explanation_style: match style {
                    StyleArg::Auto => ExplanationStyle::Auto,
                    StyleArg::Short => ExplanationStyle::Short,
                    StyleArg::Long => ExplanationStyle::Long,
                },
                v38_is_mobile: mobile,
                handicap_enabled: !no_handicap,
                ..StrategyConfig::default()
            };
            if let Some(v) = crowd_threshold {
                config.crowd_threshold = v;
            }
            if let Some(v) = heat_threshold {
                config.heat_threshold = v;
            }
            if let Some(v) = total_budget {
                config.total_budget = v;
            }
            if let Some(v) = parlay_budget {
                config.parlay_budget = v;
            }
            if let Some(v) = single_budget {
                config.single_budget = v;
            }
            if let Some(v) = cold_budget {
                config.cold_budget = v;
            }
            for spec in &tag_overrides {
                let (rule, text) = parse_tag_override(spec)?;
                config.v38_tag_overrides.insert(rule, text);
            }

            let raw = read_raw(input.as_ref())?;
            let matches = parse_input(&raw);
            let result = analyze_matches(&matches, &config);
            info!(
                fixtures = result.parsed_count,
                hard_rules = config.policy_v38_enabled,
                "analysis complete"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.output_text);
            }
        }

        Commands::Parse { input } => {
            let raw = read_raw(input.as_ref())?;
            let matches = parse_input(&raw);
            info!(fixtures = matches.len(), "parse complete");
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("fa CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn tag_override_spec_splits_on_first_equals() {
        let (rule, text) = parse_tag_override("B1=#自定义红区").unwrap();
        assert_eq!(rule, "B1");
        assert_eq!(text, "#自定义红区");
        assert!(parse_tag_override("B1").is_err());
    }
}
