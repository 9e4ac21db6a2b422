//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// All three stages, peer rankings and the aggregate table
    Full,
    /// Only the chairman's synthesis
    Synthesis,
    /// JSON output
    Json,
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => council_domain::OutputFormat::Full,
            OutputFormat::Synthesis => council_domain::OutputFormat::Synthesis,
            OutputFormat::Json => council_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for llm-council
#[derive(Parser, Debug)]
#[command(name = "llm-council")]
#[command(author, version, about = "LLM Council - several models answer, rank each other, and a chairman synthesizes")]
#[command(long_about = r#"
llm-council puts one question to a council of LLMs and returns a single answer.

The deliberation has three stages:
1. Responses: every council member answers the question in parallel
2. Peer Rankings: each rater ranks the anonymized answers (Response A, B, ...)
3. Synthesis: the chairman writes the final answer from the answers and rankings

Configuration is merged from (highest priority first):
1. LLM_COUNCIL_* environment variables (e.g. LLM_COUNCIL_COUNCIL__CHAIRMAN)
2. --config <path>                        Explicit config file
3. ./council.toml or ./.council.toml      Project-level config
4. ~/.config/llm-council/config.toml      Global config

Example:
  llm-council "What causes ocean tides?"
  llm-council -m openai/gpt-4o -m x-ai/grok-4 --chairman google/gemini-2.5-pro "Compare Rust and Go"
  llm-council -o json --title "Is P = NP?"
"#)]
pub struct Cli {
    /// The question to put to the council
    #[arg(required_unless_present = "show_config")]
    pub question: Option<String>,

    /// Council members (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Model that writes the final synthesis
    #[arg(long, value_name = "MODEL")]
    pub chairman: Option<String>,

    /// Stage-2 raters (can be specified multiple times; defaults to the council)
    #[arg(long, value_name = "MODEL")]
    pub rater: Vec<String>,

    /// Output format [default: synthesis]
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Also generate a short conversation title
    #[arg(long)]
    pub title: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", conflicts_with = "no_config")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Directory for daily-rolling diagnostic log files
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}
