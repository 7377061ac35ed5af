//! CLI command definitions and handlers

mod config;
pub mod evaluate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// doceval - Score documents for LLM and RAG readiness
#[derive(Parser, Debug)]
#[command(name = "doceval")]
#[command(
    version,
    subcommand_negates_reqs = true,
    about = "Score documents for LLM and RAG readiness with an Azure OpenAI deployment",
    long_about = "doceval splits each document into token-bounded chunks, asks an Azure OpenAI \
deployment to score every chunk on seven dimensions (relevance, factual accuracy, clarity, \
hallucination risk, style, RAG usability, citation quality) and combines the chunk scores \
into one token-weighted verdict per document.\n\n\
PATH can be a single file or a directory of .txt/.md documents.",
    after_help = "\
Examples:
  doceval docs/                                 Evaluate a directory, CSV to stdout
  doceval docs/ -r -f console                   Recurse, colored terminal report
  doceval guide.md -f json -o results.json      JSON report to a file
  doceval docs/ --dry-run                       Show chunking only, no API calls
  doceval config init                           Create ~/.config/doceval/config.toml

Credentials come from --api-key/--endpoint/--deployment, the AZURE_OPENAI_* \
environment variables, a .env file, or the user config file."
)]
pub struct Cli {
    /// File or directory of documents to evaluate
    #[arg(required = true)]
    pub path: Option<PathBuf>,

    /// Scan subdirectories recursively
    #[arg(long, short = 'r')]
    pub recursive: bool,

    /// Output format: csv, json, console
    #[arg(long, short = 'f', default_value = "csv", value_parser = ["csv", "json", "console"])]
    pub format: String,

    /// Output file path (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Azure OpenAI API key (or AZURE_OPENAI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Azure OpenAI endpoint URL (or AZURE_OPENAI_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Azure OpenAI deployment name (or AZURE_OPENAI_DEPLOYMENT)
    #[arg(long)]
    pub deployment: Option<String>,

    /// Azure OpenAI API version (default: 2024-02-15-preview)
    #[arg(long)]
    pub api_version: Option<String>,

    /// Sampling temperature, 0.0-2.0 (default: 0.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Total scoring attempts per chunk (default: 3)
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Token budget per chunk (default: 4000)
    #[arg(long)]
    pub max_tokens_per_chunk: Option<usize>,

    /// Tokenizer encoding (default: cl100k_base)
    #[arg(long, value_parser = ["cl100k_base", "p50k_base", "r50k_base"])]
    pub encoding: Option<String>,

    /// Default missing score keys to 0 instead of retrying the chunk
    #[arg(long)]
    pub lenient_scores: bool,

    /// Extra TOML config file, layered over the user config
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of documents evaluated in parallel (1-64)
    #[arg(long, default_value = "1", value_parser = parse_workers)]
    pub workers: usize,

    /// Stop evaluating after this many seconds (checked between chunks)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Segment documents and print chunk statistics without calling the API
    #[arg(long)]
    pub dry_run: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", env = "DOCEVAL_LOG_LEVEL", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the user config file (~/.config/doceval/config.toml)
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a commented example config (keeps an existing file)
    Init,
    /// Print the resolved configuration, API key masked
    Show,
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init => config::init(),
            ConfigAction::Show => config::show(cli.config),
        },
        None => {
            let options = evaluate::EvaluateOptions::from_cli(cli)?;
            evaluate::run(options)
        }
    }
}
