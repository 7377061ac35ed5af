//! Evaluate command - score every discovered document

use super::Cli;
use crate::ai::{AzureOpenAiScorer, RetryPolicy, Scorer, Sleeper};
use crate::config::{ConfigOverrides, EvalConfig};
use crate::documents::{Document, DocumentLoader, DocumentScanner};
use crate::models::{BatchSummary, DocumentOutcome};
use crate::pipeline::{CancelToken, Evaluator};
use crate::reporters::{self, OutputFormat};
use crate::text::{Segmenter, Tiktoken, TokenCounter};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Everything the evaluate command needs, taken from the parsed CLI
#[derive(Debug, Clone)]
pub struct EvaluateOptions {
    pub path: PathBuf,
    pub recursive: bool,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    pub workers: usize,
    pub timeout: Option<Duration>,
    pub dry_run: bool,
}

impl EvaluateOptions {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let path = cli.path.context("PATH is required")?;
        Ok(Self {
            path,
            recursive: cli.recursive,
            format: OutputFormat::from_str(&cli.format)?,
            output: cli.output,
            overrides: ConfigOverrides {
                api_key: cli.api_key,
                endpoint: cli.endpoint,
                deployment: cli.deployment,
                api_version: cli.api_version,
                max_tokens_per_chunk: cli.max_tokens_per_chunk,
                max_retries: cli.max_retries,
                temperature: cli.temperature,
                encoding: cli.encoding,
                lenient_scores: cli.lenient_scores,
                config_file: cli.config,
            },
            workers: cli.workers,
            timeout: cli.timeout.map(Duration::from_secs),
            dry_run: cli.dry_run,
        })
    }
}

/// Run the evaluate command
pub fn run(options: EvaluateOptions) -> Result<()> {
    // Configuration problems stop the run before any document is touched
    let config = EvalConfig::load(options.overrides.clone())?;

    let scanner = DocumentScanner::new(config.extensions.iter().cloned());
    let documents = scanner.scan(&options.path, options.recursive)?;
    if documents.is_empty() {
        eprintln!(
            "{} No documents found in {}",
            style("!").yellow(),
            options.path.display()
        );
        return Ok(());
    }
    info!("Found {} document(s)", documents.len());

    let counter = Tiktoken::new(config.encoding)?;
    let segmenter = Segmenter::new(counter, config.max_tokens_per_chunk)?;
    let loader = DocumentLoader::new(config.max_file_bytes);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()
        .context("Failed to start worker pool")?;

    if options.dry_run {
        let stats: Vec<ChunkStats> = pool.install(|| {
            documents
                .par_iter()
                .map(|doc| chunk_stats(doc, &loader, &segmenter))
                .collect()
        });
        let rendered = render_dry_run(&stats, segmenter.budget());
        return write_output(&rendered, options.output.as_deref());
    }

    let settings = config.scorer_settings()?;
    info!(
        "Scoring with deployment '{}' (api-version {})",
        settings.deployment, settings.api_version
    );
    let policy = RetryPolicy::new(config.max_retries)?;
    let evaluator = Evaluator::new(AzureOpenAiScorer::new(settings), policy);
    let cancel = options
        .timeout
        .map(CancelToken::with_timeout)
        .unwrap_or_default();

    let bar = progress_bar(documents.len());
    let outcomes: Vec<DocumentOutcome> = pool.install(|| {
        documents
            .par_iter()
            .map(|doc| {
                bar.set_message(doc.identifier.clone());
                let outcome = evaluate_document(doc, &loader, &segmenter, &evaluator, &cancel);
                bar.inc(1);
                outcome
            })
            .collect()
    });
    bar.finish_and_clear();

    if cancel.is_cancelled() {
        eprintln!(
            "{} Timed out; chunks not reached before the deadline were skipped",
            style("!").yellow()
        );
    }

    let rendered = reporters::report_with_format(&outcomes, options.format)?;
    write_output(&rendered, options.output.as_deref())?;

    if let Some(path) = &options.output {
        eprintln!("\nResults written to: {}", path.display());
    }
    if options.format != OutputFormat::Console {
        let summary = BatchSummary::from_outcomes(&outcomes);
        eprintln!(
            "\nProcessed {} document(s): {} successful, {} failed",
            summary.total, summary.successful, summary.failed
        );
    }

    Ok(())
}

/// Load, segment and score one document. Never fails: problems become an
/// `error` outcome for this document only.
pub fn evaluate_document<S, Z, T>(
    doc: &Document,
    loader: &DocumentLoader,
    segmenter: &Segmenter<T>,
    evaluator: &Evaluator<S, Z>,
    cancel: &CancelToken,
) -> DocumentOutcome
where
    S: Scorer,
    Z: Sleeper,
    T: TokenCounter,
{
    let text = match loader.load(&doc.path) {
        Ok(text) => text,
        Err(e) => {
            warn!("{}", e);
            return DocumentOutcome::failure(&doc.identifier, e.to_string(), 0);
        }
    };

    let chunks = segmenter.segment(&text);
    debug!("{}: {} chunk(s)", doc.identifier, chunks.len());
    evaluator.evaluate(&doc.identifier, chunks, cancel).outcome
}

/// Chunking summary for one document (`--dry-run`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkStats {
    pub identifier: String,
    pub result: Result<Vec<usize>, String>,
}

fn chunk_stats<T: TokenCounter>(
    doc: &Document,
    loader: &DocumentLoader,
    segmenter: &Segmenter<T>,
) -> ChunkStats {
    let result = loader
        .load(&doc.path)
        .map(|text| {
            segmenter
                .segment(&text)
                .iter()
                .map(|c| c.token_count)
                .collect()
        })
        .map_err(|e| e.to_string());
    ChunkStats {
        identifier: doc.identifier.clone(),
        result,
    }
}

fn render_dry_run(stats: &[ChunkStats], budget: usize) -> String {
    let mut out = format!("Token budget per chunk: {budget}\n\n");
    for stat in stats {
        match &stat.result {
            Ok(counts) if counts.is_empty() => {
                out.push_str(&format!("{}: no text\n", stat.identifier));
            }
            Ok(counts) => {
                let total: usize = counts.iter().sum();
                let largest = counts.iter().copied().max().unwrap_or(0);
                out.push_str(&format!(
                    "{}: {} chunk(s), {} tokens, largest {}{}\n",
                    stat.identifier,
                    counts.len(),
                    total,
                    largest,
                    if largest > budget { " (oversized sentence)" } else { "" }
                ));
            }
            Err(e) => out.push_str(&format!("{}: error: {}\n", stat.identifier, e)),
        }
    }
    out
}

fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  "),
    );
    bar
}

fn write_output(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            if !rendered.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}
