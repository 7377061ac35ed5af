//! Output reporters for evaluation results
//!
//! Supports multiple output formats:
//! - `csv` - One row per document, fixed columns (default)
//! - `json` - Machine-readable array of outcomes
//! - `console` - Terminal output with colored score tiers
//!
//! All reporters are pure functions over the outcome list.

mod csv;
mod json;
mod text;

pub use text::{score_tier, ScoreTier};

use crate::models::DocumentOutcome;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Console,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "console" | "text" | "terminal" => Ok(OutputFormat::Console),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: csv, json, console",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Console => write!(f, "console"),
        }
    }
}

/// Render outcomes using an OutputFormat enum
pub fn report_with_format(outcomes: &[DocumentOutcome], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Csv => csv::render(outcomes),
        OutputFormat::Json => json::render(outcomes),
        OutputFormat::Console => text::render(outcomes),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Score;

    /// One scored document and one failed document
    pub(crate) fn test_outcomes() -> Vec<DocumentOutcome> {
        vec![
            DocumentOutcome::success(
                "guide.md",
                Score::from_values([4.5, 3.2, 2.0, 1.0, 4.0, 3.0, 0.5]),
                3,
                2,
            ),
            DocumentOutcome::failure(
                "broken.txt",
                "all 1 chunks failed: chunk 1/1: fatal error after 1 attempt(s): HTTP 401",
                1,
            ),
        ]
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("csv").unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str("console").unwrap(),
            OutputFormat::Console
        );
        assert!(OutputFormat::from_str("sarif").is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Csv);
    }

    #[test]
    fn test_report_dispatch() {
        let outcomes = test_outcomes();
        let csv = report_with_format(&outcomes, OutputFormat::Csv).unwrap();
        assert!(csv.starts_with("filename,"));
        let json = report_with_format(&outcomes, OutputFormat::Json).unwrap();
        assert!(json.starts_with('['));
        let console = report_with_format(&outcomes, OutputFormat::Console).unwrap();
        assert!(console.contains("guide.md"));
    }
}
