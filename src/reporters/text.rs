//! Console reporter with colored score tiers

use crate::models::{BatchSummary, Dimension, DocumentOutcome};
use anyhow::Result;
use console::{style, StyledObject};

const RULE_WIDTH: usize = 80;
const LABEL_WIDTH: usize = 30;

/// Display tier of a 0-5 score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

/// Tier for a score: ≥4 excellent, ≥3 good, ≥2 fair, else poor
pub fn score_tier(score: f64) -> ScoreTier {
    if score >= 4.0 {
        ScoreTier::Excellent
    } else if score >= 3.0 {
        ScoreTier::Good
    } else if score >= 2.0 {
        ScoreTier::Fair
    } else {
        ScoreTier::Poor
    }
}

fn colored<D>(tier: ScoreTier, value: D) -> StyledObject<D> {
    match tier {
        ScoreTier::Excellent => style(value).green(),
        ScoreTier::Good => style(value).cyan(),
        ScoreTier::Fair => style(value).yellow(),
        ScoreTier::Poor => style(value).red(),
    }
}

fn score_line(label: &str, value: f64) -> String {
    format!(
        "  {:.<width$} {}\n",
        label,
        colored(score_tier(value), format!("{:.1}/5", value)),
        width = LABEL_WIDTH
    )
}

/// Render outcomes as formatted terminal output
pub fn render(outcomes: &[DocumentOutcome]) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{}\n",
        style("Document Evaluation Results").magenta().bold()
    ));
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');

    for outcome in outcomes {
        out.push_str(&format!(
            "\n{} {}\n",
            style("File:").bold(),
            outcome.identifier
        ));
        let status = if outcome.is_success() {
            style("✓ Success").green()
        } else {
            style("✗ Error").red()
        };
        out.push_str(&format!("{} {}", style("Status:").bold(), status));
        if outcome.chunks_total > 1 {
            out.push_str(&format!(
                "  {}",
                style(format!(
                    "({}/{} chunks scored)",
                    outcome.chunks_scored, outcome.chunks_total
                ))
                .dim()
            ));
        }
        out.push('\n');

        if let Some(score) = &outcome.composite_score {
            out.push_str(&format!("\n{}\n", style("Scores:").bold()));
            for dimension in Dimension::ALL {
                out.push_str(&score_line(dimension.label(), score.get(dimension)));
            }
            out.push_str(&score_line("Overall", score.overall()));
        }

        if let Some(detail) = &outcome.detail {
            out.push_str(&format!("{}\n", style(format!("Error: {detail}")).red()));
        }

        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');
    }

    let summary = BatchSummary::from_outcomes(outcomes);
    out.push_str(&format!("\n{}\n", style("Summary:").bold()));
    out.push_str(&format!("  Total documents: {}\n", summary.total));
    out.push_str(&format!(
        "  {}\n",
        style(format!("Successful: {}", summary.successful)).green()
    ));
    if summary.failed > 0 {
        out.push_str(&format!(
            "  {}\n",
            style(format!("Failed: {}", summary.failed)).red()
        ));
    }

    Ok(out)
}
