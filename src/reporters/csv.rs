//! CSV reporter
//!
//! Header: `filename`, the seven dimensions, `status`, `error_message`.
//! Failed documents leave the score cells empty.

use crate::models::{Dimension, DocumentOutcome};
use anyhow::{anyhow, Context, Result};

/// Render outcomes as CSV
pub fn render(outcomes: &[DocumentOutcome]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["filename"];
    header.extend(Dimension::ALL.iter().map(|d| d.key()));
    header.extend(["status", "error_message"]);
    writer.write_record(&header)?;

    for outcome in outcomes {
        let mut row = Vec::with_capacity(header.len());
        row.push(outcome.identifier.clone());
        match &outcome.composite_score {
            Some(score) => row.extend(score.iter().map(|(_, v)| format_value(v))),
            None => row.extend(Dimension::ALL.iter().map(|_| String::new())),
        }
        row.push(outcome.status.to_string());
        row.push(outcome.detail.clone().unwrap_or_default());
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Up to four decimals, trailing zeros dropped
fn format_value(value: f64) -> String {
    let s = format!("{:.4}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_outcomes;

    #[test]
    fn test_csv_render() {
        let out = render(&test_outcomes()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "filename,relevance,factual_accuracy,clarity,hallucination,style_match,rag_usability,citation_quality,status,error_message"
        );
        assert_eq!(lines[1], "guide.md,4.5,3.2,2,1,4,3,0.5,success,");
        assert!(lines[2].starts_with("broken.txt,,,,,,,,error,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_quotes_fields() {
        let outcomes = vec![DocumentOutcome::failure("a, b.txt", "said \"no\"", 0)];
        let out = render(&outcomes).unwrap();
        assert!(out.contains("\"a, b.txt\""));
        assert!(out.contains("\"said \"\"no\"\"\""));
    }

    #[test]
    fn test_csv_parses_back() {
        let out = render(&test_outcomes()).unwrap();
        let mut reader = csv::Reader::from_reader(out.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "4.5");
        assert_eq!(&rows[1][8], "error");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1.25), "1.25");
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(2.123456), "2.1235");
        assert_eq!(format_value(0.0), "0");
    }
}
