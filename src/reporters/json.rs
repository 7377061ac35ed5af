//! JSON reporter
//!
//! Outputs the outcome list as a pretty-printed JSON array.

use crate::models::DocumentOutcome;
use anyhow::Result;

/// Render outcomes as JSON
pub fn render(outcomes: &[DocumentOutcome]) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcomes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_outcomes;

    #[test]
    fn test_json_render_valid() {
        let json_str = render(&test_outcomes()).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        let items = parsed.as_array().expect("array");
        assert_eq!(items.len(), 2);

        assert_eq!(items[0]["filename"], "guide.md");
        assert_eq!(items[0]["status"], "success");
        assert_eq!(items[0]["evaluation"]["relevance"], 4.5);
        assert_eq!(items[0]["chunks_total"], 3);
        assert_eq!(items[0]["chunks_scored"], 2);
        assert!(items[0].get("error_message").is_none());

        assert_eq!(items[1]["status"], "error");
        assert!(items[1].get("evaluation").is_none());
        assert!(items[1]["error_message"]
            .as_str()
            .expect("message")
            .contains("HTTP 401"));
    }

    #[test]
    fn test_json_empty() {
        assert_eq!(render(&[]).expect("render JSON"), "[]");
    }

    #[test]
    fn test_json_reads_back() {
        let outcomes = test_outcomes();
        let json_str = render(&outcomes).expect("render JSON");
        let back: Vec<DocumentOutcome> = serde_json::from_str(&json_str).expect("parse outcomes");
        assert_eq!(back, outcomes);
    }
}
