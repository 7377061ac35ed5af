//! Prompt templates for chunk evaluation

use crate::ai::Message;

/// System message sent with every scoring request
pub const SYSTEM_PROMPT: &str =
    "You are an expert document quality evaluator. Respond only with valid JSON.";

/// Rubric for the user message. `{text}` is replaced by the chunk text.
pub const EVALUATION_PROMPT: &str = r#"You are an expert evaluator assessing document quality for use with Large Language Models (LLMs) and Retrieval-Augmented Generation (RAG) systems.

Evaluate the following document text on these criteria (score 0-5 for each):

1. **Relevance** (0-5): How relevant and focused is the content? Does it stay on topic?
2. **Factual Accuracy** (0-5): Does the content appear factually accurate and well-researched?
3. **Clarity** (0-5): Is the writing clear, well-structured, and easy to understand?
4. **Hallucination Risk** (0-5): How likely is this content to cause LLM hallucinations? (0=very likely, 5=very unlikely)
5. **Style Match** (0-5): Is the writing style consistent and professional?
6. **RAG Usability** (0-5): How useful would this be as context for a RAG system? Is it well-structured for retrieval?
7. **Citation Quality** (0-5): Are sources, references, and citations properly included and formatted?

Respond ONLY with a JSON object in this exact format:
{
  "relevance": <score>,
  "factual_accuracy": <score>,
  "clarity": <score>,
  "hallucination": <score>,
  "style_match": <score>,
  "rag_usability": <score>,
  "citation_quality": <score>
}

Document text to evaluate:

{text}"#;

/// Role-tagged messages for scoring one chunk
pub fn evaluation_messages(text: &str) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(EVALUATION_PROMPT.replace("{text}", text)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Role;
    use crate::models::Dimension;

    #[test]
    fn test_messages_embed_chunk() {
        let messages = evaluation_messages("The chunk body.");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.ends_with("The chunk body."));
        assert!(!messages[1].content.contains("{text}"));
    }

    #[test]
    fn test_rubric_names_every_dimension() {
        for d in Dimension::ALL {
            assert!(
                EVALUATION_PROMPT.contains(&format!("\"{}\"", d.key())),
                "missing {}",
                d.key()
            );
        }
    }

    #[test]
    fn test_placeholder_in_chunk_is_left_alone() {
        let messages = evaluation_messages("literal {text} marker");
        assert!(messages[1].content.ends_with("literal {text} marker"));
    }
}
