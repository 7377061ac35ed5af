//! Azure OpenAI scoring client
//!
//! One call scores one chunk. Uses ureq (sync HTTP), so no async runtime is
//! needed. The client never retries; see `retry.rs`.

use crate::ai::prompts::evaluation_messages;
use crate::ai::{ScoreError, ScoreParseMode, Scorer, ScorerSettings};
use crate::models::{Dimension, Score};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Longest slice of an error body carried into an error message
const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Chunk scorer backed by an Azure OpenAI chat deployment
pub struct AzureOpenAiScorer {
    settings: ScorerSettings,
    url: String,
    agent: ureq::Agent,
}

fn make_agent(settings: &ScorerSettings) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // Status codes are classified below
        .timeout_global(Some(settings.timeout))
        .build()
        .new_agent()
}

impl AzureOpenAiScorer {
    pub fn new(settings: ScorerSettings) -> Self {
        let url = Self::completions_url(&settings);
        let agent = make_agent(&settings);
        Self {
            settings,
            url,
            agent,
        }
    }

    pub fn completions_url(settings: &ScorerSettings) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            settings.endpoint.trim_end_matches('/'),
            settings.deployment,
            settings.api_version
        )
    }

    pub fn deployment(&self) -> &str {
        &self.settings.deployment
    }
}

impl Scorer for AzureOpenAiScorer {
    fn score(&self, text: &str) -> Result<Score, ScoreError> {
        let body = ChatRequest {
            messages: evaluation_messages(text),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_response_tokens,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .agent
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("api-key", &self.settings.api_key)
            .send_json(&body)
            .map_err(|e| classify_transport(&e))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(classify_status(status, &error_text));
        }

        let resp: ChatResponse = response
            .into_body()
            .read_json()
            .map_err(|e| ScoreError::Transient(format!("unparseable response body: {e}")))?;

        let content = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ScoreError::Transient("response contained no message content".into()))?;

        debug!("Scored chunk of {} bytes", text.len());
        parse_score(&content, self.settings.score_mode)
    }
}

/// Classify an HTTP error status
pub fn classify_status(status: u16, body: &str) -> ScoreError {
    let body: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
    let message = if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {body}")
    };
    match status {
        429 => ScoreError::RateLimited(message),
        408 | 409 | 500..=599 => ScoreError::Transient(message),
        _ => ScoreError::Fatal(message),
    }
}

/// Classify a failure that happened before any status was received
pub fn classify_transport(err: &ureq::Error) -> ScoreError {
    match err {
        ureq::Error::Timeout(_) => ScoreError::Transient(format!("request timed out: {err}")),
        ureq::Error::Io(_) | ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
            ScoreError::Transient(format!("connection failed: {err}"))
        }
        _ => ScoreError::Fatal(format!("request failed: {err}")),
    }
}

/// Turn the model's message content into a `Score`
pub fn parse_score(content: &str, mode: ScoreParseMode) -> Result<Score, ScoreError> {
    let value: serde_json::Value = serde_json::from_str(content.trim())
        .map_err(|e| ScoreError::Transient(format!("response is not valid JSON: {e}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| ScoreError::Transient("response is not a JSON object".into()))?;

    if mode == ScoreParseMode::Strict {
        if let Some(extra) = object
            .keys()
            .find(|k| !Dimension::ALL.iter().any(|d| d.key() == k.as_str()))
        {
            return Err(ScoreError::Transient(format!(
                "response has unexpected key '{extra}'"
            )));
        }
    }

    let mut values = [0.0; 7];
    for (slot, dimension) in values.iter_mut().zip(Dimension::ALL) {
        let raw = match (object.get(dimension.key()), mode) {
            (Some(v), _) => v.as_f64().ok_or_else(|| {
                ScoreError::Transient(format!("score '{}' is not a number: {v}", dimension))
            })?,
            (None, ScoreParseMode::Lenient) => Score::MIN,
            (None, ScoreParseMode::Strict) => {
                return Err(ScoreError::Transient(format!(
                    "response is missing score '{}'",
                    dimension
                )))
            }
        };

        *slot = if (Score::MIN..=Score::MAX).contains(&raw) {
            raw
        } else if mode == ScoreParseMode::Lenient {
            raw.clamp(Score::MIN, Score::MAX)
        } else {
            return Err(ScoreError::Transient(format!(
                "score '{}' is out of range: {raw}",
                dimension
            )));
        };
    }

    Ok(Score::from_values(values))
}

// Chat completions API types
#[derive(Serialize)]
struct ChatRequest {
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}
