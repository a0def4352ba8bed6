//! Chat-completion client used to answer questions about fetched content.
//!
//! The completion backend sits behind a trait so the orchestrator never
//! depends on a concrete vendor. The bundled implementation speaks the
//! OpenAI-compatible chat completions protocol.

use crate::config::{Config, DEFAULT_COMPLETION_MODEL};
use crate::sanitize;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Maximum context length, in characters, submitted with a question.
pub const MAX_CONTEXT_CHARS: usize = 8_000;

/// Marker appended to context cut at [`MAX_CONTEXT_CHARS`].
pub const CONTEXT_TRUNCATION_MARKER: &str = "... (context truncated)";

/// Header guaranteed at the start of every successful answer.
pub const SUMMARY_HEADER: &str = "Summary:";

const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.openai.com";

/// Instructions framing the model as a QA analyst over wiki content.
const SYSTEM_PROMPT: &str = "
You are a highly skilled technical analyst and QA expert. Your task is to analyze Confluence content and provide accurate, concise answers to questions.

Instructions:
1. Carefully read and understand the provided context
2. Identify key technical concepts and their relationships
3. Provide clear, step-by-step explanations when requested
4. Include relevant technical details and best practices
5. If the question asks for a process or procedure:
   - Break it down into clear, numbered steps
   - Include any prerequisites or requirements
   - Highlight important considerations or potential issues
6. If the context is truncated:
   - Focus on the available information
   - Clearly state what can be determined from the provided content
   - Note any limitations in the analysis
7. Format your response in a clear, structured way:
   - Use bullet points for lists
   - Use numbered steps for processes
   - Include relevant technical terms with explanations
8. Be specific and detailed in your analysis
9. If you're unsure about any aspect, clearly state what information would be needed to provide a more complete answer
";

/// Errors surfaced while requesting a completion.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Endpoint could not be reached.
    #[error("Completion endpoint unreachable: {0}")]
    Unreachable(String),
    /// Endpoint returned an error response; the body carries any structured
    /// error payload the service supplied.
    #[error("Unexpected completion response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the endpoint.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Response arrived but could not be interpreted.
    #[error("Malformed completion response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by completion backends.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Answer `question` against `context`.
    ///
    /// Successful answers always start with [`SUMMARY_HEADER`]; context
    /// longer than [`MAX_CONTEXT_CHARS`] is cut before submission.
    async fn complete(&self, question: &str, context: &str) -> Result<String, CompletionError>;
}

/// Build the completion client configured for this run.
pub fn get_completion_client(config: &Config) -> Box<dyn CompletionClient> {
    Box::new(OpenAiCompletionClient::new(config))
}

struct OpenAiCompletionClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompletionClient {
    fn new(config: &Config) -> Self {
        let http = Client::builder()
            .user_agent("confluence-qa/completion")
            .build()
            .expect("Failed to construct reqwest::Client for completions");
        Self {
            http,
            base_url: config
                .openai_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_COMPLETION_BASE_URL.to_string()),
            api_key: config.openai_api_key.clone(),
            model: config
                .openai_model
                .clone()
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
        }
    }

    /// Resolve the chat completions endpoint, tolerating bases that already
    /// name the version segment or the full path.
    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else if base.ends_with("/v1") {
            format!("{base}/chat/completions")
        } else {
            format!("{base}/v1/chat/completions")
        }
    }
}

/// Prepend the summary header when the model response lacks it.
fn ensure_summary_header(answer: String) -> String {
    if answer.starts_with(SUMMARY_HEADER) {
        answer
    } else {
        format!("{SUMMARY_HEADER}\n{answer}")
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, question: &str, context: &str) -> Result<String, CompletionError> {
        let context =
            sanitize::truncate_with_marker(context, MAX_CONTEXT_CHARS, CONTEXT_TRUNCATION_MARKER);
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": format!("Context: {context}\n\nQuestion: {question}") },
            ],
            "temperature": 0.3,
            "max_tokens": 1000,
            "top_p": 0.9,
            "frequency_penalty": 0.2,
            "presence_penalty": 0.2,
        });

        tracing::debug!(model = %self.model, context_chars = context.chars().count(), "Requesting completion");
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                CompletionError::Unreachable(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::UnexpectedStatus { status, body });
        }

        let body: ChatResponse = response.json().await.map_err(|error| {
            CompletionError::InvalidResponse(format!("failed to decode completion body: {error}"))
        })?;

        let answer = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::InvalidResponse("response carried no choices".into()))?;

        Ok(ensure_summary_header(answer))
    }
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
    content: String,
}
