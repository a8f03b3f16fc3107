use reqwest::Client;
use tracing::{debug, warn};

use super::prompt::build_messages;
use super::types::{ApiError, ChatRequest, ChatResponse};
use crate::config::ModelConfig;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("model API rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("model API rejected credentials: {0}")]
    Unauthorized(String),

    #[error("model API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("model returned no completion")]
    EmptyResponse,

    #[error("malformed model response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Produces an answer to `query` grounded in `grounding_text`.
///
/// Not deterministic: the same inputs may yield different text on each
/// call. Implemented by `OpenAiClient` for production; tests use a fixed stub.
pub trait CompletionClient {
    async fn synthesize(
        &self,
        query: &str,
        grounding_text: &str,
    ) -> Result<String, GenerationError>;
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    config: ModelConfig,
}

impl OpenAiClient {
    pub fn new(http: Client, config: ModelConfig) -> Self {
        Self { http, config }
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GenerationError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.config.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let api_error = serde_json::from_str::<ChatResponse>(&text)
                .ok()
                .and_then(|body| body.error);
            let classified = match api_error {
                Some(err) => classify_api_error(status.as_u16(), &err),
                None => {
                    let end = text.floor_char_boundary(200);
                    classify_status(status.as_u16(), format!("HTTP {status}: {}", &text[..end]))
                }
            };
            warn!(error = %classified, "model API error");
            return Err(classified);
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            let end = text.floor_char_boundary(200);
            warn!(error = %e, body = &text[..end], "model response is not JSON");
            GenerationError::Decode(e)
        })
    }
}

impl CompletionClient for OpenAiClient {
    async fn synthesize(
        &self,
        query: &str,
        grounding_text: &str,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: build_messages(query, grounding_text),
        };

        let response = self.complete(&request).await?;
        let model = response.model.clone().unwrap_or_default();

        let answer = response
            .first_content()
            .ok_or(GenerationError::EmptyResponse)?;
        if answer.is_empty() {
            warn!("model returned an empty completion");
        }

        debug!(%model, chars = answer.len(), "completion received");
        Ok(answer)
    }
}

fn classify_api_error(code: u16, err: &ApiError) -> GenerationError {
    let message = match (&err.kind, &err.message) {
        (Some(kind), Some(message)) => format!("{kind}: {message}"),
        (None, Some(message)) => message.clone(),
        (Some(kind), None) => kind.clone(),
        (None, None) => "Unknown error".to_string(),
    };
    classify_status(code, message)
}

fn classify_status(code: u16, message: String) -> GenerationError {
    match code {
        429 => GenerationError::RateLimited(message),
        401 | 403 => GenerationError::Unauthorized(message),
        _ => GenerationError::Api { code, message },
    }
}
