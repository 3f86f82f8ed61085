use super::models::{CompletionRequest, CompletionResponse, Message};
use super::{ChatClient, ChatError, RequestKind};
use async_trait::async_trait;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const TEMPERATURE: f32 = 0.7;

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl OpenAiClient {
    /// Create a client. A missing key is not an error until a request is made.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send_request(
        &self,
        api_key: &str,
        request: &CompletionRequest<'_>,
    ) -> Result<String, ChatError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|err| ChatError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ChatError::Transport(err.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Completion request rejected");
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(error = %err, "Completion body did not parse");
                CompletionResponse::default()
            }
        };

        parsed.reply().ok_or(ChatError::EmptyResponse)
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, messages: &[Message], kind: RequestKind) -> Result<String, ChatError> {
        let api_key = self.api_key.as_deref().ok_or(ChatError::MissingApiKey)?;

        let request = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: kind.max_tokens(),
            temperature: TEMPERATURE,
        };

        let span = tracing::info_span!(
            "completion",
            request_id = %Uuid::new_v4(),
            kind = ?kind,
            turns = messages.len()
        );

        async {
            let result = self.send_request(api_key, &request).await;
            match &result {
                Ok(reply) => info!(reply_chars = reply.len(), "Completion succeeded"),
                Err(err) => warn!(error = %err, "Completion failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.has_api_key()
    }
}
