mod models;
mod openai;

pub use models::{Message, Role};
pub use openai::{OpenAiClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};

use async_trait::async_trait;
use thiserror::Error;

/// Why a chat turn produced no reply. The `Display` text is what the
/// user sees in the transcript.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChatError {
    #[error("No API key configured. Set OPENAI_API_KEY to enable the assistant.")]
    MissingApiKey,

    #[error("The assistant service returned an error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("No response from the assistant. Please try again.")]
    EmptyResponse,

    #[error("Could not reach the assistant: {0}")]
    Transport(String),
}

/// The two kinds of completion call; they differ only in reply length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    FollowUp,
    Routine,
}

impl RequestKind {
    pub fn max_tokens(self) -> u32 {
        match self {
            RequestKind::FollowUp => 300,
            RequestKind::Routine => 700,
        }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, messages: &[Message], kind: RequestKind) -> Result<String, ChatError>;

    fn model_name(&self) -> &str;

    /// Whether requests can be made at all (e.g. a credential is present)
    fn is_configured(&self) -> bool {
        true
    }
}
