use chrono::{DateTime, Local};

use crate::format::{format, FormattedBlock};

/// Who a transcript entry is shown as coming from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// An entry in the on-screen transcript.
///
/// Notices look like assistant replies but never enter the conversation
/// history sent to the model.
#[derive(Debug, Clone)]
pub struct UiMessage {
    pub role: MessageRole,
    pub content: String,
    pub blocks: Vec<FormattedBlock>,
    pub is_notice: bool,
    pub timestamp: DateTime<Local>,
}

impl UiMessage {
    /// Create a new message with the given role and content
    pub fn new(role: MessageRole, content: String) -> Self {
        Self {
            role,
            content,
            blocks: Vec::new(),
            is_notice: false,
            timestamp: Local::now(),
        }
    }

    /// Create a new user message
    pub fn user(content: String) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant reply; the raw text is parsed into blocks once
    pub fn assistant(content: String) -> Self {
        let mut msg = Self::new(MessageRole::Assistant, content);
        msg.blocks = format(&msg.content);
        msg
    }

    /// Create an assistant-style notice (errors, hints)
    pub fn notice(content: String) -> Self {
        let mut msg = Self::new(MessageRole::Assistant, content);
        msg.is_notice = true;
        msg
    }

    pub fn system(content: String) -> Self {
        Self::new(MessageRole::System, content)
    }
}
