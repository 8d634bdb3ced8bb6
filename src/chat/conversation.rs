//! Conversation history.

use serde::{Deserialize, Serialize};

use super::config::DEFAULT_HISTORY_WINDOW;

/// Default system prompt for the manual guide assistant.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a guide for a software product. Answer the user's questions using the \
manual excerpts retrieved for you.
Follow these rules:
1. Prefer the retrieved context over general knowledge.
2. Explain procedures step by step.
3. Mention concrete screens or examples when the manual describes them.
4. Keep a friendly, professional tone.
5. Answer in the language the user writes in.";

/// First assistant message shown to the user.
pub const DEFAULT_GREETING: &str = "Hello! Ask me anything about installing, using, or \
troubleshooting the system and I will answer from the manual.";

/// Speaker of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Chat history: a system prompt followed by alternating turns.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    window: usize,
}

impl Conversation {
    /// Start a conversation with a system prompt and an opening greeting.
    pub fn new(system_prompt: impl Into<String>, greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::assistant(greeting),
            ],
            window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Set how many recent messages accompany the system prompt.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Full history, system prompt included.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages meant for display (everything but the system prompt).
    pub fn visible(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }

    /// Messages to send with the next request.
    ///
    /// The system prompt is always first; it is followed by at most
    /// `window` of the most recent other messages.
    pub fn request_window(&self) -> Vec<ChatMessage> {
        let system = self.messages.iter().filter(|m| m.role == Role::System);
        let rest: Vec<&ChatMessage> = self.visible().collect();
        let skip = rest.len().saturating_sub(self.window);

        system
            .chain(rest.into_iter().skip(skip))
            .cloned()
            .collect()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT, DEFAULT_GREETING)
    }
}
