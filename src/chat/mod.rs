//! Manual-guide chat client.
//!
//! Sends the conversation to an Azure OpenAI deployment configured with an
//! Azure AI Search "on your data" source. Retrieval happens entirely on the
//! service side; this module only builds requests and keeps history.
//!
//! ```no_run
//! use pagesplit::chat::{AzureChatClient, ChatConfig, ChatSession, Conversation};
//!
//! # async fn run() -> pagesplit::Result<()> {
//! let config = ChatConfig::from_env()?;
//! let client = AzureChatClient::new(&config)?;
//! let conversation = Conversation::default().with_window(config.history_window);
//! let mut session = ChatSession::new(client, conversation);
//! println!("{}", session.ask("How do I upload data?").await?);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod conversation;

pub use client::{AzureChatClient, ChatBackend, ChatSession};
pub use config::{ChatConfig, VarStatus, DEFAULT_API_VERSION, DEFAULT_HISTORY_WINDOW, REQUIRED_VARS};
pub use conversation::{ChatMessage, Conversation, Role, DEFAULT_GREETING, DEFAULT_SYSTEM_PROMPT};
