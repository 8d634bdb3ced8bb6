//! Chat session tests against an in-memory backend.

#![cfg(feature = "chat")]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pagesplit::chat::{ChatBackend, ChatMessage, ChatSession, Conversation, Role};
use pagesplit::{Error, Result};

/// Replays canned replies and records what it was sent.
struct ScriptedBackend {
    replies: Mutex<Vec<Result<String>>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedBackend {
    fn new(mut replies: Vec<Result<String>>) -> Self {
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(Error::EmptyResponse))
    }
}

#[tokio::test]
async fn test_ask_records_both_turns() {
    let backend = ScriptedBackend::new(vec![Ok("Use the Upload button.".to_string())]);
    let mut session = ChatSession::new(backend, Conversation::new("sys", "hi"));

    let reply = session.ask("How do I upload?").await.unwrap();

    assert_eq!(reply, "Use the Upload button.");
    let visible: Vec<_> = session
        .conversation()
        .visible()
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(
        visible,
        [
            (Role::Assistant, "hi"),
            (Role::User, "How do I upload?"),
            (Role::Assistant, "Use the Upload button."),
        ]
    );
}

#[tokio::test]
async fn test_ask_failure_records_apology() {
    let backend = ScriptedBackend::new(vec![Err(Error::ChatApi {
        status: 429,
        message: "rate limited".into(),
    })]);
    let mut session = ChatSession::new(backend, Conversation::new("sys", "hi"));

    let err = session.ask("anything?").await.unwrap_err();

    assert!(matches!(err, Error::ChatApi { status: 429, .. }));
    let last = session.conversation().messages().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last.content.starts_with("Sorry, an error occurred"));
    assert!(last.content.contains("rate limited"));
}

#[tokio::test]
async fn test_backend_receives_bounded_window() {
    let backend = Arc::new(ScriptedBackend::new((0..6).map(|i| Ok(format!("a{}", i))).collect()));
    let conversation = Conversation::new("sys", "hi").with_window(4);
    let mut session = ChatSession::new(SharedBackend(backend.clone()), conversation);

    for i in 0..6 {
        session.ask(format!("q{}", i)).await.unwrap();
    }

    assert_eq!(session.conversation().messages().len(), 2 + 12);
    let seen = backend.seen.lock().unwrap();
    let last: Vec<_> = seen[5].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(last, ["sys", "a3", "q4", "a4", "q5"]);
}

#[tokio::test]
async fn test_every_request_starts_with_system_prompt() {
    let backend = Arc::new(ScriptedBackend::new((0..3).map(|i| Ok(format!("a{}", i))).collect()));
    let conversation = Conversation::new("sys", "hi").with_window(2);
    let mut session = ChatSession::new(SharedBackend(backend.clone()), conversation);

    for i in 0..3 {
        session.ask(format!("q{}", i)).await.unwrap();
    }

    let seen = backend.seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    for request in seen.iter() {
        assert_eq!(request[0].role, Role::System);
        assert!(request.len() <= 3);
        assert_eq!(request.last().unwrap().role, Role::User);
    }
    assert_eq!(seen[2].last().unwrap().content, "q2");
}

struct SharedBackend(Arc<ScriptedBackend>);

#[async_trait]
impl ChatBackend for SharedBackend {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.0.complete(messages).await
    }
}
