//! Azure OpenAI chat-completions client with an Azure AI Search data source.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::config::ChatConfig;
use super::conversation::{ChatMessage, Conversation};
use crate::error::{Error, Result};

/// Anything that can answer a list of chat messages.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Azure OpenAI client grounded on an Azure AI Search index.
///
/// NOTE: Do NOT derive `Debug` on this struct; it holds the API keys.
pub struct AzureChatClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    data_source: DataSource,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    data_sources: &'a [DataSource],
}

#[derive(Debug, Clone, Serialize)]
struct DataSource {
    #[serde(rename = "type")]
    kind: &'static str,
    parameters: SearchParameters,
}

#[derive(Debug, Clone, Serialize)]
struct SearchParameters {
    endpoint: String,
    index_name: String,
    authentication: Authentication,
    query_type: &'static str,
    embedding_dependency: EmbeddingDependency,
}

#[derive(Debug, Clone, Serialize)]
struct Authentication {
    #[serde(rename = "type")]
    kind: &'static str,
    key: String,
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingDependency {
    #[serde(rename = "type")]
    kind: &'static str,
    deployment_name: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl AzureChatClient {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.chat_completions_url(),
            api_key: config.openai_api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            data_source: DataSource {
                kind: "azure_search",
                parameters: SearchParameters {
                    endpoint: config.search_endpoint.clone(),
                    index_name: config.search_index.clone(),
                    authentication: Authentication {
                        kind: "api_key",
                        key: config.search_api_key.clone(),
                    },
                    query_type: "vector",
                    embedding_dependency: EmbeddingDependency {
                        kind: "deployment_name",
                        deployment_name: config.embedding_deployment.clone(),
                    },
                },
            },
        })
    }

    /// Request body sent for `messages`.
    pub fn request_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        serde_json::to_value(self.request(messages)).unwrap_or_default()
    }

    /// Send a one-line greeting and return the reply.
    pub async fn check_connection(&self) -> Result<String> {
        self.complete(&[ChatMessage::user("Hello")]).await
    }

    fn request<'a>(&'a self, messages: &'a [ChatMessage]) -> CompletionRequest<'a> {
        CompletionRequest {
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            data_sources: std::slice::from_ref(&self.data_source),
        }
    }
}

#[async_trait]
impl ChatBackend for AzureChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        log::debug!("sending {} messages to {}", messages.len(), self.url);

        let resp = self
            .http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&self.request(messages))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            log::warn!("chat API returned {}", status);
            return Err(Error::ChatApi {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        parse_completion(&body)
    }
}

/// Pull the first choice's text out of a completion response body.
fn parse_completion(body: &str) -> Result<String> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| Error::Other(format!("invalid chat response: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(Error::EmptyResponse)
}

fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(|r| r.error)
        .map(|e| e.message)
        .unwrap_or(body)
}

/// A conversation bound to a backend.
pub struct ChatSession<B> {
    backend: B,
    conversation: Conversation,
}

impl<B: ChatBackend> ChatSession<B> {
    pub fn new(backend: B, conversation: Conversation) -> Self {
        Self {
            backend,
            conversation,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Ask a question and record both sides of the exchange.
    ///
    /// On failure an apology is recorded as the assistant's turn and the
    /// error is returned.
    pub async fn ask(&mut self, prompt: impl Into<String>) -> Result<String> {
        self.conversation.push_user(prompt);
        let window = self.conversation.request_window();

        match self.backend.complete(&window).await {
            Ok(reply) => {
                self.conversation.push_assistant(reply.clone());
                Ok(reply)
            }
            Err(e) => {
                self.conversation.push_assistant(format!(
                    "Sorry, an error occurred while generating a response: {}",
                    e
                ));
                Err(e)
            }
        }
    }
}
