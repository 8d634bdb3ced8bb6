//! Chat client configuration.

use std::fmt;

use crate::error::{Error, Result};

/// Azure OpenAI API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

/// Number of recent messages sent with each request.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Environment variables that must be set.
pub const REQUIRED_VARS: [&str; 7] = [
    "AZURE_OPENAI_API_KEY",
    "AZURE_OPENAI_ENDPOINT",
    "AZURE_OPENAI_DEPLOYMENT_NAME",
    "AZURE_OPENAI_EMBEDDING_DEPLOYMENT_NAME",
    "AZURE_SEARCH_ENDPOINT",
    "AZURE_SEARCH_API_KEY",
    "AZURE_SEARCH_INDEX_NAME",
];

/// Whether a required variable is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarStatus {
    pub name: &'static str,
    pub configured: bool,
}

/// Settings for the Azure OpenAI "on your data" chat client.
///
/// Do not derive `Debug`: the keys are redacted by hand.
#[derive(Clone)]
pub struct ChatConfig {
    pub openai_api_key: String,
    pub openai_endpoint: String,
    pub chat_deployment: String,
    pub embedding_deployment: String,
    pub search_endpoint: String,
    pub search_api_key: String,
    pub search_index: String,
    pub api_version: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Recent messages sent along with the system prompt
    pub history_window: usize,
    pub timeout_secs: u64,
}

impl ChatConfig {
    /// Load configuration from environment variables.
    ///
    /// Every missing required variable is reported in a single
    /// [`Error::MissingConfig`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| match non_blank(&lookup, key) {
            Some(value) => value,
            None => {
                missing.push(key);
                String::new()
            }
        };

        let openai_api_key = required(REQUIRED_VARS[0]);
        let openai_endpoint = required(REQUIRED_VARS[1]);
        let chat_deployment = required(REQUIRED_VARS[2]);
        let embedding_deployment = required(REQUIRED_VARS[3]);
        let search_endpoint = required(REQUIRED_VARS[4]);
        let search_api_key = required(REQUIRED_VARS[5]);
        let search_index = required(REQUIRED_VARS[6]);

        if !missing.is_empty() {
            return Err(Error::MissingConfig(missing));
        }

        Ok(Self {
            openai_api_key,
            openai_endpoint,
            chat_deployment,
            embedding_deployment,
            search_endpoint,
            search_api_key,
            search_index,
            api_version: non_blank(&lookup, "AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            temperature: parse_optional(&lookup, "CHAT_TEMPERATURE")?.unwrap_or(0.7),
            max_tokens: parse_optional(&lookup, "CHAT_MAX_TOKENS")?.unwrap_or(1000),
            history_window: parse_optional(&lookup, "CHAT_HISTORY_WINDOW")?
                .unwrap_or(DEFAULT_HISTORY_WINDOW),
            timeout_secs: parse_optional(&lookup, "CHAT_TIMEOUT_SECS")?.unwrap_or(60),
        })
    }

    /// Report which required variables are set in the environment.
    pub fn env_status() -> Vec<VarStatus> {
        Self::status_with(|key| std::env::var(key).ok())
    }

    /// Report which required variables `lookup` can resolve.
    pub fn status_with<F>(lookup: F) -> Vec<VarStatus>
    where
        F: Fn(&str) -> Option<String>,
    {
        REQUIRED_VARS
            .iter()
            .map(|&name| VarStatus {
                name,
                configured: non_blank(&lookup, name).is_some(),
            })
            .collect()
    }

    /// Chat-completions URL for the configured deployment.
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.openai_endpoint.trim_end_matches('/'),
            self.chat_deployment,
            self.api_version
        )
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("openai_api_key", &"<redacted>")
            .field("openai_endpoint", &self.openai_endpoint)
            .field("chat_deployment", &self.chat_deployment)
            .field("embedding_deployment", &self.embedding_deployment)
            .field("search_endpoint", &self.search_endpoint)
            .field("search_api_key", &"<redacted>")
            .field("search_index", &self.search_index)
            .field("api_version", &self.api_version)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("history_window", &self.history_window)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_optional<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match non_blank(lookup, key) {
        Some(raw) => raw.parse().map(Some).map_err(|e: T::Err| Error::InvalidConfig {
            key,
            message: e.to_string(),
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("AZURE_OPENAI_API_KEY", "openai-secret"),
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com/"),
            ("AZURE_OPENAI_DEPLOYMENT_NAME", "gpt-4o"),
            ("AZURE_OPENAI_EMBEDDING_DEPLOYMENT_NAME", "text-embedding-3-large"),
            ("AZURE_SEARCH_ENDPOINT", "https://example.search.windows.net"),
            ("AZURE_SEARCH_API_KEY", "search-secret"),
            ("AZURE_SEARCH_INDEX_NAME", "manual-index"),
        ])
    }

    fn lookup_in(env: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| env.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_from_lookup_with_defaults() {
        let config = ChatConfig::from_lookup(lookup_in(full_env())).unwrap();
        assert_eq!(config.chat_deployment, "gpt-4o");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.history_window, DEFAULT_HISTORY_WINDOW);
    }

    #[test]
    fn test_all_missing_reported_together() {
        let result = ChatConfig::from_lookup(|_| None);
        match result {
            Err(Error::MissingConfig(keys)) => assert_eq!(keys, REQUIRED_VARS.to_vec()),
            other => panic!("expected MissingConfig, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut env = full_env();
        env.insert("AZURE_SEARCH_API_KEY", "   ");
        env.remove("AZURE_OPENAI_ENDPOINT");

        match ChatConfig::from_lookup(lookup_in(env)) {
            Err(Error::MissingConfig(keys)) => {
                assert_eq!(keys, vec!["AZURE_OPENAI_ENDPOINT", "AZURE_SEARCH_API_KEY"])
            }
            other => panic!("expected MissingConfig, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_invalid_optional_value() {
        let mut env = full_env();
        env.insert("CHAT_MAX_TOKENS", "lots");
        let result = ChatConfig::from_lookup(lookup_in(env));
        assert!(matches!(
            result,
            Err(Error::InvalidConfig { key: "CHAT_MAX_TOKENS", .. })
        ));
    }

    #[test]
    fn test_status_with() {
        let mut env = full_env();
        env.remove("AZURE_SEARCH_INDEX_NAME");
        let status = ChatConfig::status_with(lookup_in(env));
        assert_eq!(status.len(), 7);
        assert_eq!(status.iter().filter(|s| s.configured).count(), 6);
        assert!(!status[6].configured);
    }

    #[test]
    fn test_chat_completions_url() {
        let config = ChatConfig::from_lookup(lookup_in(full_env())).unwrap();
        assert_eq!(
            config.chat_completions_url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-12-01-preview"
        );
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = ChatConfig::from_lookup(lookup_in(full_env())).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("openai-secret"));
        assert!(!debug.contains("search-secret"));
        assert!(debug.contains("manual-index"));
    }
}
