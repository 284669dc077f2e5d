//! Completion provider configuration

/// Default chat-completions endpoint
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model name
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the completion provider
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl CompletionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            api_key: get("OPENROUTER_API_KEY").or_else(|| get("VITE_OPENROUTER_API_KEY")),
            api_url: get("COGNIBOT_API_URL").unwrap_or(defaults.api_url),
            model: get("COGNIBOT_MODEL").unwrap_or(defaults.model),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
