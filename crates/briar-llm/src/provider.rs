use serde::Deserialize;
use url::Url;

/// One remote provider, selected by configuration. The three historical
/// adapter variants differ only in endpoint, model id, and request shape,
/// so they collapse into a variant config over one client.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    #[serde(default)]
    pub kind: ProviderKind,
    pub endpoint: Url,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable to read the key from when `api_key` is unset.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI-style chat completions endpoint (OpenRouter, DashScope
    /// compatible mode, and similar).
    #[default]
    OpenAiCompat,
    /// Hugging Face inference API, free tier works without a key.
    HuggingFace,
}

fn default_timeout_secs() -> u64 {
    15
}

impl ProviderConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key_env.as_deref().and_then(|v| std::env::var(v).ok()))
    }

    /// Chat-completion providers need credentials; the HF inference API
    /// does not.
    pub fn is_configured(&self) -> bool {
        match self.kind {
            ProviderKind::OpenAiCompat => self.resolve_api_key().is_some(),
            ProviderKind::HuggingFace => true,
        }
    }
}
