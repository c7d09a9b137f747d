use briar_core::ScoringPolicy;
use briar_llm::ProviderConfig;
use serde::Deserialize;

#[derive(Deserialize, Default)]
pub struct BriarConfig {
    #[serde(default)]
    pub scoring: ScoringPolicy,
    #[serde(default)]
    pub llm: LlmConfig,
    pub db: Option<DbConfig>,
    pub api: Option<ApiConfig>,
}

#[derive(Deserialize, Default)]
pub struct LlmConfig {
    /// Tried in order; first success wins. Empty means rule-based only.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

#[derive(Deserialize)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_api_bind")]
    pub bind: String,
}

fn default_db_path() -> String {
    "./briar-data/briar.db".to_string()
}
fn default_api_port() -> u16 {
    3001
}
fn default_api_bind() -> String {
    "127.0.0.1".to_string()
}

impl BriarConfig {
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn db_path(&self) -> String {
        self.db
            .as_ref()
            .map(|d| d.path.clone())
            .unwrap_or_else(default_db_path)
    }
}
