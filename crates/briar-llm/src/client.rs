use crate::prompt;
use crate::provider::{ProviderConfig, ProviderKind};
use briar_core::{
    BriarError, BriarResult, FeatureVector, ScoreMetadata, ScoreResult, ScoringPolicy, TrustLevel,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

const MAX_REASONS: usize = 5;

/// Remote-LLM analysis adapter. Everything that goes wrong here — network,
/// timeout, malformed JSON, out-of-range score — is an adapter failure,
/// distinct from a successful low-trust verdict, so the orchestrator can
/// fall back.
pub struct LlmClient {
    config: ProviderConfig,
    client: reqwest::Client,
}

/// The strict-JSON shape the model is instructed to return.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmVerdict {
    trust_score: f64,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    key_factors: Vec<String>,
}

impl LlmClient {
    pub fn new(config: ProviderConfig) -> BriarResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub async fn analyze(
        &self,
        features: &FeatureVector,
        policy: &ScoringPolicy,
    ) -> BriarResult<ScoreResult> {
        if !self.config.is_configured() {
            return Err(BriarError::Adapter(format!(
                "{}: missing API credentials",
                self.config.name
            )));
        }

        let user_prompt = prompt::build_user_prompt(features);
        let text = match self.config.kind {
            ProviderKind::OpenAiCompat => self.complete_chat(&user_prompt).await?,
            ProviderKind::HuggingFace => self.complete_inference(&user_prompt).await?,
        };
        debug!(provider = %self.config.name, "llm raw response: {:.200}", text);

        parse_verdict(&self.config.name, &text, features, policy)
    }

    async fn complete_chat(&self, user_prompt: &str) -> BriarResult<String> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": prompt::SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt }
            ],
            "temperature": 0.2
        });

        let mut req = self.client.post(self.config.endpoint.clone()).json(&body);
        if let Some(key) = self.config.resolve_api_key() {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| BriarError::Adapter(format!("{}: {}", self.config.name, e)))?;
        if !resp.status().is_success() {
            return Err(BriarError::Adapter(format!(
                "{}: HTTP {}",
                self.config.name,
                resp.status()
            )));
        }

        let value: Value = resp
            .json()
            .await
            .map_err(|e| BriarError::Adapter(format!("{}: {}", self.config.name, e)))?;
        value["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                BriarError::Adapter(format!("{}: no completion content", self.config.name))
            })
    }

    async fn complete_inference(&self, user_prompt: &str) -> BriarResult<String> {
        let body = json!({
            "inputs": format!("{}\n\n{}", prompt::SYSTEM_PROMPT, user_prompt),
            "parameters": { "max_new_tokens": 400, "return_full_text": false }
        });

        let mut req = self.client.post(self.config.endpoint.clone()).json(&body);
        if let Some(key) = self.config.resolve_api_key() {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| BriarError::Adapter(format!("{}: {}", self.config.name, e)))?;
        if !resp.status().is_success() {
            return Err(BriarError::Adapter(format!(
                "{}: HTTP {}",
                self.config.name,
                resp.status()
            )));
        }

        let value: Value = resp
            .json()
            .await
            .map_err(|e| BriarError::Adapter(format!("{}: {}", self.config.name, e)))?;
        value[0]["generated_text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                BriarError::Adapter(format!("{}: no generated text", self.config.name))
            })
    }
}

/// Parses a model response into the canonical envelope. The returned score
/// is floored at the policy's LLM minimum so the two analysis paths stay
/// policy-consistent.
pub fn parse_verdict(
    provider: &str,
    text: &str,
    features: &FeatureVector,
    policy: &ScoringPolicy,
) -> BriarResult<ScoreResult> {
    let stripped = strip_code_fences(text);

    let verdict: LlmVerdict = serde_json::from_str(&stripped)
        .map_err(|e| BriarError::Adapter(format!("{}: malformed verdict JSON: {}", provider, e)))?;

    if !verdict.trust_score.is_finite() || !(0.0..=1.0).contains(&verdict.trust_score) {
        return Err(BriarError::Adapter(format!(
            "{}: trust score {} out of range",
            provider, verdict.trust_score
        )));
    }

    let adjusted = verdict.trust_score.max(policy.llm_score_floor);

    let mut reasons: Vec<String> = Vec::new();
    if let Some(reasoning) = verdict.reasoning {
        if !reasoning.is_empty() {
            reasons.push(reasoning);
        }
    }
    reasons.extend(verdict.key_factors);
    reasons.truncate(MAX_REASONS);

    Ok(ScoreResult {
        trust_score: adjusted,
        trust_level: TrustLevel::from_score(adjusted),
        needs_captcha: adjusted < policy.llm_captcha_threshold,
        confidence: verdict.confidence.unwrap_or(0.8).clamp(0.0, 1.0),
        reasons,
        metadata: ScoreMetadata {
            human_factors: 0.0,
            bot_factors: 0.0,
            data_quality: features.behavior_diversity,
            session_duration: features.session_duration_ms,
            total_interactions: features.interaction_count,
            suspicious_pattern_count: features.suspicious_pattern_count,
        },
    })
}

/// Models often wrap their JSON in a markdown code fence despite being
/// told not to.
fn strip_code_fences(text: &str) -> String {
    let re = Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("static regex");
    match re.captures(text.trim()) {
        Some(caps) => caps[1].to_string(),
        None => text.trim().to_string(),
    }
}
