use briar_core::{AnalysisMethod, BehaviorSample, ScoreResult, ScoringPolicy};
use briar_llm::LlmClient;
use tracing::{info, warn};

/// A completed analysis: the score envelope plus which path produced it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: ScoreResult,
    pub method: AnalysisMethod,
}

/// Tries LLM adapters in configured priority order and falls back to the
/// rule-based scorer, which cannot fail. Every call returns a fully
/// populated result; "no successful analysis" is unreachable by
/// construction. No retries beyond the provider list, no state between
/// calls.
pub struct Engine {
    providers: Vec<LlmClient>,
    policy: ScoringPolicy,
}

impl Engine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self {
            providers: Vec::new(),
            policy,
        }
    }

    pub fn with_provider(mut self, client: LlmClient) -> Self {
        self.providers.push(client);
        self
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub async fn analyze(&self, sample: &BehaviorSample) -> Analysis {
        let features = briar_score::extract_features(&sample.tracking_data);

        for client in &self.providers {
            if !client.is_configured() {
                continue;
            }
            match client.analyze(&features, &self.policy).await {
                Ok(result) => {
                    info!(
                        provider = %client.name(),
                        score = result.trust_score,
                        "llm analysis succeeded"
                    );
                    return Analysis {
                        result,
                        method: AnalysisMethod::Llm(client.name().to_string()),
                    };
                }
                Err(e) => {
                    warn!(provider = %client.name(), error = %e, "llm adapter failed, trying next path");
                }
            }
        }

        let result = briar_score::evaluate(sample, &self.policy);
        info!(score = result.trust_score, "rule-based analysis completed");
        Analysis {
            result,
            method: AnalysisMethod::RuleBasedFallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use briar_core::TrackingData;
    use briar_llm::ProviderConfig;

    fn empty_sample() -> BehaviorSample {
        BehaviorSample {
            user_id: "u1".into(),
            tracking_data: TrackingData::default(),
        }
    }

    fn dead_provider() -> LlmClient {
        let config: ProviderConfig = toml::from_str(
            r#"
            name = "dead"
            endpoint = "http://127.0.0.1:1/v1/chat/completions"
            model = "test-model"
            api_key = "sk-test"
            timeout_secs = 2
            "#,
        )
        .unwrap();
        LlmClient::new(config).unwrap()
    }

    fn keyless_provider() -> LlmClient {
        let config: ProviderConfig = toml::from_str(
            r#"
            name = "keyless"
            endpoint = "http://127.0.0.1:1/v1/chat/completions"
            model = "test-model"
            "#,
        )
        .unwrap();
        LlmClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn no_providers_means_rule_based_path() {
        let engine = Engine::new(ScoringPolicy::default());
        let analysis = engine.analyze(&empty_sample()).await;
        assert_eq!(analysis.method, AnalysisMethod::RuleBasedFallback);
        assert_eq!(analysis.method.as_tag(), "rule_based_fallback");
        assert!((0.0..=1.0).contains(&analysis.result.trust_score));
    }

    #[tokio::test]
    async fn failing_providers_fall_back_to_rule_based() {
        let engine = Engine::new(ScoringPolicy::default())
            .with_provider(dead_provider())
            .with_provider(dead_provider());
        let analysis = engine.analyze(&empty_sample()).await;
        assert_eq!(analysis.method, AnalysisMethod::RuleBasedFallback);
        assert!(!analysis.result.reasons.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_provider_is_skipped_without_network_io() {
        let engine = Engine::new(ScoringPolicy::default()).with_provider(keyless_provider());
        let analysis = engine.analyze(&empty_sample()).await;
        assert_eq!(analysis.method, AnalysisMethod::RuleBasedFallback);
    }
}
