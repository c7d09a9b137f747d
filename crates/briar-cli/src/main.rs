mod api;
mod config;

use api::{api_router, ApiState};
use briar_core::BehaviorSample;
use briar_db::TrustStore;
use briar_engine::Engine;
use briar_llm::LlmClient;
use clap::{Parser, Subcommand};
use config::BriarConfig;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "briar")]
#[command(about = "Behavioral trust scoring to gate CAPTCHA challenges")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single behavior sample from a JSON file
    Analyze {
        #[arg(help = "Path to a behavior sample JSON file")]
        sample: String,
        #[arg(short = 'f', long, help = "Path to config file")]
        config: Option<String>,
    },
    /// Run the scoring API server
    Serve {
        #[arg(short = 'f', long, default_value = "briar.toml", help = "Path to config file")]
        config: String,
    },
}

fn build_engine(config: &BriarConfig) -> Engine {
    let mut engine = Engine::new(config.scoring.clone());
    for provider in &config.llm.providers {
        match LlmClient::new(provider.clone()) {
            Ok(client) => {
                if !client.is_configured() {
                    warn!(provider = %client.name(), "provider has no credentials, will be skipped");
                }
                engine = engine.with_provider(client);
            }
            Err(e) => warn!(provider = %provider.name, error = %e, "provider init failed"),
        }
    }
    engine
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "briar=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze { sample, config } => run_analyze(sample, config).await,
        Commands::Serve { config: config_path } => match BriarConfig::from_file(&config_path) {
            Ok(cfg) => run_serve(cfg).await,
            Err(e) => Err(format!("failed to load config {}: {}", config_path, e).into()),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run_analyze(
    sample_path: String,
    config_path: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => BriarConfig::from_file(&path)?,
        None => BriarConfig::default(),
    };

    let content = std::fs::read_to_string(&sample_path)?;
    let sample: BehaviorSample = serde_json::from_str(&content)?;

    let engine = build_engine(&config);
    let analysis = engine.analyze(&sample).await;
    let result = &analysis.result;

    println!("--- trust analysis for {} ---", sample.user_id);
    println!("trust score: {:.3}", result.trust_score);
    println!("trust level: {}", result.trust_level.as_str());
    println!("needs captcha: {}", result.needs_captcha);
    println!("confidence: {:.2}", result.confidence);
    println!("method: {}", analysis.method.as_tag());

    println!("\nreasons ({}):", result.reasons.len());
    for reason in &result.reasons {
        println!("  - {}", reason);
    }

    println!(
        "\ndata quality: {:.2}  session: {:.0}ms  interactions: {}  suspicious: {}",
        result.metadata.data_quality,
        result.metadata.session_duration,
        result.metadata.total_interactions,
        result.metadata.suspicious_pattern_count
    );

    Ok(())
}

async fn run_serve(config: BriarConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = config.db_path();
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = TrustStore::open(&db_path)?;
    info!(path = %db_path, "database opened");

    let engine = build_engine(&config);
    if config.llm.providers.is_empty() {
        info!("no llm providers configured, running rule-based only");
    }

    let (bind, port) = config
        .api
        .as_ref()
        .map(|a| (a.bind.clone(), a.port))
        .unwrap_or_else(|| ("127.0.0.1".to_string(), 3001));

    let state = Arc::new(ApiState { engine, db });
    let router = api_router(state);

    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("briar api listening on {}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}
