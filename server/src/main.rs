use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use faqmatch_core::config::{DEFAULT_MAX_FEATURES, DEFAULT_THRESHOLD};
use faqmatch_core::corpus::load_corpus;
use faqmatch_core::{Engine, EngineConfig, NgramRange, Stopwords, Threshold};
use faqmatch_server::build_app;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus path (.json, .jsonl, or a directory of them)
    #[arg(long, env = "FAQ_CORPUS", default_value = "./faq.jsonl")]
    corpus: PathBuf,
    /// Optional JSON engine config; CLI flags below are ignored when set
    #[arg(long, env = "FAQ_CONFIG")]
    config: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Maximum vocabulary size
    #[arg(long, default_value_t = DEFAULT_MAX_FEATURES)]
    max_features: usize,
    /// Smallest n-gram length
    #[arg(long, default_value_t = 1)]
    min_n: usize,
    /// Largest n-gram length
    #[arg(long, default_value_t = 2)]
    max_n: usize,
    /// Default acceptance threshold
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,
    /// File with one stopword per line, replacing the English list
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

fn engine_config(args: &Args) -> Result<EngineConfig> {
    if let Some(path) = &args.config {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
        return Ok(config);
    }
    let stopwords = match &args.stopwords {
        Some(path) => std::fs::read_to_string(path)?.lines().collect::<Stopwords>(),
        None => Stopwords::english(),
    };
    Ok(EngineConfig {
        max_features: args.max_features,
        ngram_range: NgramRange::new(args.min_n, args.max_n),
        stopwords,
        threshold: Threshold::new(args.threshold)?,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    // Build the whole index before accepting connections
    let config = engine_config(&args)?;
    let entries = load_corpus(&args.corpus)?;
    let engine = Engine::initialize(entries.into_iter().map(|e| (e.question, e.answer)), config)
        .context("building matching engine")?;
    tracing::info!(documents = engine.len(), terms = engine.vocabulary().len(), "engine ready");

    let app: Router = build_app(Arc::new(engine), Duration::from_secs(args.timeout_secs));
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
