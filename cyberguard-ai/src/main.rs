//! cyberguard-ai - Content Risk Analysis Service
//!
//! Boots the analysis pipeline behind a small HTTP API:
//! 1. Load configuration (CLI → env → config dir → defaults)
//! 2. Initialise tracing
//! 3. Connect providers (unconfigured ones are reported, never fatal)
//! 4. Serve until Ctrl-C

use anyhow::{Context, Result};
use clap::Parser;
use cyberguard_ai::config::AnalyzerConfig;
use cyberguard_ai::fanout::FanOut;
use cyberguard_ai::history::MemoryHistory;
use cyberguard_ai::media::FfmpegDecoder;
use cyberguard_ai::providers::{FactCheckClient, GeminiClient, NewsClient, Provider};
use cyberguard_ai::scoring::ScoringEngine;
use cyberguard_ai::{Analyzer, AnalyzerSettings, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "cyberguard-ai", version, about = "Content risk analysis service")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = "CYBERGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file)
    #[arg(long, env = "CYBERGUARD_BIND")]
    bind: Option<String>,

    /// Default log filter when RUST_LOG is unset (overrides the config file)
    #[arg(long, env = "CYBERGUARD_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AnalyzerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let log_level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    cyberguard_common::logging::init_tracing(log_level)?;

    info!("Starting cyberguard-ai (Content Risk Analysis)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let providers = build_providers(&config).await?;
    let engine = ScoringEngine::new(config.scoring)?;

    let decoder = FfmpegDecoder::new(&config.video.ffmpeg_path, &config.video.ffprobe_path);
    if !decoder.is_available().await {
        warn!(
            ffmpeg = %config.video.ffmpeg_path,
            ffprobe = %config.video.ffprobe_path,
            "ffmpeg/ffprobe not found; video analysis requests will fail validation"
        );
    }

    let settings = AnalyzerSettings {
        fanout: config.fanout.policy(),
        max_video_frames: config.video.max_frames,
        ai_batch_frames: config.video.ai_batch_frames,
    };
    let analyzer = Analyzer::new(
        FanOut::new(providers),
        engine,
        Arc::new(decoder),
        Arc::new(MemoryHistory::new(config.history.capacity)),
        settings,
    );

    let state = AppState::new(Arc::new(analyzer));
    let app = cyberguard_ai::build_router(state, config.server.max_upload_bytes);

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("cyberguard-ai stopped");
    Ok(())
}

/// Providers in scoring order: AI verdict, claims, news
async fn build_providers(config: &AnalyzerConfig) -> Result<Vec<Arc<dyn Provider>>> {
    let gemini =
        GeminiClient::connect(&config.gemini_key_candidates(), config.gemini_settings()).await?;
    let factcheck = FactCheckClient::new(config.factcheck_api_key(), config.factcheck_settings())?;
    let news = NewsClient::new(config.news_api_key(), config.news_settings())?;

    let providers: Vec<Arc<dyn Provider>> = vec![Arc::new(gemini), Arc::new(factcheck), Arc::new(news)];
    for provider in &providers {
        info!(
            provider = %provider.kind(),
            configured = provider.is_configured(),
            "Provider registered"
        );
    }
    Ok(providers)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
