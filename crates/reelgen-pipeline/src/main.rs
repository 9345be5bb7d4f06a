//! Promo video generation binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reelgen_models::{Mood, RunRequest};
use reelgen_pipeline::{
    FfmpegRenderBackend, HttpAssetFetcher, Pipeline, PipelineConfig, PipelineServices,
};
use reelgen_providers::{
    ElevenLabsClient, FallbackTextGenerator, MusicLibrary, OpenAiClient, PexelsClient,
    TextGenerator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("reelgen=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let mut args = std::env::args().skip(1);
    let subject = match args.next() {
        Some(s) => s,
        None => {
            eprintln!("usage: reelgen <subject> [mood]");
            std::process::exit(2);
        }
    };
    let mood = Mood::parse(&args.next().unwrap_or_default());

    info!("Starting reelgen for {:?} (mood: {})", subject, mood);

    let config = PipelineConfig::from_env();
    let http = reqwest::Client::new();

    // Two-tier text generation: primary model, then a cheaper fallback.
    let primary = OpenAiClient::from_env(http.clone())?;
    let secondary = OpenAiClient::from_env(http.clone())?.with_model(
        std::env::var("OPENAI_FALLBACK_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
    );
    let text: Arc<dyn TextGenerator> = Arc::new(FallbackTextGenerator::new(vec![
        Arc::new(primary),
        Arc::new(secondary),
    ]));

    let search = Arc::new(PexelsClient::from_env(http.clone())?);
    let speech = Arc::new(ElevenLabsClient::from_env(http.clone())?);
    let music = MusicLibrary::new(&config.music_dir);

    // Kill an in-flight render on shutdown instead of leaving a partial
    // artifact behind.
    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        let _ = cancel_tx.send(true);
    });

    let renderer = FfmpegRenderBackend::new(config.render_timeout.as_secs()).with_cancel(cancel_rx);

    let services = PipelineServices {
        text,
        search,
        speech,
        music,
        fetcher: Arc::new(HttpAssetFetcher::new(http)),
        renderer: Arc::new(renderer),
    };

    let pipeline = Pipeline::new(config, services);
    let result = pipeline.run(&RunRequest::new(subject, mood)).await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.success {
        Ok(())
    } else {
        error!(
            "Generation failed ({}): {}",
            result.error_category.as_deref().unwrap_or("unknown"),
            result.error_message.as_deref().unwrap_or("no detail")
        );
        std::process::exit(1);
    }
}
