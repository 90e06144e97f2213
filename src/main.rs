use std::sync::Arc;

use anyhow::Context;
use bank_bot::channels::{CliChannel, webhook_routes};
use bank_bot::config::BotConfig;
use bank_bot::dialog::{Bot, RoutingTable};
use bank_bot::recognizer::{IntentRecognizer, KeywordRecognizer, LuisRecognizer};
use bank_bot::store::{BotStore, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::load()?;
    let cli_mode = std::env::args().skip(1).any(|arg| arg == "--cli");

    eprintln!("🏦 Bank Bot v{}", env!("CARGO_PKG_VERSION"));

    // ── Database ─────────────────────────────────────────────────────────
    let store: Arc<dyn BotStore> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("opening database at {}", config.db_path.display()))?,
    );
    eprintln!("   Database: {}", config.db_path.display());

    // ── Intent recognition ──────────────────────────────────────────────
    let recognizer: Arc<dyn IntentRecognizer> = match &config.luis_model_url {
        Some(url) => Arc::new(LuisRecognizer::new(url.clone())?),
        None => {
            tracing::warn!("LUIS_MODEL_URL not set; using the keyword recognizer");
            Arc::new(KeywordRecognizer::default_rules())
        }
    };
    eprintln!("   Recognizer: {}", recognizer.name());

    let bot = Arc::new(Bot::new(
        store,
        recognizer,
        Arc::new(RoutingTable::bank_default()),
    ));

    if cli_mode {
        eprintln!("   Type a message and press Enter. /quit to exit.\n");
        CliChannel::new(bot, config.bot_id.clone()).run().await?;
        return Ok(());
    }

    // ── Messaging endpoint ──────────────────────────────────────────────
    let app = webhook_routes(bot);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("binding port {}", config.port))?;
    eprintln!("   Messaging endpoint: http://0.0.0.0:{}/api/messages", config.port);
    tracing::info!(port = config.port, "Bot server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
