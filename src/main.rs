use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use lead_intake::agent::{IntakeAgent, IntakeDeps};
use lead_intake::channels::{ChannelManager, CliChannel, TelegramChannel};
use lead_intake::config::AppConfig;
use lead_intake::intake::{DialogueEngine, spawn_sweep_task};
use lead_intake::routes::{AdminState, admin_routes};
use lead_intake::settings::SettingsStore;
use lead_intake::store::LibSqlBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();

    // Initialize tracing; the guard flushes the file writer on exit.
    let _log_guard = init_tracing(&config);

    eprintln!("🏠 Lead Intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Assistant: {} for {}",
        config.intake.assistant_name, config.intake.business_name
    );

    // ── Storage ─────────────────────────────────────────────────────────
    let db = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("opening database at {}", config.db_path.display()))?,
    );
    eprintln!("   Database: {}", config.db_path.display());

    let settings = Arc::new(
        SettingsStore::load(&config.settings_path)
            .await
            .with_context(|| format!("loading settings from {}", config.settings_path.display()))?,
    );
    eprintln!("   Settings: {}", config.settings_path.display());

    // ── Dialogue engine + sweep ─────────────────────────────────────────
    let engine = Arc::new(DialogueEngine::new(&config.intake));
    let _sweep_handle = spawn_sweep_task(Arc::clone(&engine), config.intake.sweep_interval);

    // ── Admin API ───────────────────────────────────────────────────────
    let app = admin_routes(AdminState {
        settings: Arc::clone(&settings),
        ledger: db.clone(),
        engine: Arc::clone(&engine),
    });
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port))
        .await
        .with_context(|| format!("binding admin API port {}", config.http_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Admin API server stopped");
        }
    });
    tracing::info!(port = config.http_port, "Admin API started");
    eprintln!("   Admin API: http://0.0.0.0:{}/api/status", config.http_port);

    // ── Channels ────────────────────────────────────────────────────────
    let mut channels = ChannelManager::new();

    if config.cli_enabled {
        channels.add(Box::new(CliChannel::new(config.local_phone.clone())));
    }

    if let Some(token) = config.telegram_token.take() {
        channels.add(Box::new(TelegramChannel::new(token)));
    }

    anyhow::ensure!(
        !channels.names().is_empty(),
        "no channels enabled; set TELEGRAM_BOT_TOKEN or INTAKE_CLI=1"
    );
    eprintln!("   Channels: {}\n", channels.names().join(", "));

    // ── Agent ───────────────────────────────────────────────────────────
    let deps = IntakeDeps {
        ledger: db.clone(),
        calendar: db,
        settings,
    };

    let agent = IntakeAgent::new(engine, deps, channels);
    agent.run().await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "lead-intake.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}
