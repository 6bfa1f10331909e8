use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backend::config::Config;
use backend::repository::{MemoryStore, PgStore, Storage};
use backend::services::mailer::LogMailer;
use backend::services::session::SessionStore;
use backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with JSON formatting (configurable via env)
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "text".to_string())
        .eq_ignore_ascii_case("json");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "backend=info,tower_http=info".into());

    if use_json {
        // JSON structured logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Human-readable logging for development
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        service = "backend",
        version = env!("CARGO_PKG_VERSION"),
        log_format = if use_json { "json" } else { "text" },
        "Starting casino backend"
    );

    // Load configuration
    let config = Config::load()?;
    tracing::info!("Configuration loaded");

    // Pick the storage backend
    let store: Arc<dyn Storage> = match &config.database.url {
        Some(url) => {
            let store = PgStore::connect(url, config.database.pool_size).await?;
            store.run_migrations().await?;
            tracing::info!("Postgres connected, migrations applied");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    // Session store with its periodic expiry sweep
    let sessions = SessionStore::new();
    let sweeper = sessions.clone();
    let sweep_interval = Duration::from_secs(config.session.sweep_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            let removed = sweeper.sweep_expired();
            if removed > 0 {
                tracing::debug!(removed, "Swept expired sessions");
            }
        }
    });

    // Metrics recorder, rendered by the /metrics route
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()?;

    let api_port = config.api_port;
    let state = AppState::new(
        config,
        store,
        sessions,
        Arc::new(LogMailer),
        Some(metrics_handle),
    );
    let app = backend::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], api_port));
    tracing::info!("Casino backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
