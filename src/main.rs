//! Lending Ledger Server
//!
//! In-memory book lending tracker served over REST.

use std::net::SocketAddr;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use lending_server::{api, config::AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing; the guard flushes file logs on exit
    let _log_guard = init_tracing(&config);

    tracing::info!("Starting Lending Ledger Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        credential_scheme = ?config.auth.credential_scheme,
        over_return_policy = ?config.lending.over_return_policy,
        require_registered_borrower = config.lending.require_registered_borrower,
        "Lending rules loaded"
    );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // State is volatile: a fresh store on every start
    let state = AppState::new(config);

    if state.config.lending.seed_sample_catalog {
        let seeded = state.services.catalog.seed_sample_catalog()?;
        tracing::info!("Seeded {} sample books", seeded);
    }

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("lending_server={},tower_http=debug", config.logging.level).into()
    });

    let stdout = if config.logging.format == "json" {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let (file, guard) = match &config.logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "lending-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file)
        .init();

    guard
}
