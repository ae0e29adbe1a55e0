//! Bionicle API server.
//!
//! # Architecture
//!
//! - Axum JSON API over a document store capability
//! - `PostgreSQL` via sqlx when a database URL is configured
//! - In-memory document and session stores otherwise (development)
//! - Signed session cookies via tower-sessions

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tower_sessions_sqlx_store::PostgresStore;

use bionicle_api::config::ApiConfig;
use bionicle_api::db::{self, MemoryStore, PgStore};
use bionicle_api::middleware::{
    EXPIRED_SESSION_CLEANUP_INTERVAL, create_session_layer, signing_key,
    spawn_expired_session_cleanup,
};
use bionicle_api::routes;
use bionicle_api::state::AppState;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ApiConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ApiConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bionicle_api=info,tower_http=debug".into());

    // JSON lines for log shippers, text otherwise
    let json_logs = config.json_logs;
    let json_layer =
        json_logs.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json_logs).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let key = signing_key(&config).expect("Invalid session secret");
    let secure = config.secure_cookies;

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p bionicle-cli -- migrate
    let (app, session_cleanup) = if let Some(database_url) = &config.database_url {
        let pool = db::create_pool(database_url)
            .await
            .expect("Failed to create database pool");
        tracing::info!("Database pool created");

        let session_store = PostgresStore::new(pool.clone());
        let cleanup = spawn_expired_session_cleanup(
            session_store.clone(),
            EXPIRED_SESSION_CLEANUP_INTERVAL,
        );

        let session_layer = create_session_layer(session_store, key, secure);
        let state = AppState::new(config.clone(), Arc::new(PgStore::new(pool)));
        (routes::app(state, session_layer), Some(cleanup))
    } else {
        tracing::warn!(
            "No database URL configured; using in-memory stores. Data is lost on restart."
        );

        let session_layer =
            create_session_layer(tower_sessions::MemoryStore::default(), key, secure);
        let state = AppState::new(config.clone(), Arc::new(MemoryStore::new()));
        (routes::app(state, session_layer), None)
    };

    // Sentry layers (outermost for full request coverage)
    let app = app
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("bionicle-api listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    if let Some(cleanup) = session_cleanup {
        cleanup.abort();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
