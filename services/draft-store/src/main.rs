//! YKK AP Draft Store
//!
//! Key-value backed persistence for quotation drafts and SMTP settings.

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    serve, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use ykk_database::{KvBackend, QuotationRepository, SmtpConfigRepository};
use ykk_utils::{init_logging, AppConfig};

mod error;
mod handlers;

#[derive(Clone)]
pub struct AppState {
    pub kv: KvBackend,
    pub quotations: Arc<QuotationRepository>,
    pub smtp: Arc<SmtpConfigRepository>,
}

impl AppState {
    pub fn new(kv: KvBackend, key_prefix: &str) -> Self {
        Self {
            quotations: Arc::new(QuotationRepository::new(kv.clone(), key_prefix)),
            smtp: Arc::new(SmtpConfigRepository::new(kv.clone(), key_prefix)),
            kv,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });
    config.validate()?;

    init_logging(&config.logging)?;
    info!(backend = ?config.draft_store.backend, "Starting YKK AP Draft Store");

    let kv = KvBackend::connect(&config.draft_store).await?;
    let state = AppState::new(kv, &config.draft_store.key_prefix);
    let app = create_app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.draft_store.port));
    let listener = TcpListener::bind(&addr).await?;
    info!("Draft Store listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

fn create_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/quotations/draft", post(handlers::save_draft))
        .route("/quotations", get(handlers::list_drafts))
        .route(
            "/quotations/:id",
            get(handlers::get_draft).delete(handlers::delete_draft),
        )
        .route("/save-smtp-config", post(handlers::save_smtp_config))
        .route("/smtp-config", get(handlers::get_smtp_config))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST, Method::DELETE])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .layer(DefaultBodyLimit::max(config.server.max_request_size)),
        )
        .with_state(state)
}
