use std::{net::SocketAddr, sync::Arc, time::Duration};

use {
    axum::{
        Router,
        response::{IntoResponse, Json},
        routing::{get, post},
    },
    tower_http::cors::{Any, CorsLayer},
    tracing::{info, warn},
};

use {
    remora_config::RemoraConfig,
    remora_providers::{OpenAiProvider, ReplyProvider, StaticReplyProvider},
    remora_store::{ConversationStore, SqliteConversationStore},
};

use crate::{
    admin,
    state::{AppState, ReplySettings},
    webhook,
};

// ── Router ───────────────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
///
/// The webhook route is POST-only; axum answers any other method on the
/// path with 405 before the handler runs.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/webhooks/twilio", post(webhook::twilio_webhook))
        .route("/admin/conversations", get(admin::conversations))
        .route("/admin/identities", get(admin::identities))
        .layer(cors)
        .with_state(state)
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Wire the store, provider, and reply settings from config.
pub async fn build_state(config: &RemoraConfig) -> anyhow::Result<AppState> {
    let db_path = config.storage.resolve_database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    let pool = sqlx::SqlitePool::connect(&db_url).await?;
    SqliteConversationStore::init(&pool).await?;
    let store: Arc<dyn ConversationStore> = Arc::new(SqliteConversationStore::new(pool));

    let provider = build_provider(config)?;
    info!(
        provider = provider.name(),
        model = %config.provider.model,
        db = %db_path.display(),
        "gateway wired"
    );

    Ok(AppState::new(
        provider,
        store,
        ReplySettings::from_config(config),
    ))
}

/// Start the webhook server and run until ctrl-c.
pub async fn serve(config: RemoraConfig) -> anyhow::Result<()> {
    let state = build_state(&config).await?;
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("remora v{} listening on http://{addr}", env!("CARGO_PKG_VERSION"));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Pick the reply provider from config: the OpenAI-compatible client
/// when an API key is present, otherwise the fixed-text provider so the
/// webhook still answers.
fn build_provider(config: &RemoraConfig) -> anyhow::Result<Arc<dyn ReplyProvider>> {
    match config.provider.api_key {
        Some(ref key) => {
            let provider = OpenAiProvider::new(
                key.clone(),
                config.provider.model.clone(),
                config.provider.base_url.clone(),
                Duration::from_secs(config.provider.timeout_secs),
            )?;
            Ok(Arc::new(provider))
        },
        None => {
            warn!("no provider API key configured, every reply will be the fallback text");
            Ok(Arc::new(StaticReplyProvider::new(
                config.assistant.fallback_reply.clone(),
            )))
        },
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
