//! HTTP intake: conversation events and CI webhooks, routed per bot.

use std::{net::SocketAddr, sync::Arc};

use {
    adjutant_common::{BotEvent, BotId},
    adjutant_gitlab::{PushEvent, SECRET_FILE, TOKEN_HEADER, verify_token},
    adjutant_store::ConfigStore,
    axum::{
        Json, Router,
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use crate::registry::BotRegistry;

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<BotRegistry>,
    pub store: Arc<ConfigStore>,
}

/// Build the intake router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/bots/{bot_id}/events", post(event_handler))
        .route("/bots/{bot_id}/gitlab", post(push_handler))
        .with_state(state)
}

/// Bind and serve until the token is cancelled. In-flight requests finish
/// before this returns.
pub async fn serve(
    app: Router,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "intake listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "bots": state.registry.count().await,
    }))
}

/// Conversation events, pre-verified upstream. Accepted means enqueued;
/// handling is asynchronous.
async fn event_handler(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
    Json(event): Json<BotEvent>,
) -> StatusCode {
    let Some(bot) = BotId::parse(&bot_id) else {
        return StatusCode::NOT_FOUND;
    };
    state.registry.dispatch(&bot, event).await;
    StatusCode::ACCEPTED
}

/// CI push notifications. The caller must present the bot's secret token;
/// a bot that never issued one accepts no hooks at all.
async fn push_handler(
    State(state): State<AppState>,
    Path(bot_id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let Some(bot) = BotId::parse(&bot_id) else {
        return StatusCode::NOT_FOUND;
    };
    let Some(presented) = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()) else {
        return StatusCode::UNAUTHORIZED;
    };
    let expected = match state.store.read_secret(&bot, SECRET_FILE).await {
        Ok(Some(expected)) => expected,
        Ok(None) => return StatusCode::UNAUTHORIZED,
        Err(error) => {
            warn!(bot = %bot, %error, "webhook secret unreadable");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };
    if !verify_token(presented, &expected) {
        debug!(bot = %bot, "webhook token mismatch");
        return StatusCode::UNAUTHORIZED;
    }

    let Ok(payload) = serde_json::from_str::<serde_json::Value>(&body) else {
        return StatusCode::BAD_REQUEST;
    };
    if serde_json::from_value::<PushEvent>(payload.clone()).is_err() {
        return StatusCode::BAD_REQUEST;
    }
    state
        .registry
        .dispatch(&bot, BotEvent::GitlabPush { payload })
        .await;
    StatusCode::ACCEPTED
}
