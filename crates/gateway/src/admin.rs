//! Read-only views over stored conversations.
//!
//! Unlike the webhook path, these handlers report store failures to the
//! caller instead of swallowing them.

use {
    axum::{
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Json},
    },
    tracing::warn,
};

use crate::state::AppState;

/// `GET /admin/conversations`: every identity with its threads and
/// each thread's messages in replay order.
pub async fn conversations(State(state): State<AppState>) -> impl IntoResponse {
    match collect_conversations(&state).await {
        Ok(identities) => Json(serde_json::json!({ "identities": identities })).into_response(),
        Err(e) => {
            warn!("conversation listing failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        },
    }
}

/// `GET /admin/identities`: flat list of known correspondents.
pub async fn identities(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.list_identities().await {
        Ok(identities) => Json(serde_json::json!({ "identities": identities })).into_response(),
        Err(e) => {
            warn!("identity listing failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        },
    }
}

async fn collect_conversations(
    state: &AppState,
) -> remora_store::Result<Vec<serde_json::Value>> {
    let mut out = Vec::new();
    for identity in state.store.list_identities().await? {
        let mut threads = Vec::new();
        for thread in state.store.list_threads(&identity.id).await? {
            let messages = state.store.list_messages(&thread.id).await?;
            threads.push(serde_json::json!({
                "id": thread.id,
                "provider_sid": thread.provider_sid,
                "started_at": thread.started_at,
                "ended_at": thread.ended_at,
                "messages": messages,
            }));
        }
        out.push(serde_json::json!({
            "id": identity.id,
            "token": identity.token,
            "created_at": identity.created_at,
            "threads": threads,
        }));
    }
    Ok(out)
}
