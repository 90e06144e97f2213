//! Messaging endpoint: HTTP webhook the connector posts activities to.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::channels::Activity;
use crate::dialog::Bot;

/// Shared state for webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    pub bot: Arc<Bot>,
}

/// POST /api/messages
///
/// Runs the activity through the bot and returns the replies as a JSON array.
async fn post_messages(
    State(state): State<WebhookState>,
    Json(activity): Json<Activity>,
) -> impl IntoResponse {
    debug!(
        kind = %activity.kind,
        conversation = %activity.conversation.id,
        "Activity received"
    );
    match state.bot.process(&activity).await {
        Ok(replies) => Json(replies).into_response(),
        Err(e) => {
            error!(conversation = %activity.conversation.id, error = %e, "Turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "bank-bot"}))
}

/// GET /api/users/{user_id}/profile
///
/// Returns the stored profile, or 404 if the user has none.
async fn get_profile(
    State(state): State<WebhookState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match state.bot.store().load_profile(&user_id).await {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No profile for this user"})),
        )
            .into_response(),
        Err(e) => {
            error!(user = %user_id, error = %e, "Profile lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Build the webhook routes.
pub fn webhook_routes(bot: Arc<Bot>) -> Router {
    Router::new()
        .route("/api/messages", post(post_messages))
        .route("/health", get(health))
        .route("/api/users/{user_id}/profile", get(get_profile))
        .with_state(WebhookState { bot })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
