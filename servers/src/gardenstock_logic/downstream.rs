use crate::gardenstock_logic::config::Config;
use crate::gardenstock_logic::model::{FavoritesAction, FavoritesRequest, OpsReply, TrackRequest};
use crate::gardenstock_logic::state::{AppState, TrackerError};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    routing::post,
    Json, Router,
};
use lib_common::stock::model::StockCategory;
use lib_common::utils::timetools;
use serde::Deserialize;
use std::net::SocketAddr;
use tokio::sync::broadcast;

/// Serves the subscriber-facing operations. The chat command layer lives in
/// another process and talks to this router; it owns parsing, we own state.
pub async fn run(config: Config, state: AppState, mut shutdown: broadcast::Receiver<()>) {
    let app = Router::new()
        .route(
            "/subscribers/{id}/track",
            post(start_tracking).delete(stop_tracking),
        )
        .route("/subscribers/{id}/favorites", post(update_favorites))
        .route("/subscribers/{id}/lastseen", get(query_last_seen))
        .route("/health", get(health_handler))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    log::info!("Subscriber API listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind subscriber API on {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.recv().await.ok();
            log::info!("Subscriber API shutting down.");
        })
        .await
    {
        log::error!("Subscriber API error: {}", e);
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn start_tracking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TrackRequest>,
) -> impl IntoResponse {
    match state.start_tracking(&id, &request.credential).await {
        Ok(()) => reply(
            StatusCode::OK,
            "✅ Tracking started. You will be notified on every stock update.",
        ),
        Err(e) => error_reply(e),
    }
}

async fn stop_tracking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.stop_tracking(&id).await {
        Ok(()) => reply(StatusCode::OK, "🛑 Tracking stopped."),
        Err(e) => error_reply(e),
    }
}

async fn update_favorites(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<FavoritesRequest>,
) -> impl IntoResponse {
    let result = match request.action {
        FavoritesAction::Add => state.add_favorites(&id, &request.names).await,
        FavoritesAction::Remove => state.remove_favorites(&id, &request.names).await,
    };
    match result {
        Ok(updated) => {
            let listing = if updated.is_empty() {
                "(empty)".to_string()
            } else {
                updated.join(", ")
            };
            reply(
                StatusCode::OK,
                format!("✅ Favorite list updated: {}", listing),
            )
        }
        Err(e) => error_reply(e),
    }
}

#[derive(Debug, Deserialize)]
struct LastSeenParams {
    /// Pipe-separated category tokens; absent means all categories.
    categories: Option<String>,
}

async fn query_last_seen(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<LastSeenParams>,
) -> impl IntoResponse {
    log::debug!("Last-seen query from {}", id);

    // Unknown tokens are skipped rather than rejected.
    let requested: Vec<StockCategory> = match params.categories.as_deref() {
        Some(raw) => raw.split('|').filter_map(StockCategory::parse).collect(),
        None => StockCategory::ALL.to_vec(),
    };

    let now = timetools::manila_now();
    let mut blocks = Vec::new();
    for category in requested {
        let entries = state.last_seen_entries(category).await;
        if entries.is_empty() {
            continue;
        }
        let lines: Vec<String> = entries
            .iter()
            .map(|(name, seen_at)| format!("• {}: {}", name, timetools::time_ago(*seen_at, now)))
            .collect();
        blocks.push(format!(
            "🔹 {} ({})\n{}",
            category.to_string().to_uppercase(),
            lines.len(),
            lines.join("\n")
        ));
    }

    if blocks.is_empty() {
        reply(
            StatusCode::OK,
            "⚠️ No last seen data found for the selected category.",
        )
    } else {
        reply(
            StatusCode::OK,
            format!("📦 Last Seen Items\n\n{}", blocks.join("\n\n")),
        )
    }
}

fn reply(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<OpsReply>) {
    (
        status,
        Json(OpsReply {
            message: message.into(),
        }),
    )
}

fn error_reply(error: TrackerError) -> (StatusCode, Json<OpsReply>) {
    match error {
        TrackerError::AlreadyActive => reply(
            StatusCode::CONFLICT,
            "📡 You're already tracking this feed. Stop tracking first to restart.",
        ),
        TrackerError::NotActive => reply(
            StatusCode::CONFLICT,
            "⚠️ You don't have an active tracking session.",
        ),
        TrackerError::EmptyNames => reply(
            StatusCode::BAD_REQUEST,
            "📌 Usage: provide at least one item name, e.g. names = [\"Carrot\", \"Watering Can\"]",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Manila;
    use lib_common::stock::model::StockItem;

    #[tokio::test]
    async fn test_last_seen_report_shape() {
        let state = AppState::new();
        let mut tick = lib_common::stock::model::FeedTick::empty();
        tick.set(
            StockCategory::Gear,
            lib_common::stock::model::CategorySnapshot {
                items: vec![StockItem {
                    name: "Hoe".into(),
                    quantity: 1,
                    emoji: None,
                }],
                countdown: None,
                appear_in: None,
            },
        );
        let seen_at = Manila.timestamp_opt(1_700_000_000, 0).unwrap();
        state.record_tick(&tick, seen_at).await;

        // Direct state checks; the HTTP layer only formats what state holds.
        let entries = state.last_seen_entries(StockCategory::Gear).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "Hoe");
        assert!(state
            .last_seen_entries(StockCategory::Seed)
            .await
            .is_empty());
    }

    #[test]
    fn test_error_replies_map_to_statuses() {
        let (status, _) = error_reply(TrackerError::AlreadyActive);
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = error_reply(TrackerError::NotActive);
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = error_reply(TrackerError::EmptyNames);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
