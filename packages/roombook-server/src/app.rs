use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::routes::{auth, bookings, health, rooms};
use crate::state::AppState;

pub(crate) fn axum_app(state: Arc<AppState>) -> Router {
    Router::new()
        // 公开路由
        .route("/health", get(health::handler))
        // 房间目录 (读公开, 写需要授权)
        .nest("/rooms", rooms::router(Arc::clone(&state)))
        // 当前用户的预订
        .nest("/bookings", bookings::router(Arc::clone(&state)))
        .nest("/auth", auth::router(Arc::clone(&state)))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
}
