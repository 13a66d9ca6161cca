use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Extension, Json, Router, middleware};
use std::sync::Arc;

use crate::error::AppError;
use crate::extract::ApiPath;
use crate::services::auth::user::user_auth_middleware;
use crate::services::authz::Principal;
use crate::services::bookings;
use crate::state::AppState;

pub(crate) fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_bookings_handler))
        .route("/{id}", delete(cancel_booking_handler))
        .route_layer(middleware::from_fn_with_state(state, user_auth_middleware))
}

async fn list_bookings_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    let data = bookings::list_bookings_for_user(&state.db, &principal).await?;
    Ok((StatusCode::OK, Json(data)))
}

async fn cancel_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    bookings::cancel_booking(&state.db, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
