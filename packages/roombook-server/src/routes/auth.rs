use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use roombook_core::{
    LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, StatusResponse, UserProfile,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::extract::ApiJson;
use crate::services::auth::user::{self, user_auth_middleware};
use crate::services::authz::Principal;
use crate::state::AppState;

pub(crate) fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected_router = Router::new()
        .route("/profile", get(profile_handler))
        .route("/logout", post(logout_handler))
        .route_layer(middleware::from_fn_with_state(state, user_auth_middleware));

    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_handler))
        .merge(protected_router)
}

async fn register_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (_, tokens) = user::register(&state, request).await?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tokens = user::login(&state, request).await?;
    Ok((StatusCode::OK, Json(tokens)))
}

async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let access = user::refresh(&state, &request.refresh).await?;
    Ok((StatusCode::OK, Json(access)))
}

async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiJson(request): ApiJson<LogoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    user::logout(&state, &principal, &request.refresh).await?;
    Ok((
        StatusCode::OK,
        Json(StatusResponse {
            status: "ok".to_string(),
        }),
    ))
}

async fn profile_handler(Extension(principal): Extension<Principal>) -> Json<UserProfile> {
    Json(user::profile(&principal))
}
