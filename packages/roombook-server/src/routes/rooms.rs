use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router, middleware};
use roombook_core::{
    CreateReviewRequest, CreateRoomRequest, ReviewItem, RoomItem, RoomSearchQuery,
    UpdateRoomRequest,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::services::auth::user::user_auth_middleware;
use crate::services::authz::{Capability, Principal, authorize};
use crate::services::{bookings, reviews, rooms};
use crate::state::AppState;

pub(crate) fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected_router = Router::new()
        .route("/", post(create_room_handler))
        .route("/{id}", put(update_room_handler).delete(delete_room_handler))
        .route("/{id}/booking", post(create_booking_handler))
        .route("/{id}/reviews", post(create_review_handler))
        .route_layer(middleware::from_fn_with_state(state, user_auth_middleware));

    Router::new()
        .route("/", get(list_rooms_handler))
        .route("/search", get(search_rooms_handler))
        .route("/{id}", get(get_room_handler))
        .route("/{id}/reviews", get(list_reviews_handler))
        .merge(protected_router)
}

async fn list_rooms_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let data: Vec<RoomItem> = rooms::list_rooms(&state.db)
        .await?
        .into_iter()
        .map(RoomItem::from)
        .collect();
    Ok((StatusCode::OK, Json(data)))
}

async fn search_rooms_handler(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<RoomSearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let data: Vec<RoomItem> = rooms::search_rooms(&state.db, &query)
        .await?
        .into_iter()
        .map(RoomItem::from)
        .collect();
    Ok((StatusCode::OK, Json(data)))
}

async fn get_room_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let room = rooms::get_room(&state.db, id).await?;
    Ok((StatusCode::OK, Json(RoomItem::from(room))))
}

async fn create_room_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiJson(request): ApiJson<CreateRoomRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Capability::ManageCatalog)?;
    let room = rooms::create_room(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(RoomItem::from(room))))
}

async fn update_room_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<UpdateRoomRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Capability::ManageCatalog)?;
    let room = rooms::update_room(&state.db, id, request).await?;
    Ok((StatusCode::OK, Json(RoomItem::from(room))))
}

async fn delete_room_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Capability::ManageCatalog)?;
    rooms::delete_room(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let booking = bookings::create_booking(&state.db, &principal, id).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn list_reviews_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let data: Vec<ReviewItem> = reviews::list_reviews(&state.db, id)
        .await?
        .into_iter()
        .map(ReviewItem::from)
        .collect();
    Ok((StatusCode::OK, Json(data)))
}

async fn create_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let review = reviews::create_review(&state.db, &principal, id, request).await?;
    Ok((StatusCode::CREATED, Json(ReviewItem::from(review))))
}
