use roombook_core::{BookingItem, CreateRoomRequest, RegisterRequest, TokenPair};
use sea_orm::Database;
use std::sync::Arc;

use crate::bootstrap::config::{AdminSeed, AuthConfig};
use crate::db::rooms::Model as RoomModel;
use crate::db::users::Model as UserModel;
use crate::services::authz::Principal;
use crate::services::{auth, bookings, rooms};
use crate::state::AppState;

pub(crate) const TEST_PASSWORD: &str = "hunter22";

pub(crate) fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test_secret_that_is_at_least_32_characters".to_string(),
        access_ttl: chrono::Duration::minutes(15),
        refresh_ttl: chrono::Duration::days(7),
        bcrypt_cost: 4,
    }
}

/// 每个测试一个全新的内存数据库
pub(crate) async fn test_state() -> Arc<AppState> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    crate::db::initialize::initial(&db).await.unwrap();
    Arc::new(AppState {
        db,
        auth: test_auth_config(),
    })
}

pub(crate) async fn register_user(state: &AppState, email: &str) -> (UserModel, TokenPair) {
    let name = email.split('@').next().unwrap_or(email).to_string();
    auth::user::register(
        state,
        RegisterRequest {
            email: email.to_string(),
            name,
            password: TEST_PASSWORD.to_string(),
            password_confirm: TEST_PASSWORD.to_string(),
            terms_accepted: true,
        },
    )
    .await
    .unwrap()
}

pub(crate) async fn create_admin(state: &AppState, email: &str) -> UserModel {
    auth::user::ensure_admin(
        state,
        &AdminSeed {
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
        },
    )
    .await
    .unwrap()
}

pub(crate) async fn create_room(
    state: &AppState,
    title: &str,
    price: f64,
    location: &str,
) -> RoomModel {
    rooms::create_room(
        &state.db,
        CreateRoomRequest {
            title: title.to_string(),
            price,
            location: location.to_string(),
            description: format!("{title} description"),
            image: None,
            availability: true,
        },
    )
    .await
    .unwrap()
}

pub(crate) async fn book_room(state: &AppState, user: &UserModel, room_id: i32) -> BookingItem {
    bookings::create_booking(&state.db, &Principal::from(user), room_id)
        .await
        .unwrap()
}
