use roombook_core::{CreateRoomRequest, RoomItem, RoomSearchQuery, UpdateRoomRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::db::rooms::{self, ActiveModel as RoomActiveModel, Model as RoomModel};
use crate::db::{Bookings, Reviews, Rooms, bookings, reviews};
use crate::error::AppError;

impl From<RoomModel> for RoomItem {
    fn from(room: RoomModel) -> Self {
        Self {
            id: room.id,
            title: room.title,
            price: room.price,
            location: room.location,
            description: room.description,
            image: room.image,
            availability: room.availability,
        }
    }
}

fn room_not_found() -> AppError {
    AppError::NotFound("Room not found".to_string())
}

fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation("Price must be a non-negative number".to_string()));
    }
    Ok(())
}

fn required_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// 解析价格过滤条件, 空字符串视为未提供
fn parse_price_filter(field: &str, raw: Option<&str>) -> Result<Option<f64>, AppError> {
    let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(None);
    };
    let value: f64 = text.parse().map_err(|_| {
        AppError::InvalidArgument(format!("{field} must be a non-negative decimal"))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::InvalidArgument(format!(
            "{field} must be a non-negative decimal"
        )));
    }
    Ok(Some(value))
}

pub(crate) async fn list_rooms(db: &DatabaseConnection) -> Result<Vec<RoomModel>, AppError> {
    Ok(Rooms::find()
        .order_by_asc(rooms::Column::Id)
        .all(db)
        .await?)
}

pub(crate) async fn get_room(db: &DatabaseConnection, id: i32) -> Result<RoomModel, AppError> {
    Rooms::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(room_not_found)
}

pub(crate) async fn create_room(
    db: &DatabaseConnection,
    request: CreateRoomRequest,
) -> Result<RoomModel, AppError> {
    validate_price(request.price)?;
    let room = RoomActiveModel {
        title: Set(required_text("title", &request.title)?),
        price: Set(request.price),
        location: Set(required_text("location", &request.location)?),
        description: Set(required_text("description", &request.description)?),
        image: Set(request.image),
        availability: Set(request.availability),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(room_id = room.id, title = %room.title, "room created");
    Ok(room)
}

pub(crate) async fn update_room(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateRoomRequest,
) -> Result<RoomModel, AppError> {
    let room = get_room(db, id).await?;
    let mut active: RoomActiveModel = room.into();

    if let Some(title) = request.title {
        active.title = Set(required_text("title", &title)?);
    }
    if let Some(price) = request.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(location) = request.location {
        active.location = Set(required_text("location", &location)?);
    }
    if let Some(description) = request.description {
        active.description = Set(required_text("description", &description)?);
    }
    if let Some(image) = request.image {
        active.image = Set(Some(image));
    }
    if let Some(availability) = request.availability {
        active.availability = Set(availability);
    }

    if !active.is_changed() {
        return get_room(db, id).await;
    }

    let room = active.update(db).await?;
    info!(room_id = room.id, "room updated");
    Ok(room)
}

/// 删除房间, 同一事务内级联删除其预订与评价
pub(crate) async fn delete_room(db: &DatabaseConnection, id: i32) -> Result<(), AppError> {
    let txn = db.begin().await?;

    if Rooms::find_by_id(id).one(&txn).await?.is_none() {
        return Err(room_not_found());
    }

    let removed_bookings = Bookings::delete_many()
        .filter(bookings::Column::RoomId.eq(id))
        .exec(&txn)
        .await?;
    let removed_reviews = Reviews::delete_many()
        .filter(reviews::Column::RoomId.eq(id))
        .exec(&txn)
        .await?;
    Rooms::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    info!(
        room_id = id,
        bookings = removed_bookings.rows_affected,
        reviews = removed_reviews.rows_affected,
        "room deleted"
    );
    Ok(())
}

/// 按价格区间、地点(不区分大小写的子串)与可用性过滤, 条件取交集
pub(crate) async fn search_rooms(
    db: &DatabaseConnection,
    query: &RoomSearchQuery,
) -> Result<Vec<RoomModel>, AppError> {
    let price_min = parse_price_filter("price_min", query.price_min.as_deref())?;
    let price_max = parse_price_filter("price_max", query.price_max.as_deref())?;

    let mut condition = Condition::all();
    if let Some(min) = price_min {
        condition = condition.add(rooms::Column::Price.gte(min));
    }
    if let Some(max) = price_max {
        condition = condition.add(rooms::Column::Price.lte(max));
    }
    if let Some(available) = query.available {
        condition = condition.add(rooms::Column::Availability.eq(available));
    }

    let candidates = Rooms::find()
        .filter(condition)
        .order_by_asc(rooms::Column::Id)
        .all(db)
        .await?;

    let location = query
        .location
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_lowercase);

    Ok(match location {
        Some(needle) => candidates
            .into_iter()
            .filter(|room| room.location.to_lowercase().contains(&needle))
            .collect(),
        None => candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::authz::Principal;
    use crate::test_support::{book_room, create_room as seed_room, register_user, test_state};
    use roombook_core::CreateReviewRequest;

    fn ocean_view() -> CreateRoomRequest {
        CreateRoomRequest {
            title: "Ocean View".to_string(),
            price: 150.0,
            location: "Malibu".to_string(),
            description: "Sea breeze".to_string(),
            image: Some("rooms/ocean.jpg".to_string()),
            availability: true,
        }
    }

    fn search(
        price_min: Option<&str>,
        price_max: Option<&str>,
        location: Option<&str>,
    ) -> RoomSearchQuery {
        RoomSearchQuery {
            price_min: price_min.map(str::to_string),
            price_max: price_max.map(str::to_string),
            location: location.map(str::to_string),
            available: None,
        }
    }

    #[test]
    fn test_parse_price_filter() {
        assert_eq!(parse_price_filter("price_min", None).unwrap(), None);
        assert_eq!(parse_price_filter("price_min", Some("  ")).unwrap(), None);
        assert_eq!(
            parse_price_filter("price_min", Some("100.50")).unwrap(),
            Some(100.5)
        );
        assert!(matches!(
            parse_price_filter("price_min", Some("abc")),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_price_filter("price_max", Some("-1")),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(parse_price_filter("price_max", Some("NaN")).is_err());
        assert!(parse_price_filter("price_max", Some("inf")).is_err());
    }

    #[tokio::test]
    async fn test_create_then_get_returns_input_fields() {
        let state = test_state().await;
        let created = create_room(&state.db, ocean_view()).await.unwrap();
        let fetched = get_room(&state.db, created.id).await.unwrap();

        assert_eq!(fetched.title, "Ocean View");
        assert_eq!(fetched.price, 150.0);
        assert_eq!(fetched.location, "Malibu");
        assert_eq!(fetched.description, "Sea breeze");
        assert_eq!(fetched.image.as_deref(), Some("rooms/ocean.jpg"));
        assert!(fetched.availability);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let state = test_state().await;

        let mut negative = ocean_view();
        negative.price = -1.0;
        assert!(matches!(
            create_room(&state.db, negative).await,
            Err(AppError::Validation(_))
        ));

        let mut blank_title = ocean_view();
        blank_title.title = "  ".to_string();
        assert!(matches!(
            create_room(&state.db, blank_title).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_room_is_not_found() {
        let state = test_state().await;
        assert!(matches!(get_room(&state.db, 42).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let state = test_state().await;
        let room = create_room(&state.db, ocean_view()).await.unwrap();

        let updated = update_room(
            &state.db,
            room.id,
            UpdateRoomRequest {
                price: Some(175.0),
                availability: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.price, 175.0);
        assert!(!updated.availability);
        assert_eq!(updated.title, "Ocean View");

        let unchanged = update_room(&state.db, room.id, UpdateRoomRequest::default())
            .await
            .unwrap();
        assert_eq!(unchanged, updated);
    }

    #[tokio::test]
    async fn test_update_validates_and_reports_missing() {
        let state = test_state().await;
        let room = create_room(&state.db, ocean_view()).await.unwrap();

        let invalid = update_room(
            &state.db,
            room.id,
            UpdateRoomRequest {
                price: Some(-5.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(invalid, Err(AppError::Validation(_))));

        let missing = update_room(&state.db, room.id + 100, UpdateRoomRequest::default()).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_bookings_and_reviews() {
        let state = test_state().await;
        let room = seed_room(&state, "Lakeside Cabin", 120.0, "Lake Tahoe").await;
        let other = seed_room(&state, "City Loft", 90.0, "Berlin").await;
        let (user, _) = register_user(&state, "guest@example.com").await;

        book_room(&state, &user, room.id).await;
        book_room(&state, &user, other.id).await;
        crate::services::reviews::create_review(
            &state.db,
            &Principal::from(&user),
            room.id,
            CreateReviewRequest {
                rating: 5,
                comment: Some("Lovely".to_string()),
            },
        )
        .await
        .unwrap();

        delete_room(&state.db, room.id).await.unwrap();

        let remaining_bookings = Bookings::find()
            .filter(bookings::Column::RoomId.eq(room.id))
            .all(&state.db)
            .await
            .unwrap();
        let remaining_reviews = Reviews::find()
            .filter(reviews::Column::RoomId.eq(room.id))
            .all(&state.db)
            .await
            .unwrap();
        assert!(remaining_bookings.is_empty());
        assert!(remaining_reviews.is_empty());
        assert_eq!(Bookings::find().all(&state.db).await.unwrap().len(), 1);

        assert!(matches!(
            delete_room(&state.db, room.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_search_by_price_range() {
        let state = test_state().await;
        seed_room(&state, "Budget", 50.0, "Leeds").await;
        seed_room(&state, "Standard", 100.0, "York").await;
        seed_room(&state, "Deluxe", 200.0, "Bath").await;
        seed_room(&state, "Suite", 350.0, "London").await;

        let rooms = search_rooms(&state.db, &search(Some("100"), Some("200"), None))
            .await
            .unwrap();

        let titles: Vec<&str> = rooms.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Standard", "Deluxe"]);
        assert!(rooms.iter().all(|r| r.price >= 100.0 && r.price <= 200.0));
    }

    #[tokio::test]
    async fn test_search_location_is_case_insensitive_substring() {
        let state = test_state().await;
        seed_room(&state, "Lakeside Cabin", 120.0, "Lakeside Cabin").await;
        seed_room(&state, "Desert Hut", 80.0, "Mojave").await;

        let rooms = search_rooms(&state.db, &search(None, None, Some("LAKE")))
            .await
            .unwrap();

        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].location, "Lakeside Cabin");
    }

    #[tokio::test]
    async fn test_search_combines_filters_and_handles_absent_ones() {
        let state = test_state().await;
        seed_room(&state, "A", 100.0, "Lake Como").await;
        seed_room(&state, "B", 300.0, "Lake Garda").await;
        seed_room(&state, "C", 150.0, "Rome").await;

        let all = search_rooms(&state.db, &RoomSearchQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let both = search_rooms(&state.db, &search(None, Some("200"), Some("lake")))
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].title, "A");

        let inverted = search_rooms(&state.db, &search(Some("300"), Some("100"), None))
            .await
            .unwrap();
        assert!(inverted.is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_bad_numeric_filter() {
        let state = test_state().await;
        let result = search_rooms(&state.db, &search(Some("cheap"), None, None)).await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_search_by_availability() {
        let state = test_state().await;
        let room = seed_room(&state, "Closed", 10.0, "Nowhere").await;
        seed_room(&state, "Open", 10.0, "Somewhere").await;
        update_room(
            &state.db,
            room.id,
            UpdateRoomRequest {
                availability: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let query = RoomSearchQuery {
            available: Some(true),
            ..Default::default()
        };
        let rooms = search_rooms(&state.db, &query).await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].title, "Open");
    }
}
