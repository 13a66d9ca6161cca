use chrono::Utc;
use roombook_core::{BookingItem, RoomSummary};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::db::bookings::{self, ActiveModel as BookingActiveModel, Model as BookingModel};
use crate::db::rooms::{self, Model as RoomModel};
use crate::db::{Bookings, Rooms, is_unique_violation};
use crate::error::AppError;
use crate::services::authz::{Capability, Principal, authorize};

const DUPLICATE_BOOKING: &str = "You have already booked this room";

fn room_summary(room: &RoomModel) -> RoomSummary {
    RoomSummary {
        id: room.id,
        title: room.title.clone(),
        location: room.location.clone(),
        price: room.price,
    }
}

fn booking_item(booking: BookingModel, room: Option<&RoomModel>) -> BookingItem {
    BookingItem {
        id: booking.id,
        user_id: booking.user_id,
        room_id: booking.room_id,
        booking_date: booking.booking_date,
        room: room.map(room_summary),
    }
}

async fn find_booking(
    db: &DatabaseConnection,
    user_id: Uuid,
    room_id: i32,
) -> Result<Option<BookingModel>, AppError> {
    Ok(Bookings::find()
        .filter(bookings::Column::UserId.eq(user_id))
        .filter(bookings::Column::RoomId.eq(room_id))
        .one(db)
        .await?)
}

/// 插入预订, 唯一索引冲突映射为 Conflict
pub(crate) async fn insert_booking(
    db: &DatabaseConnection,
    user_id: Uuid,
    room_id: i32,
) -> Result<BookingModel, AppError> {
    BookingActiveModel {
        user_id: Set(user_id),
        room_id: Set(room_id),
        booking_date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(DUPLICATE_BOOKING.to_string())
        } else {
            AppError::Db(e)
        }
    })
}

/// 创建预订: 管理员不可预订, 同一用户同一房间只能有一条预订
pub(crate) async fn create_booking(
    db: &DatabaseConnection,
    principal: &Principal,
    room_id: i32,
) -> Result<BookingItem, AppError> {
    authorize(principal, Capability::Book)?;

    let room = Rooms::find_by_id(room_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

    let existing = find_booking(db, principal.user_id, room_id).await?;
    if existing.is_some() {
        return Err(AppError::Conflict(DUPLICATE_BOOKING.to_string()));
    }

    let booking = insert_booking(db, principal.user_id, room_id).await?;
    info!(
        booking_id = booking.id,
        user_id = %principal.user_id,
        room_id,
        "booking created"
    );

    Ok(booking_item(booking, Some(&room)))
}

/// 取消预订, 只能取消自己的, 他人的预订视为不存在
pub(crate) async fn cancel_booking(
    db: &DatabaseConnection,
    principal: &Principal,
    booking_id: i32,
) -> Result<(), AppError> {
    let result = Bookings::delete_many()
        .filter(bookings::Column::Id.eq(booking_id))
        .filter(bookings::Column::UserId.eq(principal.user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Booking not found".to_string()));
    }

    info!(booking_id, user_id = %principal.user_id, "booking cancelled");
    Ok(())
}

/// 调用者的全部预订, 按预订时间倒序, 同一时间按 id 倒序
pub(crate) async fn list_bookings_for_user(
    db: &DatabaseConnection,
    principal: &Principal,
) -> Result<Vec<BookingItem>, AppError> {
    let owned = Bookings::find()
        .filter(bookings::Column::UserId.eq(principal.user_id))
        .order_by_desc(bookings::Column::BookingDate)
        .order_by_desc(bookings::Column::Id)
        .all(db)
        .await?;

    let room_ids: Vec<i32> = owned.iter().map(|booking| booking.room_id).collect();
    let rooms: HashMap<i32, RoomModel> = if room_ids.is_empty() {
        HashMap::new()
    } else {
        Rooms::find()
            .filter(rooms::Column::Id.is_in(room_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|room| (room.id, room))
            .collect()
    };

    Ok(owned
        .into_iter()
        .map(|booking| {
            let room = rooms.get(&booking.room_id);
            booking_item(booking, room)
        })
        .collect())
}
