use chrono::Utc;
use roombook_core::{CreateReviewRequest, ReviewItem};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::db::reviews::{self, ActiveModel as ReviewActiveModel, Model as ReviewModel};
use crate::db::{Reviews, Rooms};
use crate::error::AppError;
use crate::services::authz::Principal;

const MIN_RATING: i16 = 1;
const MAX_RATING: i16 = 5;

impl From<ReviewModel> for ReviewItem {
    fn from(review: ReviewModel) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            room_id: review.room_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

async fn ensure_room_exists(db: &DatabaseConnection, room_id: i32) -> Result<(), AppError> {
    if Rooms::find_by_id(room_id).one(db).await?.is_none() {
        return Err(AppError::NotFound("Room not found".to_string()));
    }
    Ok(())
}

pub(crate) async fn create_review(
    db: &DatabaseConnection,
    principal: &Principal,
    room_id: i32,
    request: CreateReviewRequest,
) -> Result<ReviewModel, AppError> {
    if !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
        return Err(AppError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    ensure_room_exists(db, room_id).await?;

    let comment = request
        .comment
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    let review = ReviewActiveModel {
        user_id: Set(principal.user_id),
        room_id: Set(room_id),
        rating: Set(request.rating),
        comment: Set(comment),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(review_id = review.id, room_id, rating = review.rating, "review created");
    Ok(review)
}

pub(crate) async fn list_reviews(
    db: &DatabaseConnection,
    room_id: i32,
) -> Result<Vec<ReviewModel>, AppError> {
    ensure_room_exists(db, room_id).await?;

    Ok(Reviews::find()
        .filter(reviews::Column::RoomId.eq(room_id))
        .order_by_desc(reviews::Column::CreatedAt)
        .order_by_desc(reviews::Column::Id)
        .all(db)
        .await?)
}
