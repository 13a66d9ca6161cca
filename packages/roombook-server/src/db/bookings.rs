use chrono::Utc;
use sea_orm::entity::prelude::*;

/// 每个 (user_id, room_id) 最多一条有效预订, 由唯一索引保证
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment_flag)]
    pub id: i32,
    pub user_id: Uuid,
    pub room_id: i32,
    pub booking_date: chrono::DateTime<Utc>,
}

impl ActiveModelBehavior for ActiveModel {}
