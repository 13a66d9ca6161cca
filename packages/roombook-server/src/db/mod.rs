pub(crate) mod bookings;
pub(crate) mod initialize;
mod migration;
pub(crate) mod reviews;
pub(crate) mod rooms;
pub(crate) mod token_ops;
pub(crate) mod tokens;
pub(crate) mod users;

pub(crate) use bookings::Entity as Bookings;
pub(crate) use reviews::Entity as Reviews;
pub(crate) use rooms::Entity as Rooms;
pub(crate) use tokens::Entity as Tokens;
pub(crate) use users::Entity as Users;

use sea_orm::{DbErr, SqlErr};

/// 唯一约束冲突
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
