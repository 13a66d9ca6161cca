use crate::db::Tokens;
use crate::db::tokens::{self, Model as TokenModel};
use crate::error::AppError;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

pub(crate) async fn create_refresh_token(
    db: &DatabaseConnection,
    token_hash: &str,
    jti: &str,
    user_id: Uuid,
    expires_at: chrono::DateTime<Utc>,
) -> Result<TokenModel, AppError> {
    let new_token = tokens::ActiveModel {
        jti: Set(jti.to_string()),
        token_hash: Set(token_hash.to_string()),
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
        expires_at: Set(expires_at),
        revoked_at: Set(None),
        ..Default::default()
    };

    new_token
        .insert(db)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store refresh token: {e}")))
}

/// 未过期且未拉黑的 token
pub(crate) async fn find_active_token(
    db: &DatabaseConnection,
    token_hash: &str,
) -> Result<Option<TokenModel>, AppError> {
    Tokens::find()
        .filter(tokens::Column::TokenHash.eq(token_hash))
        .filter(tokens::Column::ExpiresAt.gt(Utc::now()))
        .filter(tokens::Column::RevokedAt.is_null())
        .one(db)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to look up token: {e}")))
}

/// 按 jti 拉黑 token, 返回是否由本次调用完成拉黑
pub(crate) async fn revoke_token(
    db: &DatabaseConnection,
    jti: &str,
    user_id: Uuid,
) -> Result<bool, AppError> {
    let result = Tokens::update_many()
        .col_expr(tokens::Column::RevokedAt, Expr::value(Utc::now()))
        .filter(tokens::Column::Jti.eq(jti))
        .filter(tokens::Column::UserId.eq(user_id))
        .filter(tokens::Column::RevokedAt.is_null())
        .exec(db)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to revoke token: {e}")))?;

    Ok(result.rows_affected == 1)
}

pub(crate) async fn cleanup_expired_tokens(db: &DatabaseConnection) -> Result<u64, AppError> {
    let result = Tokens::delete_many()
        .filter(tokens::Column::ExpiresAt.lt(Utc::now()))
        .exec(db)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to cleanup expired tokens: {e}")))?;

    Ok(result.rows_affected)
}
