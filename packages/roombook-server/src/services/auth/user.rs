use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use bcrypt::{hash, verify};
use chrono::Utc;
use roombook_core::{AccessToken, LoginRequest, RegisterRequest, TokenPair, UserProfile};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::bootstrap::config::AdminSeed;
use crate::db::token_ops;
use crate::db::users::{self, ActiveModel as UserActiveModel, Model as UserModel};
use crate::db::{Users, is_unique_violation};
use crate::error::AppError;
use crate::services::auth::jwt::{
    TokenType, extract_bearer_token, generate_token_hash, issue_token, verify_token,
};
use crate::services::authz::Principal;
use crate::state::AppState;

const BAD_REFRESH_TOKEN: &str = "Token expired or invalid";
const BAD_CREDENTIALS: &str = "Invalid email or password";

/// 规范化邮箱: 去除首尾空白并转小写
pub(crate) fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::Validation("Enter a valid email address".to_string()));
    }
    Ok(email)
}

/// 哈希密码
pub(crate) fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| {
        error!("Failed to hash password: {}", e);
        AppError::Internal("Failed to process password".to_string())
    })
}

/// 验证密码
pub(crate) fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash).map_err(|e| {
        error!("Failed to verify password: {}", e);
        AppError::Internal("Failed to verify password".to_string())
    })
}

pub(crate) async fn find_user_by_email(
    state: &AppState,
    email: &str,
) -> Result<Option<UserModel>, AppError> {
    Ok(Users::find()
        .filter(users::Column::Email.eq(email))
        .one(&state.db)
        .await?)
}

pub(crate) async fn find_user_by_id(
    state: &AppState,
    user_id: Uuid,
) -> Result<Option<UserModel>, AppError> {
    Ok(Users::find_by_id(user_id).one(&state.db).await?)
}

/// 签发 access + refresh, refresh 的 hash 入库以便之后拉黑
async fn issue_token_pair(state: &AppState, user: &UserModel) -> Result<TokenPair, AppError> {
    let access = issue_token(&state.auth, user.id, &user.email, TokenType::Access)?;
    let refresh = issue_token(&state.auth, user.id, &user.email, TokenType::Refresh)?;

    token_ops::create_refresh_token(
        &state.db,
        &generate_token_hash(&refresh.token),
        &refresh.jti,
        user.id,
        refresh.expires_at,
    )
    .await?;

    Ok(TokenPair {
        access: access.token,
        refresh: refresh.token,
        access_expires_at: access.expires_at,
        refresh_expires_at: refresh.expires_at,
    })
}

/// 用户注册
pub(crate) async fn register(
    state: &AppState,
    request: RegisterRequest,
) -> Result<(UserModel, TokenPair), AppError> {
    let email = normalize_email(&request.email)?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }
    if request.password != request.password_confirm {
        return Err(AppError::Validation("Both passwords must be the same".to_string()));
    }
    if !request.terms_accepted {
        return Err(AppError::Validation("You must agree to the terms and conditions".to_string()));
    }
    if find_user_by_email(state, &email).await?.is_some() {
        return Err(AppError::Validation("Email already registered".to_string()));
    }

    let password_hash = hash_password(&request.password, state.auth.bcrypt_cost)?;
    let now = Utc::now();
    let new_user = UserActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        name: Set(name.to_string()),
        password_hash: Set(password_hash),
        is_admin: Set(false),
        is_superuser: Set(false),
        terms_accepted: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    let user = new_user.insert(&state.db).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Validation("Email already registered".to_string())
        } else {
            AppError::Db(e)
        }
    })?;

    let tokens = issue_token_pair(state, &user).await?;
    info!(user_id = %user.id, "user registered");

    Ok((user, tokens))
}

/// 用户登录
pub(crate) async fn login(state: &AppState, request: LoginRequest) -> Result<TokenPair, AppError> {
    let email = normalize_email(&request.email)
        .map_err(|_| AppError::Unauthorized(BAD_CREDENTIALS.to_string()))?;

    let user = find_user_by_email(state, &email)
        .await?
        .ok_or_else(|| AppError::Unauthorized(BAD_CREDENTIALS.to_string()))?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let tokens = issue_token_pair(state, &user).await?;
    info!(user_id = %user.id, "user logged in");

    Ok(tokens)
}

/// 注销: 拉黑 refresh token
///
/// 任何失败(签名无效, 已过期, 不属于调用者, 已拉黑, 存储错误)都统一为 InvalidArgument.
pub(crate) async fn logout(
    state: &AppState,
    principal: &Principal,
    refresh: &str,
) -> Result<(), AppError> {
    let bad_token = || AppError::InvalidArgument(BAD_REFRESH_TOKEN.to_string());

    let claims =
        verify_token(&state.auth, refresh, TokenType::Refresh).map_err(|_| bad_token())?;
    if claims.user_id().ok() != Some(principal.user_id) {
        return Err(bad_token());
    }

    let revoked = token_ops::revoke_token(&state.db, &claims.jti, principal.user_id)
        .await
        .map_err(|e| {
            warn!(error = %e, "failed to blacklist refresh token");
            bad_token()
        })?;
    if !revoked {
        return Err(bad_token());
    }

    info!(user_id = %principal.user_id, "user logged out");
    Ok(())
}

/// 用未拉黑的 refresh token 换取新的 access token
pub(crate) async fn refresh(state: &AppState, refresh: &str) -> Result<AccessToken, AppError> {
    let claims = verify_token(&state.auth, refresh, TokenType::Refresh)?;

    if token_ops::find_active_token(&state.db, &generate_token_hash(refresh))
        .await?
        .is_none()
    {
        return Err(AppError::Unauthorized("Token has been revoked".to_string()));
    }

    let user = find_user_by_id(state, claims.user_id()?)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let access = issue_token(&state.auth, user.id, &user.email, TokenType::Access)?;
    Ok(AccessToken {
        access: access.token,
        access_expires_at: access.expires_at,
    })
}

pub(crate) fn profile(principal: &Principal) -> UserProfile {
    UserProfile {
        id: principal.user_id,
        email: principal.email.clone(),
        name: principal.name.clone(),
    }
}

/// 确保启动配置中的管理员存在并拥有管理权限
pub(crate) async fn ensure_admin(
    state: &AppState,
    seed: &AdminSeed,
) -> Result<UserModel, AppError> {
    let email = normalize_email(&seed.email)?;

    if let Some(user) = find_user_by_email(state, &email).await? {
        if user.is_admin && user.is_superuser {
            return Ok(user);
        }
        let mut active: UserActiveModel = user.into();
        active.is_admin = Set(true);
        active.is_superuser = Set(true);
        active.updated_at = Set(Utc::now().into());
        let user = active.update(&state.db).await?;
        info!(user_id = %user.id, "promoted existing user to administrator");
        return Ok(user);
    }

    let now = Utc::now();
    let admin = UserActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        name: Set("Administrator".to_string()),
        password_hash: Set(hash_password(&seed.password, state.auth.bcrypt_cost)?),
        is_admin: Set(true),
        is_superuser: Set(true),
        terms_accepted: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.db)
    .await?;

    info!(user_id = %admin.id, "created administrator");
    Ok(admin)
}

/// 用户认证中间件, 将 [`Principal`] 放入请求扩展
pub(crate) async fn user_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())?;
    let claims = verify_token(&state.auth, token, TokenType::Access)?;

    let user = find_user_by_id(&state, claims.user_id()?)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    request.extensions_mut().insert(Principal::from(&user));

    Ok(next.run(request).await)
}
