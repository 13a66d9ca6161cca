use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{error, warn};
use uuid::Uuid;

use crate::bootstrap::config::AuthConfig;
use crate::error::AppError;

/// Token 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TokenType {
    Access,
    Refresh,
}

/// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) email: String,
    pub(crate) token_type: TokenType,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
    pub(crate) jti: String,
}

impl Claims {
    pub(crate) fn user_id(&self) -> Result<Uuid, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid user ID".to_string()))
    }
}

/// 新签发的 token
#[derive(Debug, Clone)]
pub(crate) struct IssuedToken {
    pub(crate) token: String,
    pub(crate) jti: String,
    pub(crate) expires_at: DateTime<Utc>,
}

/// 生成 Token Hash, 数据库只保存 hash
pub(crate) fn generate_token_hash(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub(crate) fn issue_token(
    auth: &AuthConfig,
    user_id: Uuid,
    email: &str,
    token_type: TokenType,
) -> Result<IssuedToken, AppError> {
    let now = Utc::now();
    let ttl = match token_type {
        TokenType::Access => auth.access_ttl,
        TokenType::Refresh => auth.refresh_ttl,
    };
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal("Token lifetime out of range".to_string()))?;
    let jti = Uuid::new_v4().to_string();

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        token_type,
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        jti: jti.clone(),
    };

    let header = Header::new(Algorithm::HS256);
    let token = encode(
        &header,
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT: {}", e);
        AppError::Internal("Failed to create token".to_string())
    })?;

    Ok(IssuedToken {
        token,
        jti,
        expires_at,
    })
}

/// 校验签名、过期时间与 token 类型
pub(crate) fn verify_token(
    auth: &AuthConfig,
    token: &str,
    expected: TokenType,
) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 60;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        warn!("JWT verification failed: {}", e);
        AppError::Unauthorized("Invalid token".to_string())
    })?;

    if token_data.claims.token_type != expected {
        return Err(AppError::Unauthorized("Invalid token type".to_string()));
    }

    Ok(token_data.claims)
}

/// 从请求头中提取 Bearer Token
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test_secret_that_is_at_least_32_characters".to_string(),
            access_ttl: chrono::Duration::minutes(15),
            refresh_ttl: chrono::Duration::days(7),
            bcrypt_cost: 4,
        }
    }

    #[test]
    fn test_generate_token_hash() {
        let hash1 = generate_token_hash("test_token");
        let hash2 = generate_token_hash("test_token");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, generate_token_hash("other_token"));
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let auth = auth_config();
        let user_id = Uuid::new_v4();
        let issued = issue_token(&auth, user_id, "a@example.com", TokenType::Access).unwrap();

        let claims = verify_token(&auth, &issued.token, TokenType::Access).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn test_issue_rejects_overflowing_ttl() {
        let auth = AuthConfig {
            access_ttl: chrono::Duration::days(365 * 1_000_000),
            ..auth_config()
        };

        let result = issue_token(&auth, Uuid::new_v4(), "a@example.com", TokenType::Access);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_verify_rejects_wrong_token_type() {
        let auth = auth_config();
        let issued =
            issue_token(&auth, Uuid::new_v4(), "a@example.com", TokenType::Refresh).unwrap();

        let result = verify_token(&auth, &issued.token, TokenType::Access);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_verify_rejects_foreign_signature() {
        let auth = auth_config();
        let issued =
            issue_token(&auth, Uuid::new_v4(), "a@example.com", TokenType::Access).unwrap();
        let other = AuthConfig {
            jwt_secret: "another_secret_that_is_at_least_32_chars".to_string(),
            ..auth_config()
        };

        assert!(verify_token(&other, &issued.token, TokenType::Access).is_err());
        assert!(verify_token(&auth, "not-a-jwt", TokenType::Access).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc");
    }
}
