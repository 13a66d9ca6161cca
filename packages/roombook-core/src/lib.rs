use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 房间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomItem {
    pub id: i32,
    pub title: String,
    pub price: f64,
    pub location: String,
    pub description: String,
    pub image: Option<String>,
    pub availability: bool,
}

/// 创建房间请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub title: String,
    pub price: f64,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_availability")]
    pub availability: bool,
}

fn default_availability() -> bool {
    true
}

/// 部分更新房间请求, 缺省字段保持不变
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRoomRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<bool>,
}

/// 房间搜索参数
///
/// 价格以原始字符串传输, 由服务端解析并校验.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomSearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

/// 预订中嵌入的房间摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: i32,
    pub title: String,
    pub location: String,
    pub price: f64,
}

/// 预订
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingItem {
    pub id: i32,
    pub user_id: Uuid,
    pub room_id: i32,
    pub booking_date: DateTime<Utc>,
    pub room: Option<RoomSummary>,
}

/// 评价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: i32,
    pub user_id: Uuid,
    pub room_id: i32,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 创建评价请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i16,
    #[serde(default)]
    pub comment: Option<String>,
}

/// 用户注册请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub terms_accepted: bool,
}

/// 用户登录请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 注销请求, 携带要作废的 refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub refresh: String,
}

/// 刷新 access token 请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// 登录/注册成功后返回的令牌对
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// 刷新得到的 access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access: String,
    pub access_expires_at: DateTime<Utc>,
}

/// 当前用户信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// 简单状态响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// 错误响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// 错误类别, 与 HTTP 状态一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    InvalidArgument,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_room_request_defaults() {
        let json = r#"{"title":"Ocean","price":150.0,"location":"Malibu","description":"Sea"}"#;
        let request: CreateRoomRequest = serde_json::from_str(json).unwrap();

        assert!(request.availability);
        assert_eq!(request.image, None);
        assert_eq!(request.price, 150.0);
    }

    #[test]
    fn test_update_room_request_skips_absent_fields() {
        let request = UpdateRoomRequest {
            price: Some(99.5),
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value, serde_json::json!({ "price": 99.5 }));
    }

    #[test]
    fn test_register_request_terms_default_false() {
        let json = r#"{"email":"a@b.c","name":"A","password":"x","password_confirm":"x"}"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert!(!request.terms_accepted);
    }

    #[test]
    fn test_error_kind_serializes_as_snake_case() {
        let value = serde_json::to_value(ErrorKind::ValidationError).unwrap();
        assert_eq!(value, serde_json::json!("validation_error"));
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}
