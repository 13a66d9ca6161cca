use crate::SdkResult;
use crate::error::SdkError;
use reqwest::{Client, Method, RequestBuilder};
use roombook_core::*;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

#[derive(Clone)]
pub struct RoombookClient {
    client: Client,
    pub base_url: String,
    pub timeout: Duration,
    pub token: Option<String>,
}

impl RoombookClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            token: None,
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> SdkResult<Url> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Ok(Url::parse(&raw)?)
    }

    fn request(&self, method: Method, path: &str) -> SdkResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        Ok(self.client.request(method, url).timeout(self.timeout))
    }

    /// 需要 access token 的请求
    fn authed_request(&self, method: Method, path: &str) -> SdkResult<RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| SdkError::NotAuthenticated("access token not set".to_string()))?;
        Ok(self.request(method, path)?.bearer_auth(token))
    }

    async fn send_json<T>(&self, request: RequestBuilder) -> SdkResult<T>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_no_content(&self, request: RequestBuilder) -> SdkResult<()> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(())
    }

    pub async fn health(&self) -> SdkResult<StatusResponse> {
        let request = self.request(Method::GET, "health")?;
        self.send_json(request).await
    }

    pub async fn list_rooms(&self) -> SdkResult<Vec<RoomItem>> {
        let request = self.request(Method::GET, "rooms")?;
        self.send_json(request).await
    }

    pub async fn get_room(&self, id: i32) -> SdkResult<RoomItem> {
        let request = self.request(Method::GET, &format!("rooms/{id}"))?;
        self.send_json(request).await
    }

    pub async fn search_rooms(&self, query: &RoomSearchQuery) -> SdkResult<Vec<RoomItem>> {
        let request = self.request(Method::GET, "rooms/search")?.query(query);
        self.send_json(request).await
    }

    pub async fn create_room(&self, input: &CreateRoomRequest) -> SdkResult<RoomItem> {
        let request = self.authed_request(Method::POST, "rooms")?.json(input);
        self.send_json(request).await
    }

    pub async fn update_room(&self, id: i32, input: &UpdateRoomRequest) -> SdkResult<RoomItem> {
        let request = self
            .authed_request(Method::PUT, &format!("rooms/{id}"))?
            .json(input);
        self.send_json(request).await
    }

    pub async fn delete_room(&self, id: i32) -> SdkResult<()> {
        let request = self.authed_request(Method::DELETE, &format!("rooms/{id}"))?;
        self.send_no_content(request).await
    }

    pub async fn book_room(&self, room_id: i32) -> SdkResult<BookingItem> {
        let request = self.authed_request(Method::POST, &format!("rooms/{room_id}/booking"))?;
        self.send_json(request).await
    }

    pub async fn list_bookings(&self) -> SdkResult<Vec<BookingItem>> {
        let request = self.authed_request(Method::GET, "bookings")?;
        self.send_json(request).await
    }

    pub async fn cancel_booking(&self, booking_id: i32) -> SdkResult<()> {
        let request = self.authed_request(Method::DELETE, &format!("bookings/{booking_id}"))?;
        self.send_no_content(request).await
    }

    pub async fn list_reviews(&self, room_id: i32) -> SdkResult<Vec<ReviewItem>> {
        let request = self.request(Method::GET, &format!("rooms/{room_id}/reviews"))?;
        self.send_json(request).await
    }

    pub async fn create_review(
        &self,
        room_id: i32,
        input: &CreateReviewRequest,
    ) -> SdkResult<ReviewItem> {
        let request = self
            .authed_request(Method::POST, &format!("rooms/{room_id}/reviews"))?
            .json(input);
        self.send_json(request).await
    }

    pub async fn register(&self, input: &RegisterRequest) -> SdkResult<TokenPair> {
        let request = self.request(Method::POST, "auth/register")?.json(input);
        self.send_json(request).await
    }

    pub async fn login(&self, input: &LoginRequest) -> SdkResult<TokenPair> {
        let request = self.request(Method::POST, "auth/login")?.json(input);
        self.send_json(request).await
    }

    pub async fn refresh(&self, refresh: &str) -> SdkResult<AccessToken> {
        let body = RefreshRequest {
            refresh: refresh.to_string(),
        };
        let request = self.request(Method::POST, "auth/refresh")?.json(&body);
        self.send_json(request).await
    }

    pub async fn logout(&self, refresh: &str) -> SdkResult<StatusResponse> {
        let body = LogoutRequest {
            refresh: refresh.to_string(),
        };
        let request = self
            .authed_request(Method::POST, "auth/logout")?
            .json(&body);
        self.send_json(request).await
    }

    pub async fn profile(&self) -> SdkResult<UserProfile> {
        let request = self.authed_request(Method::GET, "auth/profile")?;
        self.send_json(request).await
    }
}

/// 将非 2xx 响应体转换为 [`SdkError::ApiError`]
fn api_error(status: u16, body: &str) -> SdkError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) => SdkError::ApiError {
            status,
            kind: error.error,
            message: error.message,
        },
        Err(_) => SdkError::ApiError {
            status,
            kind: "unknown".to_string(),
            message: body.trim().to_string(),
        },
    }
}
