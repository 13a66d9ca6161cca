use axum::Json;
use roombook_core::StatusResponse;

pub(crate) async fn handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}
