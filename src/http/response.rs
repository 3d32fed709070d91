//! Response envelope for gateway-owned endpoints.
//!
//! Proxied responses never pass through here; they carry the backend's own
//! status, headers and body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// `{"success": bool, "message": str, "data": any|null}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

pub fn not_found() -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        message: "requested resource was not found".to_string(),
        data: None,
        status: StatusCode::NOT_FOUND,
    };
    body.into_response()
}
