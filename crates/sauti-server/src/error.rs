//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// API error type. Bodies are plain text and never carry provider detail;
/// diagnostics go to the log under the request's correlation id.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        let err = ApiError::bad_request("Invalid request");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid request");
    }

    #[test]
    fn internal_maps_to_500() {
        let err = ApiError::internal("Voice synthesis failed");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
