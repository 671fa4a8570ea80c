use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Everything a request can fail with. Each variant renders as
/// `{"message": ...}` with its status; the store is left untouched.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid credentials")]
    BadCredentials,

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingToken | ApiError::InvalidToken | ApiError::BadCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_wire_contract() {
        assert_eq!(ApiError::MissingToken.to_string(), "No token provided");
        assert_eq!(ApiError::InvalidToken.to_string(), "Invalid token");
        assert_eq!(
            ApiError::NotFound("Category").to_string(),
            "Category not found"
        );
    }
}
