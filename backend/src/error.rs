use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("A match has already been recorded for session {0}")]
    DuplicateSession(String),
    #[error("Failed to fetch leaderboard")]
    Query(#[source] anyhow::Error),
    #[error("Failed to save match")]
    StoreWrite(#[source] anyhow::Error),
    #[error("Method not allowed")]
    MethodNotSupported,
    #[error("Not found")]
    NotFound,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateSession(_) => StatusCode::CONFLICT,
            AppError::Query(_) | AppError::StoreWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MethodNotSupported => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Query(cause) | AppError::StoreWrite(cause) => {
                tracing::error!(%status, "{}: {:#}", self, cause);
            }
            _ => tracing::warn!(%status, "{}", self),
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DuplicateSession("s1".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Query(anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::StoreWrite(anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::MethodNotSupported.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_causes_stay_out_of_the_message() {
        let err = AppError::StoreWrite(anyhow!("connection refused on 10.0.0.3"));
        assert_eq!(err.to_string(), "Failed to save match");
    }
}
