use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_types::domain::validation::ValidationError;
use catalog_types::ports::document_store::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, error, fields) = match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.message, e.fields),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m, Vec::new()),
            AppError::Store(e) => {
                tracing::error!(error = %e, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into(), Vec::new())
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into(), Vec::new())
            }
        };

        let body = serde_json::to_string(&ErrorBody { error, fields })
            .unwrap_or_else(|_| "{\"error\":\"internal serialization\"}".into());
        (code, [("content-type", "application/json")], body).into_response()
    }
}
