use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::domain::models::DomainError;

/// Errors returned from HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected { status, .. } => *status,
            ApiError::Domain(DomainError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Domain(DomainError::Database(_))
            | ApiError::Domain(DomainError::Configuration(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Rejected { detail, .. } => detail.clone(),
            ApiError::Domain(DomainError::Validation(msg))
            | ApiError::Domain(DomainError::Database(msg))
            | ApiError::Domain(DomainError::Configuration(msg)) => msg.clone(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed with {}: {}", status, self);
        }
        (status, Json(ErrorBody { detail: self.detail() })).into_response()
    }
}
