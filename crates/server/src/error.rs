//! HTTP error mapping.
//!
//! Every handler returns `Result<_, AppError>`; the `IntoResponse` impl
//! picks the status and renders `{ "message": ... }`, adding `"error"` with
//! the underlying detail for server-side failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use data_loader::{DataLoadError, ProfileError};
use llm_client::LlmClientError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::orchestrator::PlanError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// No plan stored for the date; the client should generate one
    #[error("{0}")]
    NeedsGeneration(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::InvalidProfile(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::NeedsGeneration(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Store(err) => match err {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::Duplicate { .. } => StatusCode::CONFLICT,
                StoreError::Catalog(DataLoadError::Duplicate { .. }) => StatusCode::CONFLICT,
                StoreError::Catalog(
                    DataLoadError::MissingReference { .. }
                    | DataLoadError::InvalidValue { .. }
                    | DataLoadError::ValidationError(_),
                ) => StatusCode::BAD_REQUEST,
                StoreError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Plan(PlanError::NoCandidates) => StatusCode::BAD_REQUEST,
            AppError::Plan(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client
    fn message(&self) -> String {
        match self {
            AppError::Plan(PlanError::Llm(LlmClientError::MissingApiKey)) => {
                LlmClientError::MissingApiKey.to_string()
            }
            AppError::Plan(PlanError::Llm(_)) => "Failed to generate meals using AI".to_string(),
            AppError::Plan(PlanError::Internal(_)) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            AppError::Store(StoreError::Catalog(DataLoadError::MissingReference { entity, .. })) => {
                format!("Some {} items not found", entity.to_lowercase())
            }
            other => other.to_string(),
        }
    }

    /// Underlying cause, only for server-side failures
    fn detail(&self) -> Option<String> {
        match self {
            AppError::Plan(PlanError::Llm(err)) => Some(err.to_string()),
            AppError::Plan(PlanError::Internal(err)) | AppError::Internal(err) => {
                Some(format!("{:#}", err))
            }
            AppError::Store(StoreError::Catalog(err)) if self.status().is_server_error() => {
                Some(err.to_string())
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({ "message": self.message() });

        if let Some(detail) = self.detail() {
            error!(status = %status, error = %detail, "Request failed");
            body["error"] = json!(detail);
        }
        if matches!(self, AppError::NeedsGeneration(_)) {
            body["needsGeneration"] = json!(true);
        }

        (status, Json(body)).into_response()
    }
}
