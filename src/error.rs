use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("trip has invalid state: {0}")]
    InvalidTripState(String),
    #[error("unknown location type: {0}")]
    UnknownLocationType(String),
    #[error("not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
}

/// A membership state-machine precondition was violated. The `reason`
/// token is part of the JSON contract with the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("already a member of this trip")]
    AlreadyMember,
    #[error("no pending invite for this trip")]
    NoPendingInvite,
    #[error("no membership for this trip")]
    NoMembership,
    #[error("no registered account for that email")]
    UnknownUser,
}

impl WorkflowError {
    pub fn reason(&self) -> &'static str {
        match self {
            WorkflowError::AlreadyMember => "already_member",
            WorkflowError::NoPendingInvite => "no_pending_invite",
            WorkflowError::NoMembership => "no_membership",
            WorkflowError::UnknownUser => "unknown_user",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Database(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::Workflow(_) | AppError::InvalidTripState(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::UnknownLocationType(_) | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
        };

        let body = match &self {
            AppError::Workflow(err) => json!({
                "error": err.reason(),
                "detail": err.to_string(),
            }),
            // Store and config failures stay opaque to the client.
            AppError::Config(_) | AppError::Io(_) | AppError::Database(_) | AppError::Other(_) => {
                json!({ "error": "internal_error" })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
