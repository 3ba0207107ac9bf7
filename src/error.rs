use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::DbErr;
use thiserror::Error;

use crate::services::eligibility::Ineligibility;

/// Every failure the chat and transport operations can surface.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("provider is not eligible: {0}")]
    IneligibleProvider(Ineligibility),
    #[error("provider is no longer eligible: {0}")]
    EligibilityLapsed(Ineligibility),
    #[error("job is no longer open")]
    JobNotOpen,
    #[error("cannot move job from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("no active contract template for {0} or DEFAULT")]
    NoActiveTemplate(String),
    #[error("contract template is missing placeholder {{{0}}}")]
    MissingPlaceholder(&'static str),
    #[error("no route found between pickup and dropoff")]
    RouteUnavailable,
    #[error("insufficient balance for budget {0:.2}")]
    InsufficientFunds(f64),
    #[error("milestone is already completed")]
    AlreadyCompleted,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("external service error: {0}")]
    External(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl CoreError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        CoreError::Unauthorized(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        CoreError::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    /// Message safe to hand to a client. Database details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            CoreError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Stable identifier surfaced to callers alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Unauthorized(_) => "unauthorized",
            CoreError::IneligibleProvider(_) => "ineligible_provider",
            CoreError::EligibilityLapsed(_) => "eligibility_lapsed",
            CoreError::JobNotOpen => "job_not_open",
            CoreError::InvalidTransition { .. } => "invalid_transition",
            CoreError::NoActiveTemplate(_) => "no_active_template",
            CoreError::MissingPlaceholder(_) => "missing_placeholder",
            CoreError::RouteUnavailable => "route_unavailable",
            CoreError::InsufficientFunds(_) => "insufficient_funds",
            CoreError::AlreadyCompleted => "already_completed",
            CoreError::NotFound(_) => "not_found",
            CoreError::Validation(_) => "validation_error",
            CoreError::External(_) => "external_error",
            CoreError::Database(_) => "internal_error",
        }
    }
}

impl ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoreError::Unauthorized(_)
            | CoreError::IneligibleProvider(_)
            | CoreError::EligibilityLapsed(_) => StatusCode::FORBIDDEN,
            CoreError::JobNotOpen
            | CoreError::AlreadyCompleted
            | CoreError::InvalidTransition { .. } => StatusCode::CONFLICT,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Validation(_)
            | CoreError::MissingPlaceholder(_)
            | CoreError::NoActiveTemplate(_)
            | CoreError::RouteUnavailable
            | CoreError::InsufficientFunds(_) => StatusCode::BAD_REQUEST,
            CoreError::External(_) => StatusCode::BAD_GATEWAY,
            CoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.public_message(),
            "kind": self.kind(),
        }))
    }
}
