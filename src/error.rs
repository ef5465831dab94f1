use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::domain::LedgerError;
use crate::schemas::ErrorResponse;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Ledger(e) => match e {
                LedgerError::DuplicateContact => StatusCode::CONFLICT,
                LedgerError::AccountNotFound(_) => StatusCode::NOT_FOUND,
                LedgerError::BelowMinimum(_)
                | LedgerError::InvalidIncrement(_)
                | LedgerError::InvalidBetAmount(_)
                | LedgerError::InsufficientFunds
                | LedgerError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
                LedgerError::StoreUnavailable(_) | LedgerError::Contention(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                LedgerError::IdGenerationExhausted(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            AppError::Ledger(e) => e.reason(),
            AppError::Validation(_) => "ValidationFailed",
            AppError::BadRequest(_) => "BadRequest",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Ledger(e) = &self {
            if !e.is_business() {
                tracing::error!(reason = e.reason(), "Ledger infrastructure failure: {}", e);
            }
        }

        let status = self.status_code();
        let body = Json(ErrorResponse {
            success: false,
            message: self.to_string(),
            reason: self.reason().to_string(),
        });

        (status, body).into_response()
    }
}
