use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PaymentGateway(String),

    #[error("{0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(DbErr),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::UnsupportedPaymentMethod(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PaymentGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err().and_then(constraint_conflict) {
            Some(conflict) => conflict,
            None => AppError::Database(err),
        }
    }
}

/// Constraint violations the client can resolve: duplicates and rows that
/// are still referenced (a tour or user with bookings).
fn constraint_conflict(err: SqlErr) -> Option<AppError> {
    match err {
        SqlErr::UniqueConstraintViolation(detail) => {
            Some(AppError::Conflict(format!("duplicate entry: {}", detail)))
        }
        SqlErr::ForeignKeyConstraintViolation(detail) => Some(AppError::Conflict(format!(
            "record is still referenced: {}",
            detail
        ))),
        _ => None,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() && !matches!(self, AppError::PaymentGateway(_)) {
            tracing::error!(error = %self, "Internal server error");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}
