use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rusqlite::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("end date is before start date")]
    InvalidRange,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("date conflict with bookings: {}", ids.join(", "))]
    Conflict { ids: Vec<String>, on_approval: bool },

    #[error("booking {id} is {status} and can no longer be modified")]
    InvalidTransition { id: String, status: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("timed out waiting for the booking store")]
    Timeout,

    #[error("upstream error: {0:#}")]
    Upstream(anyhow::Error),

    #[error("database error: {0}")]
    Database(rusqlite::Error),
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        if is_busy(&err) {
            AppError::Timeout
        } else {
            AppError::Database(err)
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<rusqlite::Error>() {
            Some(db_err) if is_busy(db_err) => AppError::Timeout,
            _ => AppError::Upstream(err),
        }
    }
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked)
    )
}

impl AppError {
    /// Message shown to the end user. Internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Conflict { on_approval: false, .. } => {
                "Selected dates are not available. Please choose different dates.".to_string()
            }
            AppError::Conflict { on_approval: true, .. } => {
                "A conflicting booking now exists for these dates.".to_string()
            }
            AppError::InvalidTransition { .. } => {
                "This booking can no longer be modified.".to_string()
            }
            AppError::Upstream(_) | AppError::Database(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRange => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = match &self {
            // Approval is admin-only, so the colliding ids can be shown.
            AppError::Conflict { ids, on_approval: true } => serde_json::json!({
                "error": self.public_message(),
                "conflicting_booking_ids": ids,
            }),
            _ => serde_json::json!({ "error": self.public_message() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
