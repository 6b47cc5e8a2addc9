use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::models::Customer;
use crate::services::accounts;
use crate::state::AppState;

pub fn bearer_token(headers: &HeaderMap) -> &str {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or("")
}

pub fn require_admin(headers: &HeaderMap, state: &AppState) -> Result<(), AppError> {
    check_admin_token(bearer_token(headers), &state.config.admin_token)
}

pub fn check_admin_token(token: &str, expected: &str) -> Result<(), AppError> {
    if token.is_empty() || token != expected {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

/// Resolve the session token to a customer. The db guard is released before
/// returning so callers may await afterwards.
pub fn require_customer(headers: &HeaderMap, state: &AppState) -> Result<Customer, AppError> {
    let token = bearer_token(headers);
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }
    if token == state.config.admin_token {
        return Err(AppError::Forbidden);
    }
    let db = state.db()?;
    accounts::authenticate(&db, token)
}
