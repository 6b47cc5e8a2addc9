use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Customer, LoginRequest, SignupRequest};
use crate::services::accounts::{self, Session};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    access_token: String,
    customer: Customer,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.access_token,
            customer: session.customer,
        }
    }
}

// POST /api/customer/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = {
        let db = state.db()?;
        accounts::signup(&db, body, state.config.password_hash_cost)?
    };
    Ok((StatusCode::CREATED, Json(session.into())))
}

// POST /api/customer/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = {
        let db = state.db()?;
        accounts::login(&db, body)?
    };
    Ok(Json(session.into()))
}
