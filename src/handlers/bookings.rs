use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::auth::require_customer;
use crate::models::{Booking, BookingEventKind, BookingFilter, NewBooking, PlanType};
use crate::services::availability::{blocked_date_strings, blocked_dates};
use crate::services::conflict::{check_conflict, ConflictCheck};
use crate::services::dates::parse_date;
use crate::services::lifecycle::BookingWindow;
use crate::services::pricing::{quote, Quote};
use crate::services::{events, lifecycle};
use crate::state::AppState;

fn required_param<'a>(name: &str, value: &'a Option<String>) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

// GET /api/bookings/blocked-dates
#[derive(Deserialize)]
pub struct BlockedDatesQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Serialize)]
pub struct BlockedDatesResponse {
    blocked_dates: Vec<String>,
}

pub async fn get_blocked_dates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BlockedDatesQuery>,
) -> Result<Json<BlockedDatesResponse>, AppError> {
    let from = query.from.as_deref().map(|s| parse_date("from", s)).transpose()?;
    let to = query.to.as_deref().map(|s| parse_date("to", s)).transpose()?;

    // Snapshot: valid only for this response.
    let occupying = {
        let db = state.db()?;
        queries::list_bookings(&db, &BookingFilter::occupying())?
    };

    let blocked = blocked_dates(&occupying);
    Ok(Json(BlockedDatesResponse {
        blocked_dates: blocked_date_strings(&blocked, from, to),
    }))
}

// GET /api/bookings/quote
#[derive(Deserialize)]
pub struct QuoteQuery {
    pub plan_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<Quote>, AppError> {
    let plan_type: PlanType = required_param("plan_type", &query.plan_type)?.parse()?;
    let start = parse_date("start_date", required_param("start_date", &query.start_date)?)?;
    let end = parse_date("end_date", required_param("end_date", &query.end_date)?)?;

    Ok(Json(quote(&state.config.rates, plan_type, start, end)?))
}

// GET /api/bookings/check
#[derive(Deserialize)]
pub struct CheckQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize)]
pub struct CheckResponse {
    available: bool,
    conflicts: usize,
}

pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, AppError> {
    let start = parse_date("start_date", required_param("start_date", &query.start_date)?)?;
    let end = parse_date("end_date", required_param("end_date", &query.end_date)?)?;
    if end < start {
        return Err(AppError::InvalidRange);
    }

    let occupying = {
        let db = state.db()?;
        queries::list_bookings(&db, &BookingFilter::occupying())?
    };

    let response = match check_conflict(start, end, &occupying, None)? {
        ConflictCheck::Admit => CheckResponse {
            available: true,
            conflicts: 0,
        },
        ConflictCheck::Reject { conflicting_ids } => CheckResponse {
            available: false,
            conflicts: conflicting_ids.len(),
        },
    };
    Ok(Json(response))
}

// POST /api/bookings
#[derive(Serialize)]
pub struct CreatedResponse {
    booking: Booking,
    message: &'static str,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewBooking>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let customer = require_customer(&headers, &state)?;

    let booking = {
        let db = state.db()?;
        lifecycle::create(
            &db,
            &state.config.rates,
            &BookingWindow::starting_today(state.config.max_booking_days),
            &customer,
            body,
        )?
    };

    events::publish(&state, BookingEventKind::Created, &booking);

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            booking,
            message: "Booking submitted. Waiting for admin approval.",
        }),
    ))
}

// GET /api/bookings/mine
#[derive(Serialize)]
pub struct BookingsResponse {
    pub bookings: Vec<Booking>,
}

pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<BookingsResponse>, AppError> {
    let customer = require_customer(&headers, &state)?;

    let bookings = {
        let db = state.db()?;
        queries::list_bookings(
            &db,
            &BookingFilter {
                customer_id: Some(customer.id),
                ..BookingFilter::default()
            },
        )?
    };

    Ok(Json(BookingsResponse { bookings }))
}
