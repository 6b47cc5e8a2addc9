use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::auth::{check_admin_token, require_admin};
use crate::handlers::bookings::BookingsResponse;
use crate::models::{Booking, BookingEventKind, BookingFilter, BookingStatus};
use crate::services::notify::{notify_best_effort, Outcome};
use crate::services::{events, lifecycle};
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 100;

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<BookingsResponse>, AppError> {
    require_admin(&headers, &state)?;

    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(s) => Some(
            BookingStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown status: {s}")))?,
        ),
    };
    let filter = BookingFilter {
        status,
        customer_id: None,
        limit: Some(query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 1000)),
    };

    let bookings = {
        let db = state.db()?;
        queries::list_bookings(&db, &filter)?
    };

    Ok(Json(BookingsResponse { bookings }))
}

// GET /api/admin/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    require_admin(&headers, &state)?;

    let booking = {
        let db = state.db()?;
        queries::get_booking_by_id(&db, &id)?
    };

    booking
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

/// The transition is already committed; the mail provider never holds up or
/// fails the admin's request.
fn notify_in_background(state: &Arc<AppState>, booking: &Booking, outcome: Outcome) {
    let state = Arc::clone(state);
    let booking = booking.clone();
    tokio::spawn(async move {
        notify_best_effort(state.notifier.as_ref(), &booking, outcome).await;
    });
}

#[derive(Serialize)]
pub struct TransitionResponse {
    booking: Booking,
    message: &'static str,
}

// POST /api/admin/bookings/:id/approve
pub async fn approve_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, AppError> {
    require_admin(&headers, &state)?;

    let booking = {
        let mut db = state.db()?;
        lifecycle::approve(&mut db, &id)?
    };

    events::publish(&state, BookingEventKind::Approved, &booking);
    notify_in_background(&state, &booking, Outcome::Approved);

    Ok(Json(TransitionResponse {
        booking,
        message: "Booking approved.",
    }))
}

// POST /api/admin/bookings/:id/reject
#[derive(Deserialize, Default)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn reject_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<TransitionResponse>, AppError> {
    require_admin(&headers, &state)?;

    let booking = {
        let mut db = state.db()?;
        lifecycle::reject(&mut db, &id, body.reason.as_deref())?
    };

    events::publish(&state, BookingEventKind::Rejected, &booking);
    notify_in_background(&state, &booking, Outcome::Rejected);

    Ok(Json(TransitionResponse {
        booking,
        message: "Booking rejected.",
    }))
}

// POST /api/admin/bookings/:id/deposit
#[derive(Deserialize)]
pub struct DepositRequest {
    pub deposit_paid: bool,
    #[serde(default)]
    pub deposit_amount: Decimal,
}

pub async fn record_deposit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<DepositRequest>,
) -> Result<Json<Booking>, AppError> {
    require_admin(&headers, &state)?;

    let booking = {
        let db = state.db()?;
        lifecycle::record_deposit(&db, &id, body.deposit_paid, body.deposit_amount)?
    };

    events::publish(&state, BookingEventKind::DepositRecorded, &booking);
    Ok(Json(booking))
}

// GET /api/admin/stats
#[derive(Serialize)]
pub struct StatsResponse {
    pending: i64,
    approved: i64,
    rejected: i64,
    approved_revenue: Decimal,
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, AppError> {
    require_admin(&headers, &state)?;

    let stats = {
        let db = state.db()?;
        queries::get_booking_stats(&db)?
    };

    Ok(Json(StatsResponse {
        pending: stats.pending,
        approved: stats.approved,
        rejected: stats.rejected,
        approved_revenue: stats.approved_revenue,
    }))
}

// GET /api/admin/events (SSE)
#[derive(Deserialize)]
pub struct SseQuery {
    pub token: Option<String>,
}

pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // EventSource can't set headers, so the token rides in the query string.
    check_admin_token(query.token.as_deref().unwrap_or(""), &state.config.admin_token)?;

    let rx = state.events_tx.subscribe();

    let live_stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok::<_, Infallible>(
                Event::default().data(data).event("booking_event"),
            ))
        }
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "admin event stream lagged");
            None
        }
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    Ok(Sse::new(StreamExt::merge(live_stream, keepalive_stream)))
}
