pub mod admin;
pub mod auth;
pub mod bookings;
pub mod customers;
pub mod health;
pub mod uploads;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let upload_files = ServeDir::new(&state.config.upload_dir);
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/customer/signup", post(customers::signup))
        .route("/api/customer/login", post(customers::login))
        .route("/api/bookings", post(bookings::create_booking))
        .route("/api/bookings/mine", get(bookings::my_bookings))
        .route("/api/bookings/blocked-dates", get(bookings::get_blocked_dates))
        .route("/api/bookings/quote", get(bookings::get_quote))
        .route("/api/bookings/check", get(bookings::check_availability))
        .route(
            "/api/upload/payment-proof",
            post(uploads::upload_payment_proof)
                .layer(DefaultBodyLimit::max(uploads::MAX_UPLOAD_BODY_BYTES)),
        )
        .route("/api/admin/bookings", get(admin::list_bookings))
        .route("/api/admin/bookings/:id", get(admin::get_booking))
        .route("/api/admin/bookings/:id/approve", post(admin::approve_booking))
        .route("/api/admin/bookings/:id/reject", post(admin::reject_booking))
        .route("/api/admin/bookings/:id/deposit", post(admin::record_deposit))
        .route("/api/admin/stats", get(admin::get_stats))
        .route("/api/admin/events", get(admin::events_stream))
        .nest_service("/uploads", upload_files)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
