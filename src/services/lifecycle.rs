use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingFilter, BookingStatus, Customer, NewBooking, PaymentMethod, PlanType};
use crate::services::conflict::check_conflict;
use crate::services::dates::{duration_days, parse_date};
use crate::services::pricing::{quote, RateTable};

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Which start dates and lengths a new booking may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    /// Earliest allowed start date.
    pub today: NaiveDate,
    pub max_days: i64,
}

impl BookingWindow {
    pub fn starting_today(max_days: i64) -> Self {
        Self {
            today: Utc::now().date_naive(),
            max_days,
        }
    }

    fn check(&self, start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
        if start < self.today {
            return Err(AppError::Validation(
                "start_date must not be in the past".to_string(),
            ));
        }
        if duration_days(start, end)? > self.max_days {
            return Err(AppError::Validation(format!(
                "bookings are limited to {} days",
                self.max_days
            )));
        }
        Ok(())
    }
}

/// Create a `pending` booking with a frozen quote.
///
/// Everything that can be checked without the store is checked first. The
/// conflict check here is advisory: two overlapping requests racing each
/// other can both land as `pending`, and `approve` settles it.
pub fn create(
    conn: &Connection,
    rates: &RateTable,
    window: &BookingWindow,
    customer: &Customer,
    request: NewBooking,
) -> Result<Booking, AppError> {
    let plan_type: PlanType = required("plan_type", &request.plan_type)?.parse()?;
    let start_date = parse_date("start_date", required("start_date", &request.start_date)?)?;
    let end_date = parse_date("end_date", required("end_date", &request.end_date)?)?;
    let delivery_address = required("delivery_address", &request.delivery_address)?.to_string();
    let payment_method: PaymentMethod = required("payment_method", &request.payment_method)?.parse()?;

    if end_date < start_date {
        return Err(AppError::InvalidRange);
    }
    window.check(start_date, end_date)?;

    let payment_proof_url = optional_text(request.payment_proof_url);
    if payment_method != PaymentMethod::Direct && payment_proof_url.is_none() {
        return Err(AppError::Validation(format!(
            "payment proof is required for {} payments",
            payment_method.as_str()
        )));
    }

    let price = quote(rates, plan_type, start_date, end_date)?;

    let occupying = queries::list_bookings(conn, &BookingFilter::occupying())?;
    check_conflict(start_date, end_date, &occupying, None)?.into_result(false)?;

    let now = now();
    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        customer_id: customer.id.clone(),
        customer_name: customer.name.clone(),
        customer_email: customer.email.clone(),
        customer_phone: customer.phone.clone(),
        delivery_address,
        start_date,
        end_date,
        plan_type,
        total_price: price.total_price,
        down_payment: price.down_payment,
        status: BookingStatus::Pending,
        deposit_paid: false,
        deposit_amount: Decimal::ZERO,
        payment_method,
        payment_proof_url,
        special_requests: optional_text(request.special_requests),
        notes: None,
        created_at: now,
        updated_at: now,
    };

    queries::insert_booking(conn, &booking)?;

    tracing::info!(
        booking_id = %booking.id,
        customer_id = %booking.customer_id,
        start = %booking.start_date,
        end = %booking.end_date,
        total = %booking.total_price,
        "booking created"
    );

    Ok(booking)
}

/// Move a `pending` booking to `approved`.
///
/// The load, the overlap scan against every other approved booking and the
/// conditional update run in one IMMEDIATE transaction, so two approvals of
/// overlapping bookings are serialized and the second one sees the first.
/// Any error drops the transaction, which rolls it back.
pub fn approve(conn: &mut Connection, id: &str) -> Result<Booking, AppError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let booking = queries::get_booking_by_id(&tx, id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
    ensure_pending(&booking)?;

    let occupying = queries::list_bookings(&tx, &BookingFilter::occupying())?;
    check_conflict(booking.start_date, booking.end_date, &occupying, Some(id))?
        .into_result(true)?;

    let approved = queries::update_booking_status(
        &tx,
        id,
        BookingStatus::Pending,
        BookingStatus::Approved,
        None,
    )?
    .ok_or_else(|| invalid_transition(&booking))?;

    tx.commit()?;

    tracing::info!(booking_id = %id, "booking approved");
    Ok(approved)
}

/// Move a `pending` booking to `rejected`, keeping the reason as a note.
pub fn reject(conn: &mut Connection, id: &str, reason: Option<&str>) -> Result<Booking, AppError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let booking = queries::get_booking_by_id(&tx, id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
    ensure_pending(&booking)?;

    let note = match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => format!("Rejected: {r}"),
        None => "Rejected".to_string(),
    };

    let rejected = queries::update_booking_status(
        &tx,
        id,
        BookingStatus::Pending,
        BookingStatus::Rejected,
        Some(&note),
    )?
    .ok_or_else(|| invalid_transition(&booking))?;

    tx.commit()?;

    tracing::info!(booking_id = %id, "booking rejected");
    Ok(rejected)
}

/// Deposit bookkeeping. Allowed in any status; occupancy is unaffected.
pub fn record_deposit(
    conn: &Connection,
    id: &str,
    paid: bool,
    amount: Decimal,
) -> Result<Booking, AppError> {
    if amount.is_sign_negative() {
        return Err(AppError::Validation(
            "deposit_amount must not be negative".to_string(),
        ));
    }

    let booking = queries::update_deposit(conn, id, paid, amount)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    tracing::info!(booking_id = %id, paid, amount = %amount, "deposit recorded");
    Ok(booking)
}

fn ensure_pending(booking: &Booking) -> Result<(), AppError> {
    if booking.status == BookingStatus::Pending {
        Ok(())
    } else {
        Err(invalid_transition(booking))
    }
}

fn invalid_transition(booking: &Booking) -> AppError {
    AppError::InvalidTransition {
        id: booking.id.clone(),
        status: booking.status.to_string(),
    }
}
