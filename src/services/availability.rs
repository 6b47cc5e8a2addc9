use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::Booking;
use crate::services::dates::{dates_in_range, format_date};

/// Every calendar date covered by an occupying booking. Non-occupying
/// bookings in the input are skipped, and so is a stored row whose range is
/// inverted (it covers no dates).
pub fn blocked_dates(bookings: &[Booking]) -> BTreeSet<NaiveDate> {
    let mut blocked = BTreeSet::new();
    for booking in bookings.iter().filter(|b| b.is_occupying()) {
        match dates_in_range(booking.start_date, booking.end_date) {
            Ok(dates) => blocked.extend(dates),
            Err(_) => {
                tracing::warn!(booking_id = %booking.id, "skipping booking with inverted date range");
            }
        }
    }
    blocked
}

/// Flat, ascending ISO strings for the calendar, optionally clipped to a window.
pub fn blocked_date_strings(
    blocked: &BTreeSet<NaiveDate>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<String> {
    blocked
        .iter()
        .filter(|d| from.map_or(true, |f| **d >= f))
        .filter(|d| to.map_or(true, |t| **d <= t))
        .map(format_date)
        .collect()
}
