use std::sync::Arc;

use crate::models::{Booking, BookingEvent, BookingEventKind};
use crate::state::AppState;

/// Broadcast a lifecycle change to admin dashboards. Nobody listening is fine.
pub fn publish(state: &Arc<AppState>, kind: BookingEventKind, booking: &Booking) {
    let event = BookingEvent {
        kind,
        booking_id: booking.id.clone(),
        status: booking.status,
        at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };
    let _ = state.events_tx.send(event);
}
