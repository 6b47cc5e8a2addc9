pub mod emailjs;

use async_trait::async_trait;

use crate::models::Booking;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Approved,
    Rejected,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Approved => "approved",
            Outcome::Rejected => "rejected",
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, booking: &Booking, outcome: Outcome) -> anyhow::Result<()>;
}

/// Used when no mail provider is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, booking: &Booking, outcome: Outcome) -> anyhow::Result<()> {
        tracing::info!(
            booking_id = %booking.id,
            to = %booking.customer_email,
            outcome = outcome.as_str(),
            "notification not sent: no provider configured"
        );
        Ok(())
    }
}

/// Send the outcome to the customer. A failure is logged and dropped: the
/// status change it reports has already been committed.
pub async fn notify_best_effort(notifier: &dyn Notifier, booking: &Booking, outcome: Outcome) {
    if let Err(e) = notifier.notify(booking, outcome).await {
        tracing::warn!(
            booking_id = %booking.id,
            outcome = outcome.as_str(),
            error = %e,
            "failed to notify customer"
        );
    }
}
