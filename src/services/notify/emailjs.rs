use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;

use super::{Notifier, Outcome};
use crate::models::Booking;
use crate::services::dates::format_date;

const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub struct EmailJsNotifier {
    service_id: String,
    public_key: String,
    private_key: String,
    template_approved: String,
    template_rejected: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: serde_json::Value,
}

impl EmailJsNotifier {
    pub fn new(
        service_id: String,
        public_key: String,
        private_key: String,
        template_approved: String,
        template_rejected: String,
    ) -> Self {
        Self {
            service_id,
            public_key,
            private_key,
            template_approved,
            template_rejected,
            client: reqwest::Client::builder()
                .timeout(SEND_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

pub(crate) fn template_params(booking: &Booking, outcome: Outcome) -> serde_json::Value {
    let mut params = serde_json::json!({
        "to_email": booking.customer_email,
        "to_name": booking.customer_name,
        "booking_id": booking.id,
        "start_date": format_date(&booking.start_date),
        "end_date": format_date(&booking.end_date),
        "plan_type": booking.plan_type.as_str(),
        "total_price": booking.total_price.to_string(),
        "down_payment": booking.down_payment.to_string(),
    });
    if outcome == Outcome::Rejected {
        let reason = booking
            .notes
            .as_deref()
            .and_then(|n| n.strip_prefix("Rejected: "))
            .unwrap_or("No reason provided");
        params["rejection_reason"] = serde_json::Value::String(reason.to_string());
    }
    params
}

#[async_trait]
impl Notifier for EmailJsNotifier {
    async fn notify(&self, booking: &Booking, outcome: Outcome) -> anyhow::Result<()> {
        let template_id = match outcome {
            Outcome::Approved => &self.template_approved,
            Outcome::Rejected => &self.template_rejected,
        };
        anyhow::ensure!(
            !template_id.is_empty(),
            "no EmailJS template configured for {} bookings",
            outcome.as_str()
        );

        let request = SendRequest {
            service_id: &self.service_id,
            template_id,
            user_id: &self.public_key,
            access_token: Some(self.private_key.as_str()).filter(|k| !k.is_empty()),
            template_params: template_params(booking, outcome),
        };

        self.client
            .post(EMAILJS_SEND_URL)
            .json(&request)
            .send()
            .await
            .context("failed to send EmailJS request")?
            .error_for_status()
            .context("EmailJS API returned error")?;

        tracing::info!(booking_id = %booking.id, outcome = outcome.as_str(), "customer notified");
        Ok(())
    }
}
