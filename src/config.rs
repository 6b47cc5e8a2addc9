use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::services::pricing::RateTable;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub rates: RateTable,
    pub upload_dir: String,
    pub public_base_url: String,
    pub emailjs_service_id: String,
    pub emailjs_public_key: String,
    pub emailjs_private_key: String,
    pub emailjs_template_approved: String,
    pub emailjs_template_rejected: String,
    pub request_timeout_secs: u64,
    pub db_busy_timeout_ms: u64,
    pub password_hash_cost: u32,
    pub max_booking_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = RateTable::default();
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "satrent.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            rates: RateTable {
                daily: decimal_var("RATE_DAILY", is_rate).unwrap_or(defaults.daily),
                weekly: decimal_var("RATE_WEEKLY", is_rate).unwrap_or(defaults.weekly),
                monthly: decimal_var("RATE_MONTHLY", is_rate).unwrap_or(defaults.monthly),
                down_payment_fraction: decimal_var("DOWN_PAYMENT_FRACTION", is_fraction)
                    .unwrap_or(defaults.down_payment_fraction),
            },
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            emailjs_service_id: env::var("EMAILJS_SERVICE_ID").unwrap_or_default(),
            emailjs_public_key: env::var("EMAILJS_PUBLIC_KEY").unwrap_or_default(),
            emailjs_private_key: env::var("EMAILJS_PRIVATE_KEY").unwrap_or_default(),
            emailjs_template_approved: env::var("EMAILJS_TEMPLATE_APPROVED").unwrap_or_default(),
            emailjs_template_rejected: env::var("EMAILJS_TEMPLATE_REJECTED").unwrap_or_default(),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            db_busy_timeout_ms: env::var("DB_BUSY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            password_hash_cost: env::var("PASSWORD_HASH_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|cost| (4..=31).contains(cost))
                .unwrap_or(bcrypt::DEFAULT_COST),
            max_booking_days: env::var("MAX_BOOKING_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|days| *days > 0)
                .unwrap_or(365),
        }
    }

    pub fn emailjs_configured(&self) -> bool {
        !self.emailjs_service_id.is_empty() && !self.emailjs_public_key.is_empty()
    }
}

fn decimal_var(key: &str, valid: fn(&Decimal) -> bool) -> Option<Decimal> {
    let raw = env::var(key).ok()?;
    let parsed = parse_decimal(&raw, valid);
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "ignoring invalid decimal in environment");
    }
    parsed
}

fn parse_decimal(raw: &str, valid: fn(&Decimal) -> bool) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok().filter(valid)
}

fn is_rate(value: &Decimal) -> bool {
    !value.is_sign_negative()
}

/// A down payment can never exceed the total.
fn is_fraction(value: &Decimal) -> bool {
    !value.is_sign_negative() && *value <= Decimal::ONE
}
