use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub plan_type: PlanType,
    pub total_price: Decimal,
    pub down_payment: Decimal,
    pub status: BookingStatus,
    pub deposit_paid: bool,
    pub deposit_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_proof_url: Option<String>,
    pub special_requests: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn is_occupying(&self) -> bool {
        self.status.is_occupying()
    }
}

/// Single status vocabulary. `confirmed` is read as `approved`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    #[serde(alias = "confirmed")]
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "approved" | "confirmed" => Some(BookingStatus::Approved),
            "rejected" => Some(BookingStatus::Rejected),
            _ => None,
        }
    }

    /// Occupying bookings make their whole date range unavailable.
    pub fn is_occupying(&self) -> bool {
        matches!(self, BookingStatus::Approved)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Daily,
    Weekly,
    Monthly,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Daily => "daily",
            PlanType::Weekly => "weekly",
            PlanType::Monthly => "monthly",
        }
    }
}

impl FromStr for PlanType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(PlanType::Daily),
            "weekly" => Ok(PlanType::Weekly),
            "monthly" => Ok(PlanType::Monthly),
            other => Err(AppError::Validation(format!("unknown plan type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Gcash,
    Bank,
    Direct,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Gcash => "gcash",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Direct => "direct",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gcash" => Ok(PaymentMethod::Gcash),
            "bank" => Ok(PaymentMethod::Bank),
            "direct" => Ok(PaymentMethod::Direct),
            other => Err(AppError::Validation(format!("unknown payment method: {other}"))),
        }
    }
}

/// Booking request as submitted by a customer. Fields stay as raw strings
/// so that validation can report which one is missing or malformed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBooking {
    pub plan_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub delivery_address: Option<String>,
    pub payment_method: Option<String>,
    pub payment_proof_url: Option<String>,
    pub special_requests: Option<String>,
}

/// Filter for store listings.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub customer_id: Option<String>,
    pub limit: Option<i64>,
}

impl BookingFilter {
    pub fn occupying() -> Self {
        Self {
            status: Some(BookingStatus::Approved),
            ..Self::default()
        }
    }
}
