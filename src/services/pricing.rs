use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::PlanType;
use crate::services::dates::duration_days;

const DAYS_PER_WEEK: i64 = 7;
const DAYS_PER_MONTH: i64 = 30;

/// Rental rates per plan unit, plus the share of the total due up front.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub daily: Decimal,
    pub weekly: Decimal,
    pub monthly: Decimal,
    pub down_payment_fraction: Decimal,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            daily: Decimal::from(1500),
            weekly: Decimal::from(8500),
            monthly: Decimal::from(28000),
            down_payment_fraction: Decimal::new(5, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub plan_type: PlanType,
    pub duration_days: i64,
    /// Billed units of the plan: days, weeks or 30-day months.
    pub units: i64,
    pub total_price: Decimal,
    pub down_payment: Decimal,
    pub balance: Decimal,
}

pub fn quote(
    rates: &RateTable,
    plan_type: PlanType,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Quote, AppError> {
    let days = duration_days(start, end)?;

    let (units, rate) = match plan_type {
        PlanType::Daily => (days, rates.daily),
        PlanType::Weekly => (ceil_div(days, DAYS_PER_WEEK), rates.weekly),
        PlanType::Monthly => (ceil_div(days, DAYS_PER_MONTH), rates.monthly),
    };

    let total_price = Decimal::from(units) * rate;
    let down_payment = (total_price * rates.down_payment_fraction).round_dp(2);

    Ok(Quote {
        plan_type,
        duration_days: days,
        units,
        total_price,
        down_payment,
        balance: total_price - down_payment,
    })
}

fn ceil_div(n: i64, d: i64) -> i64 {
    (n + d - 1) / d
}
