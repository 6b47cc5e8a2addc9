use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::db::queries;
use crate::models::{Booking, BookingStatus, Customer, PaymentMethod, PlanType};

pub fn seed_customer(conn: &Connection, id: &str) -> Customer {
    let customer = Customer {
        id: id.to_string(),
        name: "Juan Dela Cruz".to_string(),
        email: format!("{id}@example.com"),
        phone: "+639171234567".to_string(),
        address: "12 Rizal St, Baguio".to_string(),
        password_hash: "not-a-real-hash".to_string(),
        created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap(),
    };
    queries::insert_customer(conn, &customer).unwrap();
    customer
}

/// A booking owned by `cust-1` with second-precision timestamps.
pub fn booking(id: &str, start: &str, end: &str, status: BookingStatus) -> Booking {
    let created = NaiveDate::from_ymd_opt(2024, 2, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    Booking {
        id: id.to_string(),
        customer_id: "cust-1".to_string(),
        customer_name: "Juan Dela Cruz".to_string(),
        customer_email: "cust-1@example.com".to_string(),
        customer_phone: "+639171234567".to_string(),
        delivery_address: "12 Rizal St, Baguio".to_string(),
        start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
        end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
        plan_type: PlanType::Daily,
        total_price: Decimal::from(1500),
        down_payment: Decimal::from(750),
        status,
        deposit_paid: false,
        deposit_amount: Decimal::ZERO,
        payment_method: PaymentMethod::Gcash,
        payment_proof_url: None,
        special_requests: None,
        notes: None,
        created_at: created,
        updated_at: created,
    }
}
