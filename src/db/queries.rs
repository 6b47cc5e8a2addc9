use std::str::FromStr;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::models::{Booking, BookingFilter, BookingStatus, Customer, PaymentMethod, PlanType};

const DATE_FMT: &str = "%Y-%m-%d";
const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

const BOOKING_COLUMNS: &str = "id, customer_id, customer_name, customer_email, customer_phone, \
     delivery_address, start_date, end_date, plan_type, total_price, down_payment, status, \
     deposit_paid, deposit_amount, payment_method, payment_proof_url, special_requests, notes, \
     created_at, updated_at";

fn now_timestamp() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FMT).to_string()
}

/// Stored spellings that map to a status. Rows written by older front ends
/// may still say `confirmed`.
fn stored_status_values(status: BookingStatus) -> &'static [&'static str] {
    match status {
        BookingStatus::Pending => &["pending"],
        BookingStatus::Approved => &["approved", "confirmed"],
        BookingStatus::Rejected => &["rejected"],
    }
}

fn status_in_clause(status: BookingStatus) -> String {
    let quoted: Vec<String> = stored_status_values(status)
        .iter()
        .map(|s| format!("'{s}'"))
        .collect();
    format!("status IN ({})", quoted.join(", "))
}

// ── Customers ──

pub fn insert_customer(conn: &Connection, customer: &Customer) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO customers (id, name, email, phone, address, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            customer.id,
            customer.name,
            customer.email,
            customer.phone,
            customer.address,
            customer.password_hash,
            customer.created_at.format(TIMESTAMP_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn email_exists(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM customers WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_customer_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<Customer>> {
    query_customer(
        conn,
        "SELECT id, name, email, phone, address, password_hash, created_at
         FROM customers WHERE email = ?1",
        email,
    )
}

pub fn get_customer_by_session(conn: &Connection, token: &str) -> anyhow::Result<Option<Customer>> {
    query_customer(
        conn,
        "SELECT c.id, c.name, c.email, c.phone, c.address, c.password_hash, c.created_at
         FROM sessions s INNER JOIN customers c ON c.id = s.customer_id
         WHERE s.token = ?1",
        token,
    )
}

fn query_customer(conn: &Connection, sql: &str, key: &str) -> anyhow::Result<Option<Customer>> {
    let result = conn.query_row(sql, params![key], |row| {
        let created_at_str: String = row.get(6)?;
        Ok((
            Customer {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                address: row.get(4)?,
                password_hash: row.get(5)?,
                created_at: NaiveDateTime::default(),
            },
            created_at_str,
        ))
    });

    match result {
        Ok((mut customer, created_at_str)) => {
            customer.created_at = parse_timestamp(&created_at_str)?;
            Ok(Some(customer))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn create_session(conn: &Connection, token: &str, customer_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO sessions (token, customer_id) VALUES (?1, ?2)",
        params![token, customer_id],
    )?;
    Ok(())
}

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
        ),
        params![
            booking.id,
            booking.customer_id,
            booking.customer_name,
            booking.customer_email,
            booking.customer_phone,
            booking.delivery_address,
            booking.start_date.format(DATE_FMT).to_string(),
            booking.end_date.format(DATE_FMT).to_string(),
            booking.plan_type.as_str(),
            booking.total_price.to_string(),
            booking.down_payment.to_string(),
            booking.status.as_str(),
            booking.deposit_paid,
            booking.deposit_amount.to_string(),
            booking.payment_method.as_str(),
            booking.payment_proof_url,
            booking.special_requests,
            booking.notes,
            booking.created_at.format(TIMESTAMP_FMT).to_string(),
            booking.updated_at.format(TIMESTAMP_FMT).to_string(),
        ],
    )
    .context("failed to insert booking")?;
    Ok(())
}

pub fn list_bookings(conn: &Connection, filter: &BookingFilter) -> anyhow::Result<Vec<Booking>> {
    let mut clauses: Vec<String> = vec![];
    let mut params_vec: Vec<Box<dyn ToSql>> = vec![];

    if let Some(status) = filter.status {
        clauses.push(status_in_clause(status));
    }
    if let Some(customer_id) = &filter.customer_id {
        params_vec.push(Box::new(customer_id.clone()));
        clauses.push(format!("customer_id = ?{}", params_vec.len()));
    }

    let mut sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC, id ASC");
    if let Some(limit) = filter.limit {
        params_vec.push(Box::new(limit));
        sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));
    }

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Conditional status change: only applies while the booking is still in
/// `expected`. Returns the updated booking, or `None` if the row is missing
/// or has already moved on.
pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    expected: BookingStatus,
    new: BookingStatus,
    notes: Option<&str>,
) -> anyhow::Result<Option<Booking>> {
    let count = conn.execute(
        &format!(
            "UPDATE bookings SET status = ?1, notes = COALESCE(?2, notes), updated_at = ?3
             WHERE id = ?4 AND {}",
            status_in_clause(expected)
        ),
        params![new.as_str(), notes, now_timestamp(), id],
    )?;

    if count == 0 {
        return Ok(None);
    }
    get_booking_by_id(conn, id)
}

/// Deposit metadata only; the status column is never touched here.
pub fn update_deposit(
    conn: &Connection,
    id: &str,
    paid: bool,
    amount: Decimal,
) -> anyhow::Result<Option<Booking>> {
    let count = conn.execute(
        "UPDATE bookings SET deposit_paid = ?1, deposit_amount = ?2, updated_at = ?3 WHERE id = ?4",
        params![paid, amount.to_string(), now_timestamp(), id],
    )?;

    if count == 0 {
        return Ok(None);
    }
    get_booking_by_id(conn, id)
}

pub struct BookingStats {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub approved_revenue: Decimal,
}

pub fn get_booking_stats(conn: &Connection) -> anyhow::Result<BookingStats> {
    let count_for = |status: BookingStatus| -> anyhow::Result<i64> {
        let count = conn.query_row(
            &format!("SELECT COUNT(*) FROM bookings WHERE {}", status_in_clause(status)),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    };

    // Summed in Rust: SQLite would add the TEXT amounts as floats.
    let mut stmt = conn.prepare(&format!(
        "SELECT total_price FROM bookings WHERE {}",
        status_in_clause(BookingStatus::Approved)
    ))?;
    let prices = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut approved_revenue = Decimal::ZERO;
    for price in prices {
        approved_revenue += parse_decimal(&price?)?;
    }

    Ok(BookingStats {
        pending: count_for(BookingStatus::Pending)?,
        approved: count_for(BookingStatus::Approved)?,
        rejected: count_for(BookingStatus::Rejected)?,
        approved_revenue,
    })
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let start_date_str: String = row.get(6)?;
    let end_date_str: String = row.get(7)?;
    let plan_type_str: String = row.get(8)?;
    let total_price_str: String = row.get(9)?;
    let down_payment_str: String = row.get(10)?;
    let status_str: String = row.get(11)?;
    let deposit_amount_str: String = row.get(13)?;
    let payment_method_str: String = row.get(14)?;
    let created_at_str: String = row.get(18)?;
    let updated_at_str: String = row.get(19)?;

    let status = BookingStatus::parse(&status_str)
        .with_context(|| format!("unknown booking status in store: {status_str}"))?;

    Ok(Booking {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        customer_name: row.get(2)?,
        customer_email: row.get(3)?,
        customer_phone: row.get(4)?,
        delivery_address: row.get(5)?,
        start_date: parse_date(&start_date_str)?,
        end_date: parse_date(&end_date_str)?,
        plan_type: PlanType::from_str(&plan_type_str)?,
        total_price: parse_decimal(&total_price_str)?,
        down_payment: parse_decimal(&down_payment_str)?,
        status,
        deposit_paid: row.get(12)?,
        deposit_amount: parse_decimal(&deposit_amount_str)?,
        payment_method: PaymentMethod::from_str(&payment_method_str)?,
        payment_proof_url: row.get(15)?,
        special_requests: row.get(16)?,
        notes: row.get(17)?,
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FMT).with_context(|| format!("invalid stored date: {s}"))
}

fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FMT)
        .with_context(|| format!("invalid stored timestamp: {s}"))
}

fn parse_decimal(s: &str) -> anyhow::Result<Decimal> {
    Decimal::from_str(s).with_context(|| format!("invalid stored amount: {s}"))
}
