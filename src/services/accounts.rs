use anyhow::Context;
use chrono::{Timelike, Utc};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Customer, LoginRequest, SignupRequest};

const MIN_PASSWORD_LEN: usize = 6;

pub struct Session {
    pub access_token: String,
    pub customer: Customer,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn new_session(conn: &Connection, customer: Customer) -> Result<Session, AppError> {
    let access_token = uuid::Uuid::new_v4().simple().to_string();
    queries::create_session(conn, &access_token, &customer.id)?;
    Ok(Session {
        access_token,
        customer,
    })
}

pub fn signup(
    conn: &Connection,
    request: SignupRequest,
    hash_cost: u32,
) -> Result<Session, AppError> {
    let email = normalize_email(&request.email);
    let fields = [
        ("name", request.name.trim()),
        ("email", email.as_str()),
        ("phone", request.phone.trim()),
        ("address", request.address.trim()),
    ];
    if let Some((field, _)) = fields.iter().find(|(_, v)| v.is_empty()) {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("email is not valid".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if queries::email_exists(conn, &email)? {
        return Err(AppError::Validation("email already registered".to_string()));
    }

    let password_hash =
        bcrypt::hash(&request.password, hash_cost).context("failed to hash password")?;

    let now = Utc::now().naive_utc();
    let customer = Customer {
        id: uuid::Uuid::new_v4().to_string(),
        name: request.name.trim().to_string(),
        email,
        phone: request.phone.trim().to_string(),
        address: request.address.trim().to_string(),
        password_hash,
        created_at: now.with_nanosecond(0).unwrap_or(now),
    };
    queries::insert_customer(conn, &customer)?;

    tracing::info!(customer_id = %customer.id, "customer signed up");
    new_session(conn, customer)
}

pub fn login(conn: &Connection, request: LoginRequest) -> Result<Session, AppError> {
    let email = normalize_email(&request.email);
    let customer = queries::get_customer_by_email(conn, &email)?.ok_or(AppError::Unauthorized)?;

    let valid = bcrypt::verify(&request.password, &customer.password_hash)
        .context("failed to verify password")?;
    if !valid {
        tracing::warn!(customer_id = %customer.id, "failed login");
        return Err(AppError::Unauthorized);
    }

    new_session(conn, customer)
}

pub fn authenticate(conn: &Connection, token: &str) -> Result<Customer, AppError> {
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }
    queries::get_customer_by_session(conn, token)?.ok_or(AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    const TEST_COST: u32 = 4;

    fn signup_request(email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: "Maria Santos".to_string(),
            email: email.to_string(),
            phone: "+639170000000".to_string(),
            address: "5 Session Rd, Baguio".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_signup_then_login() {
        let conn = db::init_db(":memory:").unwrap();
        let session = signup(
            &conn,
            signup_request(" Maria@Example.com ", "secret123"),
            TEST_COST,
        )
        .unwrap();
        assert_eq!(session.customer.email, "maria@example.com");
        assert_ne!(session.customer.password_hash, "secret123");

        let login_session = login(
            &conn,
            LoginRequest {
                email: "maria@example.com".to_string(),
                password: "secret123".to_string(),
            },
        )
        .unwrap();
        assert_eq!(login_session.customer.id, session.customer.id);
        assert_ne!(login_session.access_token, session.access_token);

        let who = authenticate(&conn, &login_session.access_token).unwrap();
        assert_eq!(who.id, session.customer.id);
    }

    #[test]
    fn test_wrong_password() {
        let conn = db::init_db(":memory:").unwrap();
        signup(&conn, signup_request("maria@example.com", "secret123"), TEST_COST).unwrap();
        let result = login(
            &conn,
            LoginRequest {
                email: "maria@example.com".to_string(),
                password: "wrong-one".to_string(),
            },
        );
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_signup_validation() {
        let conn = db::init_db(":memory:").unwrap();
        assert!(matches!(
            signup(&conn, signup_request("maria@example.com", "short"), TEST_COST),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            signup(&conn, signup_request("not-an-email", "secret123"), TEST_COST),
            Err(AppError::Validation(_))
        ));

        signup(&conn, signup_request("maria@example.com", "secret123"), TEST_COST).unwrap();
        assert!(matches!(
            signup(&conn, signup_request("MARIA@example.com", "secret123"), TEST_COST),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_token() {
        let conn = db::init_db(":memory:").unwrap();
        assert!(matches!(authenticate(&conn, ""), Err(AppError::Unauthorized)));
        assert!(matches!(authenticate(&conn, "abc"), Err(AppError::Unauthorized)));
    }
}
