//! Domain types: car listings, their owners, and resolved caller identity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One vehicle listing. Identifier and timestamps are store-assigned;
/// the owner is fixed at creation and never transfers.
#[derive(Clone, Debug)]
pub struct Car {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: Decimal,
    pub mileage: Option<i32>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: Owner,
}

/// Owner projection of a user account. Only the username is ever exposed
/// through the car-facing API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Owner {
    pub id: i64,
    pub username: String,
}

/// Caller identity resolved from request credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}
