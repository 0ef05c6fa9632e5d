//! Entity store contract and implementations.

pub mod memory;
pub mod postgres;

use crate::error::AppError;
use crate::model::{Car, Identity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub use memory::MemoryCarStore;
pub use postgres::{ensure_schema, PgCarStore};

/// Field values for a car about to be inserted. The store assigns the
/// identifier and both timestamps.
#[derive(Clone, Debug)]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: Decimal,
    pub mileage: Option<i32>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub is_available: bool,
    pub owner_id: i64,
}

/// Per-field changes for an update. `None` leaves the column untouched;
/// for nullable columns the inner `Option` distinguishes "set to a value"
/// from "set to null".
#[derive(Clone, Debug, Default)]
pub struct CarChanges {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub price: Option<Decimal>,
    pub mileage: Option<Option<i32>>,
    pub color: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub is_available: Option<bool>,
}

/// Persistent car storage. Point lookups return `None` for unknown
/// identifiers; callers decide whether that is a Not-Found condition.
#[async_trait]
pub trait CarStore: Send + Sync {
    /// Full-table scan, newest-created-first (identifier descending on ties).
    async fn scan(&self) -> Result<Vec<Car>, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Car>, AppError>;

    /// Insert assigns the identifier and sets created_at = updated_at.
    async fn insert(&self, car: NewCar) -> Result<Car, AppError>;

    /// Apply changes and refresh updated_at. created_at never moves.
    async fn update(&self, id: i64, changes: CarChanges) -> Result<Option<Car>, AppError>;

    /// Returns whether a row was removed. No cascading side effects.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Readiness probe for /ready.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Boundary to the authentication subsystem: opaque token in, resolved
/// identity out.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn identity_for_token(&self, token: &str) -> Result<Option<Identity>, AppError>;
}

/// Timestamp for a mutation that must leave `updated_at` strictly greater
/// than the previous value even within clock resolution.
pub(crate) fn next_update_instant(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::nanoseconds(1)
    }
}
