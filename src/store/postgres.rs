//! PostgreSQL-backed store. Table DDL is applied in code at startup.

use crate::error::AppError;
use crate::model::{Car, Identity, Owner};
use crate::store::{CarChanges, CarStore, IdentityProvider, NewCar};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Joined car row as the queries return it; flattened owner columns.
#[derive(sqlx::FromRow)]
struct CarRow {
    id: i64,
    make: String,
    model: String,
    year: i32,
    price: Decimal,
    mileage: Option<i32>,
    color: Option<String>,
    description: Option<String>,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_id: i64,
    owner_username: String,
}

impl From<CarRow> for Car {
    fn from(r: CarRow) -> Self {
        Car {
            id: r.id,
            make: r.make,
            model: r.model,
            year: r.year,
            price: r.price,
            mileage: r.mileage,
            color: r.color,
            description: r.description,
            is_available: r.is_available,
            created_at: r.created_at,
            updated_at: r.updated_at,
            owner: Owner {
                id: r.owner_id,
                username: r.owner_username,
            },
        }
    }
}

const SELECT_CAR: &str = "SELECT c.id, c.make, c.model, c.year, c.price, c.mileage, c.color, \
     c.description, c.is_available, c.created_at, c.updated_at, c.owner_id, \
     u.username AS owner_username \
     FROM cars c JOIN users u ON u.id = c.owner_id";

#[derive(Clone)]
pub struct PgCarStore {
    pool: PgPool,
}

impl PgCarStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarStore for PgCarStore {
    async fn scan(&self) -> Result<Vec<Car>, AppError> {
        let sql = format!("{SELECT_CAR} ORDER BY c.created_at DESC, c.id DESC");
        tracing::debug!(sql = %sql, "scan");
        let rows: Vec<CarRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Car::from).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Car>, AppError> {
        let sql = format!("{SELECT_CAR} WHERE c.id = $1");
        let row: Option<CarRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Car::from))
    }

    async fn insert(&self, car: NewCar) -> Result<Car, AppError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO cars (make, model, year, price, mileage, color, description, \
             is_available, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
        )
        .bind(&car.make)
        .bind(&car.model)
        .bind(car.year)
        .bind(car.price)
        .bind(car.mileage)
        .bind(&car.color)
        .bind(&car.description)
        .bind(car.is_available)
        .bind(car.owner_id)
        .fetch_one(&self.pool)
        .await?;
        self.get(id)
            .await?
            .ok_or_else(|| AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(&self, id: i64, changes: CarChanges) -> Result<Option<Car>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE cars SET ");
        let mut sets = qb.separated(", ");
        if let Some(make) = changes.make {
            sets.push("make = ");
            sets.push_bind_unseparated(make);
        }
        if let Some(model) = changes.model {
            sets.push("model = ");
            sets.push_bind_unseparated(model);
        }
        if let Some(year) = changes.year {
            sets.push("year = ");
            sets.push_bind_unseparated(year);
        }
        if let Some(price) = changes.price {
            sets.push("price = ");
            sets.push_bind_unseparated(price);
        }
        if let Some(mileage) = changes.mileage {
            sets.push("mileage = ");
            sets.push_bind_unseparated(mileage);
        }
        if let Some(color) = changes.color {
            sets.push("color = ");
            sets.push_bind_unseparated(color);
        }
        if let Some(description) = changes.description {
            sets.push("description = ");
            sets.push_bind_unseparated(description);
        }
        if let Some(is_available) = changes.is_available {
            sets.push("is_available = ");
            sets.push_bind_unseparated(is_available);
        }
        sets.push("updated_at = NOW()");
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING id");
        tracing::debug!(sql = %qb.sql(), "update");
        let touched = qb.build().fetch_optional(&self.pool).await?;
        if touched.is_none() {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for PgCarStore {
    async fn identity_for_token(&self, token: &str) -> Result<Option<Identity>, AppError> {
        let row: Option<(i64, String, bool)> =
            sqlx::query_as("SELECT id, username, is_admin FROM users WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id, username, is_admin)| Identity {
            id,
            username,
            is_admin,
        }))
    }
}

/// Create the users and cars tables if they do not exist. Users are
/// provisioned externally; only the schema is managed here.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            username VARCHAR(150) NOT NULL UNIQUE,
            token TEXT UNIQUE,
            is_admin BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cars (
            id BIGSERIAL PRIMARY KEY,
            make VARCHAR(100) NOT NULL,
            model VARCHAR(100) NOT NULL,
            year INTEGER NOT NULL,
            price NUMERIC(10, 2) NOT NULL,
            mileage INTEGER,
            color VARCHAR(50),
            description TEXT,
            is_available BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            owner_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
