//! Wire-format mapping for car records: response projection with the nested
//! owner, and request payloads for create/update with field validation.

use crate::error::AppError;
use crate::model::Car;
use crate::store::{CarChanges, NewCar};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize)]
pub struct OwnerResponse {
    pub username: String,
}

/// Flat car object as returned by every read endpoint. Price keeps a fixed
/// two-decimal scale on the wire.
#[derive(Serialize)]
pub struct CarResponse {
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
    pub owner: OwnerResponse,
}

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        let mut price = car.price;
        price.rescale(2);
        CarResponse {
            id: car.id,
            make: car.make,
            model: car.model,
            year: car.year,
            price,
            mileage: car.mileage,
            color: car.color,
            description: car.description,
            is_available: car.is_available,
            created_at: car.created_at,
            updated_at: car.updated_at,
            owner: OwnerResponse {
                username: car.owner.username,
            },
        }
    }
}

/// Body for create and PUT. Server-assigned fields (`id`, `created_at`,
/// `updated_at`, `owner`) are not part of the payload and are silently
/// dropped when supplied; the owner always comes from the caller identity.
#[derive(Debug, Deserialize)]
pub struct CarPayload {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: Decimal,
    #[serde(default)]
    pub mileage: Option<i32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl CarPayload {
    pub fn validate(&self) -> Result<(), AppError> {
        check_text("make", &self.make, 100)?;
        check_text("model", &self.model, 100)?;
        if let Some(color) = &self.color {
            check_length("color", color, 50)?;
        }
        check_price(&self.price)
    }

    pub fn into_new_car(self, owner_id: i64) -> NewCar {
        NewCar {
            make: self.make,
            model: self.model,
            year: self.year,
            price: self.price,
            mileage: self.mileage,
            color: self.color,
            description: self.description,
            is_available: self.is_available,
            owner_id,
        }
    }

    /// Full replacement: every client-controlled column is set, optional
    /// ones to null when omitted.
    pub fn into_changes(self) -> CarChanges {
        CarChanges {
            make: Some(self.make),
            model: Some(self.model),
            year: Some(self.year),
            price: Some(self.price),
            mileage: Some(self.mileage),
            color: Some(self.color),
            description: Some(self.description),
            is_available: Some(self.is_available),
        }
    }
}

/// Body for PATCH. Nullable columns use a double Option so an explicit
/// `"mileage": null` clears the column while an absent key leaves it alone.
#[derive(Debug, Default, Deserialize)]
pub struct CarPatch {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub mileage: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub color: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub is_available: Option<bool>,
}

impl CarPatch {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(make) = &self.make {
            check_text("make", make, 100)?;
        }
        if let Some(model) = &self.model {
            check_text("model", model, 100)?;
        }
        if let Some(Some(color)) = &self.color {
            check_length("color", color, 50)?;
        }
        if let Some(price) = &self.price {
            check_price(price)?;
        }
        Ok(())
    }

    pub fn into_changes(self) -> CarChanges {
        CarChanges {
            make: self.make,
            model: self.model,
            year: self.year,
            price: self.price,
            mileage: self.mileage,
            color: self.color,
            description: self.description,
            is_available: self.is_available,
        }
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Decode a JSON body into a payload type; malformed shapes are a client
/// validation failure, not a framework rejection.
pub fn decode<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))
}

fn check_text(name: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be blank")));
    }
    check_length(name, value, max)
}

fn check_length(name: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{name} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Price column is NUMERIC(10, 2): at most two decimal places and ten
/// digits in total.
fn check_price(price: &Decimal) -> Result<(), AppError> {
    let normalized = price.normalize();
    if normalized.scale() > 2 {
        return Err(AppError::Validation(
            "price must have no more than 2 decimal places".into(),
        ));
    }
    if normalized.abs().trunc() >= Decimal::from(100_000_000_i64) {
        return Err(AppError::Validation(
            "price must have no more than 10 digits in total".into(),
        ));
    }
    Ok(())
}
