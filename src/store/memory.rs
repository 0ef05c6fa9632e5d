//! In-memory store for tests and demos. Same contract as the PostgreSQL
//! store, no external services.

use crate::error::AppError;
use crate::model::{Car, Identity, Owner};
use crate::store::{next_update_instant, CarChanges, CarStore, IdentityProvider, NewCar};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{PoisonError, RwLock};

struct MemUser {
    identity: Identity,
    token: Option<String>,
}

#[derive(Default)]
struct Inner {
    cars: Vec<Car>,
    users: Vec<MemUser>,
    next_car_id: i64,
    next_user_id: i64,
}

#[derive(Default)]
pub struct MemoryCarStore {
    inner: RwLock<Inner>,
}

impl MemoryCarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user account. Accounts are otherwise provisioned outside
    /// this system; tests seed them through here.
    pub fn add_user(&self, username: &str, token: Option<&str>, is_admin: bool) -> Identity {
        let mut inner = self.write();
        inner.next_user_id += 1;
        let identity = Identity {
            id: inner.next_user_id,
            username: username.to_string(),
            is_admin,
        };
        inner.users.push(MemUser {
            identity: identity.clone(),
            token: token.map(String::from),
        });
        identity
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CarStore for MemoryCarStore {
    async fn scan(&self) -> Result<Vec<Car>, AppError> {
        let mut cars = self.read().cars.clone();
        cars.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(cars)
    }

    async fn get(&self, id: i64) -> Result<Option<Car>, AppError> {
        Ok(self.read().cars.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, car: NewCar) -> Result<Car, AppError> {
        let mut inner = self.write();
        let owner = inner
            .users
            .iter()
            .find(|u| u.identity.id == car.owner_id)
            .map(|u| Owner {
                id: u.identity.id,
                username: u.identity.username.clone(),
            })
            .ok_or_else(|| AppError::Validation(format!("unknown owner {}", car.owner_id)))?;
        inner.next_car_id += 1;
        let now = Utc::now();
        let stored = Car {
            id: inner.next_car_id,
            make: car.make,
            model: car.model,
            year: car.year,
            price: car.price,
            mileage: car.mileage,
            color: car.color,
            description: car.description,
            is_available: car.is_available,
            created_at: now,
            updated_at: now,
            owner,
        };
        inner.cars.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, changes: CarChanges) -> Result<Option<Car>, AppError> {
        let mut inner = self.write();
        let Some(car) = inner.cars.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(make) = changes.make {
            car.make = make;
        }
        if let Some(model) = changes.model {
            car.model = model;
        }
        if let Some(year) = changes.year {
            car.year = year;
        }
        if let Some(price) = changes.price {
            car.price = price;
        }
        if let Some(mileage) = changes.mileage {
            car.mileage = mileage;
        }
        if let Some(color) = changes.color {
            car.color = color;
        }
        if let Some(description) = changes.description {
            car.description = description;
        }
        if let Some(is_available) = changes.is_available {
            car.is_available = is_available;
        }
        car.updated_at = next_update_instant(car.updated_at);
        Ok(Some(car.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.write();
        let before = inner.cars.len();
        inner.cars.retain(|c| c.id != id);
        Ok(inner.cars.len() < before)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MemoryCarStore {
    async fn identity_for_token(&self, token: &str) -> Result<Option<Identity>, AppError> {
        Ok(self
            .read()
            .users
            .iter()
            .find(|u| u.token.as_deref() == Some(token))
            .map(|u| u.identity.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn draft(owner_id: i64) -> NewCar {
        NewCar {
            make: "Toyota".into(),
            model: "Camry".into(),
            year: 2020,
            price: Decimal::new(1_500_000_00, 2),
            mileage: Some(50_000),
            color: Some("Black".into()),
            description: Some("Reliable sedan".into()),
            is_available: true,
            owner_id,
        }
    }

    #[tokio::test]
    async fn insert_assigns_monotonic_ids_and_timestamps() {
        let store = MemoryCarStore::new();
        let user = store.add_user("owner", None, false);
        let first = store.insert(draft(user.id)).await.unwrap();
        let second = store.insert(draft(user.id)).await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(first.created_at, first.updated_at);
        assert_eq!(first.owner.username, "owner");
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_strictly() {
        let store = MemoryCarStore::new();
        let user = store.add_user("owner", None, false);
        let car = store.insert(draft(user.id)).await.unwrap();
        let mut last = car.updated_at;
        for _ in 0..3 {
            let updated = store
                .update(car.id, CarChanges::default())
                .await
                .unwrap()
                .unwrap();
            assert!(updated.updated_at > last);
            assert_eq!(updated.created_at, car.created_at);
            last = updated.updated_at;
        }
    }

    #[tokio::test]
    async fn update_can_clear_nullable_columns() {
        let store = MemoryCarStore::new();
        let user = store.add_user("owner", None, false);
        let car = store.insert(draft(user.id)).await.unwrap();
        let changes = CarChanges {
            mileage: Some(None),
            ..CarChanges::default()
        };
        let updated = store.update(car.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.mileage, None);
        assert_eq!(updated.color.as_deref(), Some("Black"));
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_row() {
        let store = MemoryCarStore::new();
        let user = store.add_user("owner", None, false);
        let car = store.insert(draft(user.id)).await.unwrap();
        store.insert(draft(user.id)).await.unwrap();
        assert!(store.delete(car.id).await.unwrap());
        assert!(!store.delete(car.id).await.unwrap());
        assert_eq!(store.scan().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn token_resolution() {
        let store = MemoryCarStore::new();
        let user = store.add_user("owner", Some("secret"), false);
        let found = store.identity_for_token("secret").await.unwrap();
        assert_eq!(found, Some(user));
        assert_eq!(store.identity_for_token("nope").await.unwrap(), None);
    }
}
