//! Per-action authorization, evaluated before any store mutation.

use crate::error::AppError;
use crate::model::{Car, Identity};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

/// Decide whether `caller` may perform `action` on `target`.
///
/// Update and delete run the gate twice: once before the row is fetched
/// (`target` is `None`, refusing anonymous callers up front) and once with
/// the fetched row for the ownership check. Unauthenticated and
/// insufficient-privilege refusals stay distinct.
pub fn authorize(
    action: Action,
    caller: Option<&Identity>,
    target: Option<&Car>,
) -> Result<(), AppError> {
    match action {
        Action::List | Action::Retrieve => Ok(()),
        Action::Create => {
            if caller.is_some() {
                Ok(())
            } else {
                Err(AppError::Unauthorized("credentials were not provided".into()))
            }
        }
        Action::Update | Action::Delete => {
            let Some(caller) = caller else {
                return Err(AppError::Unauthorized("credentials were not provided".into()));
            };
            match target {
                None => Ok(()),
                Some(car) if caller.is_admin || car.owner.id == caller.id => Ok(()),
                Some(_) => Err(AppError::Forbidden(
                    "only the owner may modify this car".into(),
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Owner;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn identity(id: i64, is_admin: bool) -> Identity {
        Identity {
            id,
            username: format!("user{id}"),
            is_admin,
        }
    }

    fn car_owned_by(owner_id: i64) -> Car {
        Car {
            id: 1,
            make: "Toyota".into(),
            model: "Camry".into(),
            year: 2020,
            price: Decimal::new(150_000_000, 2),
            mileage: None,
            color: None,
            description: None,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            owner: Owner {
                id: owner_id,
                username: format!("user{owner_id}"),
            },
        }
    }

    #[test]
    fn reads_are_open_to_anonymous() {
        assert!(authorize(Action::List, None, None).is_ok());
        assert!(authorize(Action::Retrieve, None, Some(&car_owned_by(1))).is_ok());
    }

    #[test]
    fn create_requires_authentication() {
        let err = authorize(Action::Create, None, None).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(authorize(Action::Create, Some(&identity(1, false)), None).is_ok());
    }

    #[test]
    fn anonymous_writes_are_unauthorized_before_target_is_known() {
        for action in [Action::Update, Action::Delete] {
            let err = authorize(action, None, None).unwrap_err();
            assert!(matches!(err, AppError::Unauthorized(_)));
        }
    }

    #[test]
    fn owner_and_admin_may_mutate_others_may_not() {
        let car = car_owned_by(1);
        for action in [Action::Update, Action::Delete] {
            assert!(authorize(action, Some(&identity(1, false)), Some(&car)).is_ok());
            assert!(authorize(action, Some(&identity(9, true)), Some(&car)).is_ok());
            let err = authorize(action, Some(&identity(2, false)), Some(&car)).unwrap_err();
            assert!(matches!(err, AppError::Forbidden(_)));
        }
    }
}
