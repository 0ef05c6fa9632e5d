//! Query-parameter filtering and ordering: an ordered list of predicate
//! closures plus an optional comparator, applied to the scanned collection.

use crate::error::AppError;
use crate::model::Car;
use rust_decimal::Decimal;
use std::collections::HashMap;

type Predicate = Box<dyn Fn(&Car) -> bool + Send + Sync>;

#[derive(Clone, Copy, Debug)]
enum SortKey {
    Price,
    Year,
    Created,
}

#[derive(Clone, Copy, Debug)]
struct Sort {
    key: SortKey,
    descending: bool,
}

/// Parsed list query. Predicates are AND-combined; the multi-field search
/// is OR'd internally. Without an explicit sort the scan order (newest
/// first) is preserved.
pub struct CarQuery {
    predicates: Vec<Predicate>,
    sort: Option<Sort>,
}

impl std::fmt::Debug for CarQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarQuery")
            .field("predicates", &format_args!("<{} predicate(s)>", self.predicates.len()))
            .field("sort", &self.sort)
            .finish()
    }
}

impl CarQuery {
    /// Build from raw query parameters. Unrecognized parameters are
    /// ignored; malformed numeric or boolean values are rejected.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, AppError> {
        let mut predicates: Vec<Predicate> = Vec::new();

        if let Some(v) = params.get("make") {
            let needle = v.to_lowercase();
            predicates.push(Box::new(move |c| c.make.to_lowercase() == needle));
        }
        if let Some(v) = params.get("model") {
            let needle = v.to_lowercase();
            predicates.push(Box::new(move |c| c.model.to_lowercase() == needle));
        }
        if let Some(v) = params.get("color") {
            let needle = v.to_lowercase();
            predicates.push(Box::new(move |c| {
                c.color
                    .as_deref()
                    .is_some_and(|color| color.to_lowercase() == needle)
            }));
        }
        if let Some(v) = params.get("year") {
            let year = parse_int("year", v)?;
            predicates.push(Box::new(move |c| c.year == year));
        }
        if let Some(v) = params.get("year_min") {
            let bound = parse_int("year_min", v)?;
            predicates.push(Box::new(move |c| c.year >= bound));
        }
        if let Some(v) = params.get("year_max") {
            let bound = parse_int("year_max", v)?;
            predicates.push(Box::new(move |c| c.year <= bound));
        }
        if let Some(v) = params.get("price_min") {
            let bound = parse_decimal("price_min", v)?;
            predicates.push(Box::new(move |c| c.price >= bound));
        }
        if let Some(v) = params.get("price_max") {
            let bound = parse_decimal("price_max", v)?;
            predicates.push(Box::new(move |c| c.price <= bound));
        }
        if let Some(v) = params.get("is_available") {
            let wanted = parse_bool("is_available", v)?;
            predicates.push(Box::new(move |c| c.is_available == wanted));
        }
        if let Some(v) = params.get("search") {
            let needle = v.to_lowercase();
            predicates.push(Box::new(move |c| {
                c.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
                    || c.make.to_lowercase().contains(&needle)
                    || c.model.to_lowercase().contains(&needle)
            }));
        }

        let sort = params.get("ordering").and_then(|v| parse_sort(v));

        Ok(CarQuery { predicates, sort })
    }

    pub fn apply(&self, cars: Vec<Car>) -> Vec<Car> {
        let mut out: Vec<Car> = cars
            .into_iter()
            .filter(|c| self.predicates.iter().all(|p| p(c)))
            .collect();
        if let Some(sort) = self.sort {
            // Stable sort keeps the newest-first scan order among ties.
            out.sort_by(|a, b| {
                let ord = match sort.key {
                    SortKey::Price => a.price.cmp(&b.price),
                    SortKey::Year => a.year.cmp(&b.year),
                    SortKey::Created => a.created_at.cmp(&b.created_at),
                };
                if sort.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }
        out
    }
}

fn parse_sort(raw: &str) -> Option<Sort> {
    let (key, descending) = match raw.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };
    let key = match key {
        "price" => SortKey::Price,
        "year" => SortKey::Year,
        "created_at" => SortKey::Created,
        _ => return None,
    };
    Some(Sort { key, descending })
}

fn parse_int(name: &str, raw: &str) -> Result<i32, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("{name} must be an integer")))
}

fn parse_decimal(name: &str, raw: &str) -> Result<Decimal, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("{name} must be a number")))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, AppError> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(AppError::Validation(format!("{name} must be true or false")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Owner;
    use chrono::{Duration, Utc};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn car(id: i64, make: &str, model: &str, year: i32, price: i64, available: bool) -> Car {
        Car {
            id,
            make: make.into(),
            model: model.into(),
            year,
            price: Decimal::new(price * 100, 2),
            mileage: None,
            color: Some("Black".into()),
            description: Some(format!("{make} {model} listing")),
            is_available: available,
            created_at: Utc::now() + Duration::seconds(id),
            updated_at: Utc::now() + Duration::seconds(id),
            owner: Owner {
                id: 1,
                username: "owner".into(),
            },
        }
    }

    fn fleet() -> Vec<Car> {
        vec![
            car(3, "BMW", "X5", 2022, 4_500_000, true),
            car(2, "Honda", "CRV", 2018, 1_800_000, false),
            car(1, "Toyota", "Camry", 2020, 1_500_000, true),
        ]
    }

    #[test]
    fn make_filter_is_case_insensitive() {
        let q = CarQuery::from_params(&params(&[("make", "toyota")])).unwrap();
        let out = q.apply(fleet());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].make, "Toyota");
    }

    #[test]
    fn year_range_bounds_are_inclusive() {
        let q = CarQuery::from_params(&params(&[("year_min", "2018"), ("year_max", "2020")]))
            .unwrap();
        let years: Vec<i32> = q.apply(fleet()).iter().map(|c| c.year).collect();
        assert_eq!(years, vec![2018, 2020]);
    }

    #[test]
    fn price_range_single_bound() {
        let q = CarQuery::from_params(&params(&[("price_min", "2000000")])).unwrap();
        let out = q.apply(fleet());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].make, "BMW");
    }

    #[test]
    fn availability_filter_excludes_false_flagged() {
        let q = CarQuery::from_params(&params(&[("is_available", "TRUE")])).unwrap();
        let out = q.apply(fleet());
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|c| c.is_available));
    }

    #[test]
    fn search_matches_description_make_and_model() {
        let by_desc = CarQuery::from_params(&params(&[("search", "camry listing")])).unwrap();
        assert_eq!(by_desc.apply(fleet()).len(), 1);
        let by_make = CarQuery::from_params(&params(&[("search", "hond")])).unwrap();
        assert_eq!(by_make.apply(fleet())[0].model, "CRV");
        let none = CarQuery::from_params(&params(&[("search", "NonExistentPhrase")])).unwrap();
        assert!(none.apply(fleet()).is_empty());
    }

    #[test]
    fn predicates_and_combine() {
        let q = CarQuery::from_params(&params(&[("is_available", "true"), ("year_min", "2021")]))
            .unwrap();
        let out = q.apply(fleet());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].make, "BMW");
    }

    #[test]
    fn ordering_by_price_ascending() {
        let q = CarQuery::from_params(&params(&[("ordering", "price")])).unwrap();
        let prices: Vec<Decimal> = q.apply(fleet()).iter().map(|c| c.price).collect();
        let mut sorted = prices.clone();
        sorted.sort();
        assert_eq!(prices, sorted);
    }

    #[test]
    fn ordering_by_year_descending() {
        let q = CarQuery::from_params(&params(&[("ordering", "-year")])).unwrap();
        let years: Vec<i32> = q.apply(fleet()).iter().map(|c| c.year).collect();
        assert_eq!(years, vec![2022, 2020, 2018]);
    }

    #[test]
    fn unrecognized_ordering_keeps_scan_order() {
        let q = CarQuery::from_params(&params(&[("ordering", "mileage")])).unwrap();
        let ids: Vec<i64> = q.apply(fleet()).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn unrecognized_parameters_are_ignored() {
        let q = CarQuery::from_params(&params(&[("page", "2"), ("format", "json")])).unwrap();
        assert_eq!(q.apply(fleet()).len(), 3);
    }

    #[test]
    fn malformed_values_are_rejected() {
        for (key, value) in [
            ("year", "twenty-twenty"),
            ("year_min", "20.5"),
            ("price_max", "cheap"),
            ("is_available", "yes"),
        ] {
            let err = CarQuery::from_params(&params(&[(key, value)])).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{key} accepted {value}");
        }
    }
}
