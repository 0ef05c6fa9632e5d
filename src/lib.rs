//! Dealership API: car inventory REST backend library.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod filter;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod serializer;
pub mod state;
pub mod store;

pub use auth::{authorize, Action};
pub use config::AppConfig;
pub use error::{AppError, ConfigError};
pub use filter::CarQuery;
pub use response::{paginate, Page};
pub use routes::{car_routes, common_routes};
pub use serializer::{CarPatch, CarPayload, CarResponse};
pub use state::AppState;
pub use store::{ensure_schema, CarStore, IdentityProvider, MemoryCarStore, PgCarStore};
