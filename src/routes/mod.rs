pub mod cars;
pub mod common;

pub use cars::car_routes;
pub use common::common_routes;
