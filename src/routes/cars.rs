//! Car routes: collection and single-record endpoints.

use crate::handlers::cars::{create, delete as delete_handler, list, partial_update, retrieve, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn car_routes(state: AppState) -> Router {
    Router::new()
        .route("/cars", get(list).post(create))
        .route(
            "/cars/:id",
            get(retrieve)
                .put(update)
                .patch(partial_update)
                .delete(delete_handler),
        )
        .with_state(state)
}
