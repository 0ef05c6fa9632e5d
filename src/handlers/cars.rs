//! Car CRUD handlers. Every request runs authorize, then (for lists)
//! filter + sort + paginate, then the store operation, then serialization.

use crate::auth::{authorize, Action};
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::filter::CarQuery;
use crate::response::paginate;
use crate::serializer::{decode, CarPatch, CarPayload, CarResponse};
use crate::state::AppState;
use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

/// The route only serves numeric identifiers; anything else is no car.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("no car matches '{raw}'")))
}

pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<HashMap<String, String>>,
    user: CurrentUser,
) -> Result<impl axum::response::IntoResponse, AppError> {
    authorize(Action::List, user.identity(), None)?;
    let query = CarQuery::from_params(&params)?;
    let cars = query.apply(state.store.scan().await?);
    let page = paginate(&uri, state.config.page_size, &params, cars)?;
    Ok(Json(page.map(CarResponse::from)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
) -> Result<impl axum::response::IntoResponse, AppError> {
    authorize(Action::Retrieve, user.identity(), None)?;
    let id = parse_id(&id)?;
    let car = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no car with id {id}")))?;
    Ok(Json(CarResponse::from(car)))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    authorize(Action::Create, user.identity(), None)?;
    let caller = user.require()?;
    let payload: CarPayload = decode(body)?;
    payload.validate()?;
    // The owner is always the authenticated requester, never the body.
    let car = state.store.insert(payload.into_new_car(caller.id)).await?;
    tracing::info!(id = car.id, owner = %car.owner.username, "car created");
    Ok((StatusCode::CREATED, Json(CarResponse::from(car))))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    authorize(Action::Update, user.identity(), None)?;
    let id = parse_id(&id)?;
    let current = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no car with id {id}")))?;
    authorize(Action::Update, user.identity(), Some(&current))?;
    let payload: CarPayload = decode(body)?;
    payload.validate()?;
    let car = state
        .store
        .update(id, payload.into_changes())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no car with id {id}")))?;
    Ok(Json(CarResponse::from(car)))
}

pub async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    authorize(Action::Update, user.identity(), None)?;
    let id = parse_id(&id)?;
    let current = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no car with id {id}")))?;
    authorize(Action::Update, user.identity(), Some(&current))?;
    let patch: CarPatch = decode(body)?;
    patch.validate()?;
    let car = state
        .store
        .update(id, patch.into_changes())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no car with id {id}")))?;
    Ok(Json(CarResponse::from(car)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
) -> Result<impl axum::response::IntoResponse, AppError> {
    authorize(Action::Delete, user.identity(), None)?;
    let id = parse_id(&id)?;
    let current = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no car with id {id}")))?;
    authorize(Action::Delete, user.identity(), Some(&current))?;
    if !state.store.delete(id).await? {
        return Err(AppError::NotFound(format!("no car with id {id}")));
    }
    tracing::info!(id, "car deleted");
    Ok(StatusCode::NO_CONTENT)
}
