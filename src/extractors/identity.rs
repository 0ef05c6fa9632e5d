//! Resolve the caller identity from the Authorization header.

use crate::error::AppError;
use crate::model::Identity;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

/// Caller identity, or `None` for anonymous requests. A header carrying a
/// different scheme keyword is someone else's credential and counts as
/// anonymous; a credential in our scheme that does not resolve is refused.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Option<Identity>);

impl CurrentUser {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }

    pub fn require(&self) -> Result<&Identity, AppError> {
        self.0
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("credentials were not provided".into()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(CurrentUser(None));
        };
        let value = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("invalid authorization header".into()))?;
        let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
        if !scheme.eq_ignore_ascii_case(&state.config.auth_scheme) {
            return Ok(CurrentUser(None));
        }
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized(
                "invalid authorization header: no credentials provided".into(),
            ));
        }
        match state.identity.identity_for_token(token).await? {
            Some(identity) => Ok(CurrentUser(Some(identity))),
            None => Err(AppError::Unauthorized("invalid token".into())),
        }
    }
}
