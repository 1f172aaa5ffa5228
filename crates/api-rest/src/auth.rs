//! Request authentication.
//!
//! Every API route except the health check takes an [`AuthenticatedActor`], which resolves the
//! `Authorization: Token <t>` header to a user and builds the request [`Actor`] before the
//! handler body runs.

use crate::error::ApiError;
use crate::state::AppState;
use api_shared::auth::{token_from_header, AuthError};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use mhr_core::models::Actor;
use mhr_core::RecordsResult;

pub struct AuthenticatedActor(pub Actor);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str().map_err(|_| AuthError::MalformedHeader))
            .transpose()?;
        let token = token_from_header(header)?;

        let actor: Option<RecordsResult<Actor>> = state.store.read(|records| {
            records
                .user_by_token(token)
                .map(|user| records.actor_for(user))
        })?;

        match actor {
            Some(actor) => Ok(AuthenticatedActor(actor?)),
            None => Err(AuthError::InvalidToken.into()),
        }
    }
}
