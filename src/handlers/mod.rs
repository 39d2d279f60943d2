use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

pub mod common;
pub mod inventory;
pub mod items;
pub mod locations;
pub mod metrics;
pub mod orders;

/// Already-authenticated actor identity, taken from the `x-actor-id` header
/// the auth layer in front of this service sets. Missing or malformed ids
/// degrade to an anonymous actor; authorization itself is not this
/// service's concern.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get("x-actor-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok());
        Ok(Actor(actor))
    }
}
