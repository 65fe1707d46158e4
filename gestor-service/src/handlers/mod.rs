//! HTTP handlers for the JSON API.

pub mod customers;
pub mod dashboard;
pub mod financial;
pub mod products;
pub mod quotes;
pub mod sales;
pub mod settings;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gestor_core::error::AppError;
use uuid::Uuid;

/// Identity of the calling user account, taken from the `x-user-id` header
/// set by the authenticating proxy. Requests without it are rejected.
pub struct OwnerId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .map(OwnerId)
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Usuário não autenticado")))
    }
}
