/*
 * Responsibility
 * - Read accessor for the request identity installed by the auth gate
 * - Absent identity on a protected route rejects before the handler runs
 */
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Identity;

/// Extractor handing the resolved request identity to handlers.
///
/// The gate installs the identity into the request extensions; if it is
/// missing here the caller is anonymous on a route that requires one, so
/// the operation is rejected without touching any repo.
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::NotAuthorized)
    }
}
