/*
 * Responsibility
 * - App-wide AppError taxonomy (auth, policy, resource, validation kinds)
 * - IntoResponse impl: HTTP status + {"errorMessage": ...} JSON body
 * - Single translation point; no error kind is swallowed on the way out
 */
use std::collections::HashMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::JwtError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Authorization header absent or not Bearer-prefixed.
    #[error("Missing or Invalid Auth Header: {0}")]
    InvalidAuthHeader(String),

    /// Token does not parse as a signed-token structure.
    #[error("Invalid JWT token: {0}")]
    MalformedToken(String),

    /// Signature fails against the trusted key.
    #[error("Invalid JWT signature: {0}")]
    BadSignature(String),

    /// Current time at/after the embedded expiry.
    #[error("Expired JWT signature: {0}")]
    ExpiredToken(String),

    /// Any other structural token defect (missing subject, bad algorithm).
    #[error("JWT exception: {0}")]
    InvalidToken(String),

    /// Subject from a valid token has no matching account. An
    /// authentication failure, deliberately not a 404 of the account.
    #[error("No account found for subject: {0}")]
    IdentityNotFound(String),

    #[error("The user is not authorized to perform this action")]
    NotAuthorized,

    #[error("{resource} not found with {field} : {value}")]
    NotFound {
        resource: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("User already exists with the username: {0}")]
    AlreadyExists(String),

    /// Field-level request validation; serialized as a field → message map
    /// instead of a single errorMessage.
    #[error("invalid request body")]
    Validation(HashMap<&'static str, &'static str>),

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn not_found(resource: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            resource,
            field,
            value: value.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    #[serde(rename = "errorMessage")]
    error_message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidAuthHeader(_)
            | AppError::MalformedToken(_)
            | AppError::BadSignature(_)
            | AppError::ExpiredToken(_)
            | AppError::InvalidToken(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::IdentityNotFound(_) => StatusCode::UNAUTHORIZED,
            AppError::NotAuthorized => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match self {
            AppError::Validation(fields) => (status, Json(fields)).into_response(),
            other => {
                let body = ErrorResponse {
                    error_message: other.to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

impl From<JwtError> for AppError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Malformed(m) => AppError::MalformedToken(m),
            JwtError::BadSignature(m) => AppError::BadSignature(m),
            JwtError::Expired(m) => AppError::ExpiredToken(m),
            JwtError::Invalid(m) => AppError::InvalidToken(m),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict { value } => AppError::AlreadyExists(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let cases = [
            (
                AppError::InvalidAuthHeader(String::new()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::ExpiredToken("exp".into()), StatusCode::BAD_REQUEST),
            (
                AppError::IdentityNotFound("a@x.com".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (AppError::NotAuthorized, StatusCode::FORBIDDEN),
            (AppError::not_found("Post", "id", 7), StatusCode::NOT_FOUND),
            (
                AppError::AlreadyExists("a@x.com".into()),
                StatusCode::CONFLICT,
            ),
            (AppError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn not_authorized_message_is_fixed() {
        assert_eq!(
            AppError::NotAuthorized.to_string(),
            "The user is not authorized to perform this action"
        );
    }

    #[test]
    fn not_found_message_names_resource_field_and_value() {
        assert_eq!(
            AppError::not_found("User", "id", 42).to_string(),
            "User not found with id : 42"
        );
    }
}
