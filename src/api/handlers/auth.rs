/*
 * Responsibility
 * - /auth endpoints: register and login (both allow-listed)
 * - Issue a signed token on success; uniqueness and credential failures
 *   map to the shared error taxonomy
 */
use axum::{Json, extract::State};

use crate::api::dto::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::repos::user_repo::NewUser;
use crate::services::auth::password;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;

    let user = state
        .users
        .insert(NewUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password_digest: password::digest(&req.password),
            about: req.about,
            role: req.role,
        })
        .await?;

    tracing::info!(user_id = user.id, "registered new account");

    let token = state.jwt.sign(&user.email, user.role)?;
    Ok(Json(AuthResponse { token }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;

    let user = state
        .users
        .find_by_email(&req.email)
        .await
        .map_err(|_| AppError::Internal)?
        .ok_or_else(|| AppError::not_found("User", "email", &req.email))?;

    if !password::verify(&req.password, &user.password_digest) {
        tracing::debug!(subject = %user.email, "login rejected: bad credentials");
        return Err(AppError::NotAuthorized);
    }

    let token = state.jwt.sign(&user.email, user.role)?;
    Ok(Json(AuthResponse { token }))
}
