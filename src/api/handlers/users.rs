/*
 * Responsibility
 * - /users handlers; each consults exactly one policy predicate (the
 *   narrowest sufficient one) before touching a repo
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::comments::CommentResponse;
use crate::api::dto::posts::PostResponse;
use crate::api::dto::users::{UpdateUserRequest, UserResponse};
use crate::api::extractors::current_user::CurrentUser;
use crate::error::AppError;
use crate::repos::user_repo::{User, UserUpdate};
use crate::services::auth::{password, policy};
use crate::state::AppState;

async fn load_user(state: &AppState, user_id: i64) -> Result<User, AppError> {
    state
        .users
        .find_by_id(user_id)
        .await
        .map_err(|_| AppError::Internal)?
        .ok_or_else(|| AppError::not_found("User", "id", user_id))
}

/// Either the owning user or an admin can read an account.
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = load_user(&state, user_id).await?;
    if !policy::is_owner_or_admin(&identity, &user.email) {
        return Err(AppError::NotAuthorized);
    }
    Ok(Json(user.into()))
}

/// Only the user itself can update its profile; admins cannot.
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()?;

    let user = load_user(&state, user_id).await?;
    if !policy::is_same_subject(&identity.subject, &user.email) {
        return Err(AppError::NotAuthorized);
    }

    let updated = state
        .users
        .update(
            user_id,
            UserUpdate {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                password_digest: password::digest(&req.password),
                about: req.about,
            },
        )
        .await?
        .ok_or_else(|| AppError::not_found("User", "id", user_id))?;

    Ok(Json(updated.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = load_user(&state, user_id).await?;
    if !policy::is_owner_or_admin(&identity, &user.email) {
        return Err(AppError::NotAuthorized);
    }

    let deleted = state
        .users
        .delete(user_id)
        .await
        .map_err(|_| AppError::Internal)?
        .ok_or_else(|| AppError::not_found("User", "id", user_id))?;

    Ok(Json(deleted.into()))
}

/// Admin only.
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    if !policy::is_admin(&identity) {
        return Err(AppError::NotAuthorized);
    }

    let users = state.users.list().await.map_err(|_| AppError::Internal)?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn user_posts(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let user = load_user(&state, user_id).await?;
    if !policy::is_owner_or_admin(&identity, &user.email) {
        return Err(AppError::NotAuthorized);
    }

    let posts = state
        .posts
        .list_by_author(user_id)
        .await
        .map_err(|_| AppError::Internal)?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

pub async fn user_comments(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let user = load_user(&state, user_id).await?;
    if !policy::is_owner_or_admin(&identity, &user.email) {
        return Err(AppError::NotAuthorized);
    }

    let comments = state
        .comments
        .list_by_author(user_id)
        .await
        .map_err(|_| AppError::Internal)?;
    Ok(Json(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}
