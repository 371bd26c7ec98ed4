/*
 * Responsibility
 * - /comments handlers; same predicate discipline as posts
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::comments::{CommentResponse, CreateCommentRequest, UpdateCommentRequest};
use crate::api::extractors::current_user::CurrentUser;
use crate::error::AppError;
use crate::repos::comment_repo::{Comment, NewComment};
use crate::services::auth::policy;
use crate::state::AppState;

async fn load_comment(state: &AppState, comment_id: i64) -> Result<Comment, AppError> {
    state
        .comments
        .find_by_id(comment_id)
        .await
        .map_err(|_| AppError::Internal)?
        .ok_or_else(|| AppError::not_found("Comment", "id", comment_id))
}

pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    req.validate()?;

    let author = state
        .users
        .find_by_id(req.user_id)
        .await
        .map_err(|_| AppError::Internal)?
        .ok_or_else(|| AppError::not_found("User", "id", req.user_id))?;

    if !policy::is_same_subject(&identity.subject, &author.email) {
        return Err(AppError::NotAuthorized);
    }

    // The target post must exist before anything is written.
    state
        .posts
        .find_by_id(req.post_id)
        .await
        .map_err(|_| AppError::Internal)?
        .ok_or_else(|| AppError::not_found("Post", "id", req.post_id))?;

    let comment = state
        .comments
        .insert(NewComment {
            content: req.content,
            author_id: author.id,
            author_email: author.email,
            post_id: req.post_id,
        })
        .await
        .map_err(|_| AppError::Internal)?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

pub async fn get_comment(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(comment_id): Path<i64>,
) -> Result<Json<CommentResponse>, AppError> {
    let comment = load_comment(&state, comment_id).await?;
    if !policy::is_owner_or_admin(&identity, &comment.author_email) {
        return Err(AppError::NotAuthorized);
    }
    Ok(Json(comment.into()))
}

/// Only the author can edit its comment.
pub async fn update_comment(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(comment_id): Path<i64>,
    Json(req): Json<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    req.validate()?;

    let comment = load_comment(&state, comment_id).await?;
    if !policy::is_same_subject(&identity.subject, &comment.author_email) {
        return Err(AppError::NotAuthorized);
    }

    let updated = state
        .comments
        .update(comment_id, req.content)
        .await
        .map_err(|_| AppError::Internal)?
        .ok_or_else(|| AppError::not_found("Comment", "id", comment_id))?;

    Ok(Json(updated.into()))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(comment_id): Path<i64>,
) -> Result<Json<CommentResponse>, AppError> {
    let comment = load_comment(&state, comment_id).await?;
    if !policy::is_owner_or_admin(&identity, &comment.author_email) {
        return Err(AppError::NotAuthorized);
    }

    let deleted = state
        .comments
        .delete(comment_id)
        .await
        .map_err(|_| AppError::Internal)?
        .ok_or_else(|| AppError::not_found("Comment", "id", comment_id))?;

    Ok(Json(deleted.into()))
}
