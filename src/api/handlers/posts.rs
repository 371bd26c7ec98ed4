/*
 * Responsibility
 * - /posts handlers; ownership facts come from the post record's
 *   author_email, policy decisions happen before any mutation
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::comments::CommentResponse;
use crate::api::dto::posts::{CreatePostRequest, PostResponse, UpdatePostRequest};
use crate::api::extractors::current_user::CurrentUser;
use crate::error::AppError;
use crate::repos::post_repo::{NewPost, Post};
use crate::services::auth::policy;
use crate::state::AppState;

async fn load_post(state: &AppState, post_id: i64) -> Result<Post, AppError> {
    state
        .posts
        .find_by_id(post_id)
        .await
        .map_err(|_| AppError::Internal)?
        .ok_or_else(|| AppError::not_found("Post", "id", post_id))
}

/// A post can only be created under the caller's own account.
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
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

    let post = state
        .posts
        .insert(NewPost {
            title: req.title,
            content: req.content,
            author_id: author.id,
            author_email: author.email,
        })
        .await
        .map_err(|_| AppError::Internal)?;

    Ok((StatusCode::CREATED, Json(post.into())))
}

pub async fn get_post(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<Json<PostResponse>, AppError> {
    let post = load_post(&state, post_id).await?;
    if !policy::is_owner_or_admin(&identity, &post.author_email) {
        return Err(AppError::NotAuthorized);
    }
    Ok(Json(post.into()))
}

/// Only the author can edit; admins cannot rewrite someone else's post.
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(post_id): Path<i64>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, AppError> {
    req.validate()?;

    let post = load_post(&state, post_id).await?;
    if !policy::is_same_subject(&identity.subject, &post.author_email) {
        return Err(AppError::NotAuthorized);
    }

    let updated = state
        .posts
        .update(post_id, req.title, req.content)
        .await
        .map_err(|_| AppError::Internal)?
        .ok_or_else(|| AppError::not_found("Post", "id", post_id))?;

    Ok(Json(updated.into()))
}

pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<Json<PostResponse>, AppError> {
    let post = load_post(&state, post_id).await?;
    if !policy::is_owner_or_admin(&identity, &post.author_email) {
        return Err(AppError::NotAuthorized);
    }

    let deleted = state
        .posts
        .delete(post_id)
        .await
        .map_err(|_| AppError::Internal)?
        .ok_or_else(|| AppError::not_found("Post", "id", post_id))?;

    Ok(Json(deleted.into()))
}

/// Admin only.
pub async fn list_posts(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    if !policy::is_admin(&identity) {
        return Err(AppError::NotAuthorized);
    }

    let posts = state.posts.list().await.map_err(|_| AppError::Internal)?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// Admin only.
pub async fn search_posts(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(keyword): Path<String>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    if !policy::is_admin(&identity) {
        return Err(AppError::NotAuthorized);
    }

    let posts = state
        .posts
        .search(&keyword)
        .await
        .map_err(|_| AppError::Internal)?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

pub async fn post_comments(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let post = load_post(&state, post_id).await?;
    if !policy::is_owner_or_admin(&identity, &post.author_email) {
        return Err(AppError::NotAuthorized);
    }

    let comments = state
        .comments
        .list_by_post(post_id)
        .await
        .map_err(|_| AppError::Internal)?;
    Ok(Json(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}
