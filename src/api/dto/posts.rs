/*
 * Responsibility
 * - Post request/response DTOs
 */
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::repos::post_repo::Post;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    /// Author account id; must belong to the caller.
    pub user_id: i64,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = HashMap::new();
        if self.title.trim().is_empty() {
            errors.insert("title", "title must not be empty");
        }
        if self.content.trim().is_empty() {
            errors.insert("content", "content must not be empty");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
}

impl UpdatePostRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = HashMap::new();
        if self.title.trim().is_empty() {
            errors.insert("title", "title must not be empty");
        }
        if self.content.trim().is_empty() {
            errors.insert("content", "content must not be empty");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub added_date: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            user_id: post.author_id,
            added_date: post.added_date,
        }
    }
}
