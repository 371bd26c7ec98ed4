/*
 * Responsibility
 * - Comment request/response DTOs
 */
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::repos::comment_repo::Comment;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub user_id: i64,
    pub post_id: i64,
}

impl CreateCommentRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = HashMap::new();
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
pub struct UpdateCommentRequest {
    pub content: String,
}

impl UpdateCommentRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = HashMap::new();
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
pub struct CommentResponse {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub post_id: i64,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            user_id: comment.author_id,
            post_id: comment.post_id,
        }
    }
}
