/*
 * Responsibility
 * - Comment store collaborator, same ownership-fact shape as posts
 */
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::error::RepoError;

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub author_id: i64,
    pub author_email: String,
    pub post_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub author_id: i64,
    pub author_email: String,
    pub post_id: i64,
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError>;
    async fn insert(&self, comment: NewComment) -> Result<Comment, RepoError>;
    async fn update(&self, id: i64, content: String) -> Result<Option<Comment>, RepoError>;
    async fn delete(&self, id: i64) -> Result<Option<Comment>, RepoError>;
    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Comment>, RepoError>;
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;
}

#[derive(Default)]
pub struct InMemoryCommentRepo {
    comments: RwLock<HashMap<i64, Comment>>,
    next_id: AtomicI64,
}

impl InMemoryCommentRepo {
    pub fn new() -> Self {
        Self {
            comments: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl CommentRepo for InMemoryCommentRepo {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.comments.read().await.get(&id).cloned())
    }

    async fn insert(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut comments = self.comments.write().await;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let stored = Comment {
            id,
            content: comment.content,
            author_id: comment.author_id,
            author_email: comment.author_email,
            post_id: comment.post_id,
        };
        comments.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, content: String) -> Result<Option<Comment>, RepoError> {
        let mut comments = self.comments.write().await;
        match comments.get_mut(&id) {
            Some(comment) => {
                comment.content = content;
                Ok(Some(comment.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.comments.write().await.remove(&id))
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Comment>, RepoError> {
        let comments = self.comments.read().await;
        let mut hits: Vec<Comment> = comments
            .values()
            .filter(|c| c.author_id == author_id)
            .cloned()
            .collect();
        hits.sort_by_key(|c| c.id);
        Ok(hits)
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let comments = self.comments.read().await;
        let mut hits: Vec<Comment> = comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        hits.sort_by_key(|c| c.id);
        Ok(hits)
    }
}
