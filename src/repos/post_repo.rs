/*
 * Responsibility
 * - Post store collaborator; carries the ownership fact (author_email)
 *   the authorization policy is consulted with
 */
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::repos::error::RepoError;

#[derive(Debug, Clone)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    /// Subject of the owning account; input to owner/admin checks.
    pub author_email: String,
    pub added_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub author_email: String,
}

#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError>;
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;
    async fn update(&self, id: i64, title: String, content: String)
    -> Result<Option<Post>, RepoError>;
    async fn delete(&self, id: i64) -> Result<Option<Post>, RepoError>;
    async fn list(&self) -> Result<Vec<Post>, RepoError>;
    async fn search(&self, keyword: &str) -> Result<Vec<Post>, RepoError>;
    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Post>, RepoError>;
}

#[derive(Default)]
pub struct InMemoryPostRepo {
    posts: RwLock<HashMap<i64, Post>>,
    next_id: AtomicI64,
}

impl InMemoryPostRepo {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl PostRepo for InMemoryPostRepo {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let stored = Post {
            id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            author_email: post.author_email,
            added_date: Utc::now(),
        };
        posts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: i64,
        title: String,
        content: String,
    ) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&id) {
            Some(post) => {
                post.title = title;
                post.content = content;
                Ok(Some(post.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.write().await.remove(&id))
    }

    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        let mut all: Vec<Post> = posts.values().cloned().collect();
        all.sort_by_key(|p| p.id);
        Ok(all)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        let mut hits: Vec<Post> = posts
            .values()
            .filter(|p| p.title.contains(keyword))
            .cloned()
            .collect();
        hits.sort_by_key(|p| p.id);
        Ok(hits)
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        let mut hits: Vec<Post> = posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        hits.sort_by_key(|p| p.id);
        Ok(hits)
    }
}
