/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Clone is cheap: everything inside is Arc'd
 */
use std::sync::Arc;

use crate::middleware::auth::AllowList;
use crate::repos::{comment_repo::CommentRepo, post_repo::PostRepo, user_repo::UserRepo};
use crate::services::auth::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub posts: Arc<dyn PostRepo>,
    pub comments: Arc<dyn CommentRepo>,
    pub jwt: Arc<JwtService>,
    pub allow_list: Arc<AllowList>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepo>,
        posts: Arc<dyn PostRepo>,
        comments: Arc<dyn CommentRepo>,
        jwt: Arc<JwtService>,
        allow_list: Arc<AllowList>,
    ) -> Self {
        Self {
            users,
            posts,
            comments,
            jwt,
            allow_list,
        }
    }
}
