/*
 * Responsibility
 * - URL structure under /api
 * - The auth gate is layered over the whole table; public routes are
 *   carved out by the gate's allow-list, not by route placement
 */
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::api::handlers::{auth, comments, posts, users};
use crate::middleware::auth::auth_gate;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/users", get(users::list_users))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{user_id}/posts", get(users::user_posts))
        .route("/users/{user_id}/comments", get(users::user_comments))
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/{post_id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/posts/search/{keyword}", get(posts::search_posts))
        .route("/posts/{post_id}/comments", get(posts::post_comments))
        .route("/comments", post(comments::create_comment))
        .route(
            "/comments/{comment_id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .layer(from_fn_with_state(state, auth_gate))
}
