pub mod comment_repo;
pub mod error;
pub mod post_repo;
pub mod user_repo;
