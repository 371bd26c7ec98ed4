/*
 * Responsibility
 * - The meaning a repo conveys upward, independent of AppError
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("unique constraint violated: {value}")]
    Conflict { value: String },
}
