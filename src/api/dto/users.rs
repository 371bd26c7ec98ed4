/*
 * Responsibility
 * - User profile request/response DTOs
 */
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::dto::auth::looks_like_email;
use crate::error::AppError;
use crate::repos::user_repo::User;
use crate::services::auth::Role;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub about: String,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = HashMap::new();
        if self.first_name.trim().len() < 4 {
            errors.insert("first_name", "first name must be minimum of 4 characters");
        }
        if self.last_name.trim().len() < 4 {
            errors.insert("last_name", "last name must be minimum of 4 characters");
        }
        if !looks_like_email(&self.email) {
            errors.insert("email", "Email address is not valid");
        }
        if self.password.len() < 3 || self.password.len() > 10 {
            errors.insert("password", "Password must be between 3-10 characters");
        }
        if self.about.trim().is_empty() {
            errors.insert("about", "About should not be empty");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub about: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            about: user.about,
            role: user.role,
        }
    }
}
