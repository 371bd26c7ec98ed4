/*
 * Responsibility
 * - Register/login request DTOs with field-level validate()
 * - Validation failures surface as a field → message map (400)
 */
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::auth::Role;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub about: String,
    pub role: Role,
}

impl RegisterRequest {
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

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = HashMap::new();
        if !looks_like_email(&self.email) {
            errors.insert("email", "Email address is not valid");
        }
        if self.password.is_empty() {
            errors.insert("password", "Password should not be empty");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

// Shape check only; deliverability is not this layer's concern.
pub(crate) fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
