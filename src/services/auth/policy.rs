/*
 * Responsibility
 * - Role / Identity domain types shared by the gate, the repos and the handlers
 * - Pure authorization predicates consulted by resource operations
 * - No I/O here; ownership facts are passed in per call
 */
use serde::{Deserialize, Serialize};

/// Closed set of roles. Kept as an enum so a typo'd role string cannot
/// grant or deny anything at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_USER")]
    User,
}

/// The identity resolved for the current request: token subject (an email)
/// plus the role loaded from the account store.
///
/// Installed into the request extensions by the authentication gate and
/// read back through the `CurrentUser` extractor. Immutable for the
/// lifetime of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub role: Role,
}

pub fn is_admin(identity: &Identity) -> bool {
    matches!(identity.role, Role::Admin)
}

/// Exact, case-sensitive subject comparison. The account store does no
/// case folding either, so both layers agree on identifier equality.
pub fn is_same_subject(subject_a: &str, subject_b: &str) -> bool {
    subject_a == subject_b
}

pub fn is_owner_or_admin(identity: &Identity, owner_subject: &str) -> bool {
    is_admin(identity) || is_same_subject(&identity.subject, owner_subject)
}
