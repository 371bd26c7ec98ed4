/*
 * Responsibility
 * - Allow-list matcher for public routes (patterns, not exact strings)
 * - auth_gate middleware: header extraction → two-phase token check →
 *   identity resolution → install Identity into request extensions
 * - Rejections are typed AppError returns; translation to a response
 *   happens in one place (error.rs), never here
 */
use axum::{
    extract::{OriginalUri, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::Identity;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Public-route matcher. Patterns use matchit syntax (`{param}` segments,
/// `{*rest}` wildcards); trailing slashes are normalized on both sides so
/// `/api/auth/login/` matches a `/api/auth/login` pattern.
pub struct AllowList {
    matcher: matchit::Router<()>,
}

impl AllowList {
    pub fn new(patterns: &[String]) -> anyhow::Result<Self> {
        let mut matcher = matchit::Router::new();
        for pattern in patterns {
            let normalized = normalize(pattern);
            matcher
                .insert(normalized.to_string(), ())
                .map_err(|e| anyhow::anyhow!("invalid allow-list pattern '{pattern}': {e}"))?;
        }
        Ok(Self { matcher })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.at(normalize(path)).is_ok()
    }
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

/// Per-request authentication gate.
///
/// Allow-listed paths pass straight through with no identity installed.
/// Everything else must carry `Authorization: Bearer <token>`; the subject
/// is extracted first, the account is resolved, and the token is then
/// confirmed against that account before the identity is installed.
///
/// The identity lives in the request's own extensions, so it cannot
/// outlive the request or leak into another one sharing the same worker.
pub async fn auth_gate(
    State(state): State<AppState>,
    // Nesting strips the mount prefix from req.uri(); match on the
    // original path so allow-list patterns are written as callers see them.
    OriginalUri(original_uri): OriginalUri,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.allow_list.matches(original_uri.path()) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let Some(token) = auth_header.strip_prefix(BEARER_PREFIX) else {
        return Err(AppError::InvalidAuthHeader(auth_header.to_string()));
    };

    let subject = state.jwt.extract_subject(token)?;

    let account = state
        .users
        .find_by_email(&subject)
        .await
        .map_err(|_| AppError::Internal)?
        .ok_or_else(|| {
            tracing::warn!(subject = %subject, "token subject has no matching account");
            AppError::IdentityNotFound(subject.clone())
        })?;

    if !state.jwt.is_valid_for(token, &account.email)? {
        return Err(AppError::InvalidToken(
            "token subject does not match the resolved account".to_string(),
        ));
    }

    // A second authentication attempt within one request must not
    // overwrite an identity that is already installed.
    if req.extensions().get::<Identity>().is_none() {
        req.extensions_mut().insert(Identity {
            subject: account.email,
            role: account.role,
        });
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_list(patterns: &[&str]) -> AllowList {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        AllowList::new(&patterns).unwrap()
    }

    #[test]
    fn exact_paths_match() {
        let list = allow_list(&["/api/auth/login", "/api/auth/register"]);
        assert!(list.matches("/api/auth/login"));
        assert!(list.matches("/api/auth/register"));
        assert!(!list.matches("/api/users"));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let list = allow_list(&["/api/auth/login"]);
        assert!(list.matches("/api/auth/login/"));
    }

    #[test]
    fn wildcard_patterns_match_subpaths() {
        let list = allow_list(&["/api/auth/{*rest}"]);
        assert!(list.matches("/api/auth/login"));
        assert!(list.matches("/api/auth/register"));
        assert!(!list.matches("/api/users/1"));
    }

    #[test]
    fn param_patterns_match_concrete_segments() {
        let list = allow_list(&["/public/{id}"]);
        assert!(list.matches("/public/42"));
        assert!(!list.matches("/public/42/details"));
    }

    #[test]
    fn invalid_pattern_is_rejected_at_build_time() {
        assert!(AllowList::new(&["/api/{unclosed".to_string()]).is_err());
    }
}
