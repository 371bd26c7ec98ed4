/*
 * Responsibility
 * - Bearer token verification: signature, expiry, subject claim
 * - Token issuance for the login/register flow (HS256, shared secret)
 * - Maps jsonwebtoken errors into the crate's own JwtError kinds
 */
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::auth::policy::Role;

/// Errors returned by token verification. Each kind maps to its own
/// response message at the boundary, so callers never have to inspect
/// jsonwebtoken internals.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("{0}")]
    Malformed(String),
    #[error("{0}")]
    BadSignature(String),
    #[error("{0}")]
    Expired(String),
    #[error("{0}")]
    Invalid(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        let message = e.to_string();
        match e.kind() {
            ErrorKind::InvalidSignature => JwtError::BadSignature(message),
            ErrorKind::ExpiredSignature => JwtError::Expired(message),
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => JwtError::Malformed(message),
            _ => JwtError::Invalid(message),
        }
    }
}

/// Signed token payload: subject (account email), role at issuance time,
/// issued-at and expiry as unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub role: Role,
    pub iat: u64,
    pub exp: u64,
}

/// Verifier/issuer over a single shared HS256 secret.
///
/// Verification is a pure function of (token, secret, current time): no
/// side effects, deterministic, safe to call from the gate on every
/// request.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl JwtService {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry must be strictly in the future; no clock leeway.
        validation.leeway = 0;
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    /// Full validation: parse, check signature and expiry, require a
    /// non-empty subject.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, JwtError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        if data.claims.sub.trim().is_empty() {
            return Err(JwtError::Invalid("empty 'sub' claim".to_string()));
        }
        Ok(data.claims)
    }

    /// First phase of the gate's two-phase check: surface the subject so
    /// the account can be looked up before the token is confirmed against
    /// that account.
    pub fn extract_subject(&self, token: &str) -> Result<String, JwtError> {
        self.verify(token).map(|claims| claims.sub)
    }

    /// Second phase: re-validate the token against the resolved account's
    /// subject. Returns false when the token was issued for someone else.
    pub fn is_valid_for(&self, token: &str, subject: &str) -> Result<bool, JwtError> {
        let claims = self.verify(token)?;
        Ok(claims.sub == subject)
    }

    /// Issue a token for an authenticated subject.
    pub fn sign(&self, subject: &str, role: Role) -> Result<String, JwtError> {
        let now = Utc::now().timestamp() as u64;
        let claims = TokenClaims {
            sub: subject.to_string(),
            role,
            iat: now,
            exp: now + self.ttl_seconds,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";
    const SUBJECT: &str = "a@x.com";

    fn service() -> JwtService {
        JwtService::new(SECRET, 600)
    }

    fn sign_with_exp(sub: &str, exp: u64) -> String {
        let now = Utc::now().timestamp() as u64;
        let claims = TokenClaims {
            sub: sub.to_string(),
            role: Role::User,
            iat: now,
            exp,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verify_accepts_fresh_token_and_returns_claims() {
        let svc = service();
        let token = svc.sign(SUBJECT, Role::User).unwrap();

        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, SUBJECT);
        assert_eq!(claims.role, Role::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let svc = service();
        let past = Utc::now().timestamp() as u64 - 60;
        let token = sign_with_exp(SUBJECT, past);

        match svc.verify(&token) {
            Err(JwtError::Expired(_)) => {}
            other => panic!("expected Expired, got {other:?}"),
        }
    }

    #[test]
    fn verify_rejects_tampered_signature() {
        let svc = service();
        let token = svc.sign(SUBJECT, Role::User).unwrap();

        // Flip the last signature character; stays valid base64url but no
        // longer matches.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        match svc.verify(&tampered) {
            Err(JwtError::BadSignature(_)) => {}
            other => panic!("expected BadSignature, got {other:?}"),
        }
    }

    #[test]
    fn verify_rejects_garbage_as_malformed() {
        match service().verify("not-a-jwt") {
            Err(JwtError::Malformed(_)) => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn verify_rejects_empty_subject() {
        let svc = service();
        let exp = Utc::now().timestamp() as u64 + 600;
        let token = sign_with_exp("", exp);

        match svc.verify(&token) {
            Err(JwtError::Invalid(_)) => {}
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn is_valid_for_checks_the_resolved_subject() {
        let svc = service();
        let token = svc.sign(SUBJECT, Role::User).unwrap();

        assert!(svc.is_valid_for(&token, SUBJECT).unwrap());
        assert!(!svc.is_valid_for(&token, "b@x.com").unwrap());
    }
}
