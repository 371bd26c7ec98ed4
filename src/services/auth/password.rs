//! Password digests for the account store.
//!
//! SHA-256 hex digests, compared on login. The login flow's hashing
//! parameters are not a contract of this service; swapping the digest
//! function does not touch the gate or the policy.
use sha2::{Digest, Sha256};

pub fn digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify(password: &str, stored_digest: &str) -> bool {
    digest(password) == stored_digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_round_trips_on_verify() {
        let d = digest("secret-password");
        assert!(verify("secret-password", &d));
        assert!(!verify("other-password", &d));
    }
}
