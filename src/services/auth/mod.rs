pub mod jwt;
pub mod password;
pub mod policy;

pub use jwt::{JwtError, JwtService, TokenClaims};
pub use policy::{Identity, Role};
