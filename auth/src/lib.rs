//! Authentication utilities library
//!
//! Provides the security primitives shared by the field-service backend:
//! - Password hashing (Argon2id, cost-tunable)
//! - Session tokens (HS256 JWT, algorithm pinned)
//! - One-time invitation tokens (256-bit random, stored as SHA-256 digests)
//! - An authenticator that owns the signing key and hasher
//!
//! Nothing in here performs I/O; services adapt these implementations behind
//! their own ports.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{JwtHandler, SessionClaims};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = SessionClaims::for_identity("user123", "provider1", "admin");
//! let token = handler.encode(&claims).unwrap();
//! let decoded: SessionClaims = handler.decode(&token).unwrap();
//! assert_eq!(decoded, claims);
//! ```
//!
//! ## Invitation Tokens
//! ```
//! use auth::InvitationToken;
//!
//! let token = InvitationToken::generate().unwrap();
//! let stored = token.digest();
//! assert_eq!(InvitationToken::presented(token.expose()).digest(), stored);
//! ```

pub mod authenticator;
pub mod invitation;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use invitation::InvitationToken;
pub use invitation::InvitationTokenError;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SessionClaims;
pub use jwt::SESSION_TTL_HOURS;
pub use password::PasswordError;
pub use password::PasswordHasher;
