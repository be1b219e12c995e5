use serde::Deserialize;
use serde::Serialize;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT generation.
///
/// Provides high-level authentication operations by coordinating
/// password hashing and JWT token handling. Built once at startup and shared
/// immutably; the signing secret cannot change afterwards.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    decoy_hash: String,
}

impl Authenticator {
    const DECOY_PASSWORD: &'static str = "decoy-password-never-issued";

    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `password_hasher` - Hasher with the configured cost parameters
    ///
    /// # Returns
    /// Configured Authenticator instance
    ///
    /// # Errors
    /// * `PasswordError` - The decoy hash used for timing equalization could
    ///   not be produced
    pub fn new(jwt_secret: &[u8], password_hasher: PasswordHasher) -> Result<Self, PasswordError> {
        let decoy_hash = password_hasher.hash(Self::DECOY_PASSWORD)?;

        Ok(Self {
            password_hasher,
            jwt_handler: JwtHandler::new(jwt_secret),
            decoy_hash,
        })
    }

    /// Hash a password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Hashed password string
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against an optional stored hash.
    ///
    /// When there is no usable hash (unknown account, or a placeholder that is
    /// not a PHC string) a decoy hash is verified instead, so the caller pays
    /// the same cost either way.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored PHC hash, if any
    ///
    /// # Returns
    /// True only if a real stored hash matched
    pub fn verify_password(&self, password: &str, stored_hash: Option<&str>) -> bool {
        if let Some(hash) = stored_hash {
            if let Ok(matched) = self.password_hasher.verify(password, hash) {
                return matched;
            }
        }

        let _ = self.password_hasher.verify(password, &self.decoy_hash);
        false
    }

    /// Generate JWT token without password verification.
    ///
    /// # Arguments
    /// * `claims` - JWT claims to encode
    ///
    /// # Returns
    /// JWT token string
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn generate_token<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        self.jwt_handler.encode(claims)
    }

    /// Validate and decode JWT token.
    ///
    /// # Arguments
    /// * `token` - JWT token string
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `InvalidToken` - Token validation or decoding failed
    pub fn validate_token<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        self.jwt_handler.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::SessionClaims;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn authenticator() -> Authenticator {
        let hasher = PasswordHasher::with_cost(1024, 1, 1).unwrap();
        Authenticator::new(SECRET, hasher).expect("Failed to build authenticator")
    }

    #[test]
    fn test_verify_password_against_stored_hash() {
        let authenticator = authenticator();
        let hash = authenticator.hash_password("my_password1").unwrap();

        assert!(authenticator.verify_password("my_password1", Some(&hash)));
        assert!(!authenticator.verify_password("wrong_password", Some(&hash)));
    }

    #[test]
    fn test_verify_password_without_stored_hash() {
        let authenticator = authenticator();

        assert!(!authenticator.verify_password(Authenticator::DECOY_PASSWORD, None));
    }

    #[test]
    fn test_verify_password_placeholder_never_matches() {
        let authenticator = authenticator();

        let placeholder = "!INVITED_USER_NO_PASSWORD!";
        assert!(!authenticator.verify_password(placeholder, Some(placeholder)));
        assert!(!authenticator.verify_password("", Some(placeholder)));
    }

    #[test]
    fn test_generate_and_validate_token() {
        let authenticator = authenticator();

        let claims = SessionClaims::for_identity("user123", "provider1", "client")
            .with_customer(Some("customer9"));

        let token = authenticator
            .generate_token(&claims)
            .expect("Failed to generate token");

        let decoded: SessionClaims = authenticator
            .validate_token(&token)
            .expect("Failed to validate token");

        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = authenticator();

        let result = authenticator.validate_token::<SessionClaims>("invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }
}
