use std::sync::Arc;

use auth::Authenticator;
use tokio::sync::Semaphore;

use crate::domain::authentication::errors::CredentialError;

/// Runs Argon2 work on the blocking pool with bounded concurrency.
///
/// At most `max_concurrent` hash or verify operations run at once; the rest
/// wait for a permit.
#[derive(Clone)]
pub struct Credentials {
    authenticator: Arc<Authenticator>,
    permits: Arc<Semaphore>,
}

impl Credentials {
    /// Create a credential runner.
    ///
    /// # Arguments
    /// * `authenticator` - Shared authenticator (hasher and signing key)
    /// * `max_concurrent` - Upper bound on simultaneous hash operations
    pub fn new(authenticator: Arc<Authenticator>, max_concurrent: usize) -> Self {
        Self {
            authenticator,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `Hashing` - Argon2 rejected the input
    /// * `Worker` - Blocking task failed or the permit pool closed
    pub async fn hash(&self, password: String) -> Result<String, CredentialError> {
        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CredentialError::Worker("credential semaphore closed".to_string()))?;

        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| CredentialError::Worker(format!("spawn_blocking failed: {e}")))?
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    /// Verify a password against an optional stored hash.
    ///
    /// A missing hash still costs one Argon2 verification.
    ///
    /// # Errors
    /// * `Worker` - Blocking task failed or the permit pool closed
    pub async fn verify(
        &self,
        password: String,
        stored_hash: Option<String>,
    ) -> Result<bool, CredentialError> {
        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CredentialError::Worker("credential semaphore closed".to_string()))?;

        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || {
            authenticator.verify_password(&password, stored_hash.as_deref())
        })
        .await
        .map_err(|e| CredentialError::Worker(format!("spawn_blocking failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use auth::PasswordHasher;

    use super::*;

    fn credentials() -> Credentials {
        let hasher = PasswordHasher::with_cost(1024, 1, 1).unwrap();
        let authenticator =
            Authenticator::new(b"test_secret_key_at_least_32_bytes!", hasher).unwrap();
        Credentials::new(Arc::new(authenticator), 2)
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let credentials = credentials();

        let hash = credentials.hash("longenough1".to_string()).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(credentials
            .verify("longenough1".to_string(), Some(hash.clone()))
            .await
            .unwrap());
        assert!(!credentials
            .verify("wrong-password1".to_string(), Some(hash))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_verify_without_hash_is_false() {
        let credentials = credentials();

        assert!(!credentials
            .verify("anything1".to_string(), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped() {
        let hasher = PasswordHasher::with_cost(1024, 1, 1).unwrap();
        let authenticator =
            Authenticator::new(b"test_secret_key_at_least_32_bytes!", hasher).unwrap();
        let credentials = Credentials::new(Arc::new(authenticator), 0);

        assert!(credentials.hash("longenough1".to_string()).await.is_ok());
    }
}
