use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::Digest;
use sha2::Sha256;

use super::errors::InvitationTokenError;

/// Plaintext one-time invitation token.
///
/// Only ever held in memory on its way to the delivery channel or when a
/// holder presents it back. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct InvitationToken(String);

impl InvitationToken {
    /// Bytes of randomness behind every token (256 bits).
    pub const ENTROPY_BYTES: usize = 32;

    /// Generate a fresh token from the operating system RNG.
    ///
    /// # Returns
    /// URL-safe, unpadded base64 token
    ///
    /// # Errors
    /// * `RandomnessUnavailable` - The OS RNG could not be read
    pub fn generate() -> Result<Self, InvitationTokenError> {
        let mut bytes = [0u8; Self::ENTROPY_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| InvitationTokenError::RandomnessUnavailable(e.to_string()))?;

        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Wrap a token presented by its holder.
    pub fn presented(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// One-way digest stored in place of the token (lower-case hex SHA-256).
    pub fn digest(&self) -> String {
        format!("{:x}", Sha256::digest(self.0.as_bytes()))
    }

    /// Plaintext value, for handing to the delivery channel.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for InvitationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InvitationToken(<redacted>)")
    }
}
