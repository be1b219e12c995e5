use crate::domain::invitation::errors::WeakPasswordError;

/// Minimum strength rules for passwords set through an invitation.
///
/// Passwords are checked as given; surrounding whitespace is not trimmed.
pub struct PasswordPolicy;

impl PasswordPolicy {
    pub const MIN_LENGTH: usize = 8;
    pub const MAX_LENGTH: usize = 128;

    /// Check a candidate password.
    ///
    /// # Errors
    /// * `WeakPasswordError` - First rule the password breaks
    pub fn check(password: &str) -> Result<(), WeakPasswordError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(WeakPasswordError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if length > Self::MAX_LENGTH {
            return Err(WeakPasswordError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if password.trim().is_empty() {
            return Err(WeakPasswordError::Blank);
        }
        if !password.chars().any(char::is_alphabetic) {
            return Err(WeakPasswordError::MissingLetter);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(WeakPasswordError::MissingDigit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_reasonable_password() {
        assert_eq!(PasswordPolicy::check("longenough1"), Ok(()));
        assert_eq!(PasswordPolicy::check(" spaced out 42 "), Ok(()));
    }

    #[test]
    fn test_rejects_short() {
        assert_eq!(
            PasswordPolicy::check("short"),
            Err(WeakPasswordError::TooShort { min: 8 })
        );
    }

    #[test]
    fn test_rejects_long() {
        let password = format!("a1{}", "x".repeat(127));
        assert_eq!(
            PasswordPolicy::check(&password),
            Err(WeakPasswordError::TooLong { max: 128 })
        );
    }

    #[test]
    fn test_rejects_blank() {
        assert_eq!(
            PasswordPolicy::check("          "),
            Err(WeakPasswordError::Blank)
        );
    }

    #[test]
    fn test_requires_letter_and_digit() {
        assert_eq!(
            PasswordPolicy::check("12345678"),
            Err(WeakPasswordError::MissingLetter)
        );
        assert_eq!(
            PasswordPolicy::check("abcdefgh"),
            Err(WeakPasswordError::MissingDigit)
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 7 characters, 12 bytes
        assert_eq!(
            PasswordPolicy::check("ñññññ1a"),
            Err(WeakPasswordError::TooShort { min: 8 })
        );
    }
}
