//! Password policy for new secrets.

use warden_core::config::AuthConfig;
use warden_core::error::AppError;

/// Minimum zxcvbn score accepted when strength checks are on.
const MIN_SCORE: zxcvbn::Score = zxcvbn::Score::Three;

/// Checks new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    check_strength: bool,
}

impl PasswordValidator {
    /// Create a validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            check_strength: config.password_check_strength,
        }
    }

    /// Validate `password`, using `context` (email, name) as known words
    /// for the strength estimate.
    ///
    /// Returns the first violation found.
    pub fn validate(&self, password: &str, context: &[&str]) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if !self.check_strength {
            return Ok(());
        }

        let classes = [
            password.chars().any(char::is_uppercase),
            password.chars().any(char::is_lowercase),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_alphanumeric()),
        ];
        if classes.iter().any(|present| !present) {
            return Err(AppError::validation(
                "Password must mix upper and lower case letters, digits and symbols",
            ));
        }

        if zxcvbn::zxcvbn(password, context).score() < MIN_SCORE {
            return Err(AppError::validation(
                "Password is too easy to guess. Please choose a stronger one.",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(check_strength: bool) -> PasswordValidator {
        PasswordValidator::new(&AuthConfig {
            password_min_length: 8,
            password_check_strength: check_strength,
            ..AuthConfig::default()
        })
    }

    #[test]
    fn test_default_policy_only_rejects_empty() {
        let validator = PasswordValidator::new(&AuthConfig::default());
        assert!(validator.validate("pw", &["a@x.com", "Ann"]).is_ok());
        assert!(validator.validate("", &[]).is_err());
    }

    #[test]
    fn test_min_length() {
        let err = validator(false).validate("short", &[]).unwrap_err();
        assert!(err.message.contains("at least 8"));
        assert!(validator(false).validate("longenough", &[]).is_ok());
    }

    #[test]
    fn test_character_classes() {
        assert!(validator(true).validate("alllowercase-9", &[]).is_err());
    }

    #[test]
    fn test_strong_password_passes() {
        assert!(
            validator(true)
                .validate("Quartz-Lantern-91-Velvet", &["ann@example.com"])
                .is_ok()
        );
    }
}
