//! Field validators run after a value has been cleaned.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Number of characters in a license number.
pub const LICENSE_NUMBER_LENGTH: usize = 8;

/// Checks one constraint on a cleaned string value.
pub trait Validator: Send + Sync + fmt::Debug {
    /// Returns the error message when `value` breaks the constraint.
    fn validate(&self, value: &str) -> Result<(), String>;

    /// A short identifier for logging.
    fn name(&self) -> &str;
}

/// Validates a driver's license number.
///
/// Rules are checked in order and only the first failure is reported:
/// exactly 8 characters, then two uppercase ASCII letters, then six ASCII
/// letters or digits.
pub fn validate_license_number(license_number: &str) -> Result<(), String> {
    let chars: Vec<char> = license_number.chars().collect();

    if chars.len() != LICENSE_NUMBER_LENGTH {
        return Err(format!(
            "license number should consist of {LICENSE_NUMBER_LENGTH} characters"
        ));
    }
    if !chars[..2].iter().all(char::is_ascii_uppercase) {
        return Err("first 2 characters should be uppercase letters".to_string());
    }
    if !chars[2..].iter().all(char::is_ascii_alphanumeric) {
        return Err("last 6 characters should be alphanumeric".to_string());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LicenseNumberValidator;

impl Validator for LicenseNumberValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        validate_license_number(value)
    }

    fn name(&self) -> &str {
        "LicenseNumberValidator"
    }
}

static USERNAME_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[\w.@+-]+\z").ok());

/// Usernames may contain letters, digits and `@ . + - _`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsernameValidator;

impl Validator for UsernameValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        let valid = USERNAME_RE.as_ref().is_some_and(|re| re.is_match(value));
        if valid {
            Ok(())
        } else {
            Err(
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                    .to_string(),
            )
        }
    }

    fn name(&self) -> &str {
        "UsernameValidator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_license_numbers() {
        for ok in ["ABC12345", "AB123456", "ZZabcdef", "QWERTYUI", "AB0000zz"] {
            assert!(validate_license_number(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_license_wrong_length() {
        for bad in ["", "ABC1234", "ABC123456", "AB12345678"] {
            assert_eq!(
                validate_license_number(bad).unwrap_err(),
                "license number should consist of 8 characters",
                "{bad}"
            );
        }
    }

    #[test]
    fn test_license_length_counts_characters_not_bytes() {
        // 8 characters, 9 bytes: passes the length rule, fails the letters rule.
        assert_eq!(
            validate_license_number("ÄB123456").unwrap_err(),
            "first 2 characters should be uppercase letters"
        );
    }

    #[test]
    fn test_license_prefix_must_be_uppercase() {
        for bad in ["ab123456", "A1234567", "1B123456", "aB123456"] {
            assert_eq!(
                validate_license_number(bad).unwrap_err(),
                "first 2 characters should be uppercase letters",
                "{bad}"
            );
        }
    }

    #[test]
    fn test_license_suffix_must_be_alphanumeric() {
        for bad in ["AB12345!", "AB 12345", "AB-12345", "AB12345é"] {
            assert_eq!(
                validate_license_number(bad).unwrap_err(),
                "last 6 characters should be alphanumeric",
                "{bad}"
            );
        }
    }

    #[test]
    fn test_license_rule_order() {
        // Too short and lowercase: length is reported first.
        assert_eq!(
            validate_license_number("ab1").unwrap_err(),
            "license number should consist of 8 characters"
        );
        // Lowercase prefix and bad suffix: prefix is reported first.
        assert_eq!(
            validate_license_number("ab12345!").unwrap_err(),
            "first 2 characters should be uppercase letters"
        );
    }

    #[test]
    fn test_username_validator() {
        let v = UsernameValidator;
        for ok in ["test_user", "a.b@c+d-e", "user1"] {
            assert!(v.validate(ok).is_ok(), "{ok}");
        }
        for bad in ["with space", "semi;colon", "slash/", "new\n"] {
            assert!(v.validate(bad).is_err(), "{bad:?}");
        }
    }
}
