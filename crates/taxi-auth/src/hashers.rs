//! Password hashing and password validation.
//!
//! All hashing runs on `tokio::task::spawn_blocking`. New passwords are
//! hashed with Argon2id; bcrypt hashes are still accepted on verification.
//!
//! # Hashers
//!
//! - [`Argon2Hasher`] - Primary hasher
//! - [`BcryptHasher`] - Accepted for verification of existing hashes
//!
//! # Validators
//!
//! - [`MinimumLengthValidator`] - At least 8 characters
//! - [`CommonPasswordValidator`] - Not a well-known password
//! - [`NumericPasswordValidator`] - Not entirely digits

use async_trait::async_trait;
use taxi_core::TaxiError;

/// Prefix marking an unusable password (an account that cannot log in).
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

/// A password hashing backend.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Returns the algorithm identifier.
    fn algorithm(&self) -> &str;

    /// Hashes a password into a self-describing encoded string.
    async fn hash(&self, password: &str) -> Result<String, TaxiError>;

    /// Returns `true` if `password` matches `hash`.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, TaxiError>;

    /// Returns `true` if the hash should be re-hashed with current parameters.
    fn must_update(&self, hash: &str) -> bool;
}

/// Argon2id password hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    fn algorithm(&self) -> &'static str {
        "argon2"
    }

    async fn hash(&self, password: &str) -> Result<String, TaxiError> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            use argon2::password_hash::{rand_core::OsRng, PasswordHasher as _, SaltString};
            use argon2::Argon2;

            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| TaxiError::InternalServerError(format!("Argon2 hash error: {e}")))
        })
        .await
        .map_err(|e| TaxiError::InternalServerError(format!("Task join error: {e}")))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, TaxiError> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || {
            use argon2::password_hash::{PasswordHash, PasswordVerifier};
            use argon2::Argon2;

            let parsed = PasswordHash::new(&hash)
                .map_err(|e| TaxiError::InternalServerError(format!("Invalid hash: {e}")))?;
            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .map_err(|e| TaxiError::InternalServerError(format!("Task join error: {e}")))?
    }

    fn must_update(&self, hash: &str) -> bool {
        !hash.starts_with("$argon2id$")
    }
}

/// Bcrypt password hasher.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    /// The bcrypt cost parameter.
    pub cost: u32,
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self { cost: 12 }
    }
}

#[async_trait]
impl PasswordHasher for BcryptHasher {
    fn algorithm(&self) -> &'static str {
        "bcrypt"
    }

    async fn hash(&self, password: &str) -> Result<String, TaxiError> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || {
            bcrypt::hash(password, cost)
                .map_err(|e| TaxiError::InternalServerError(format!("Bcrypt hash error: {e}")))
        })
        .await
        .map_err(|e| TaxiError::InternalServerError(format!("Task join error: {e}")))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, TaxiError> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || {
            bcrypt::verify(password, &hash)
                .map_err(|e| TaxiError::InternalServerError(format!("Bcrypt verify error: {e}")))
        })
        .await
        .map_err(|e| TaxiError::InternalServerError(format!("Task join error: {e}")))?
    }

    fn must_update(&self, hash: &str) -> bool {
        // $2b$<cost>$...
        hash.split('$')
            .nth(2)
            .and_then(|cost| cost.parse::<u32>().ok())
            .map_or(true, |cost| cost != self.cost)
    }
}

fn identify_hasher(encoded: &str) -> Option<Box<dyn PasswordHasher>> {
    if encoded.starts_with("$argon2") {
        Some(Box::new(Argon2Hasher))
    } else if encoded.starts_with("$2b$") || encoded.starts_with("$2a$") || encoded.starts_with("$2y$") {
        Some(Box::new(BcryptHasher::default()))
    } else {
        None
    }
}

/// Hashes a password with the preferred hasher (Argon2id).
pub async fn make_password(password: &str) -> Result<String, TaxiError> {
    Argon2Hasher.hash(password).await
}

/// Checks a plaintext password against an encoded hash.
///
/// Unusable hashes never match. An unknown algorithm is an error.
pub async fn check_password(password: &str, hash: &str) -> Result<bool, TaxiError> {
    if !is_password_usable(hash) {
        return Ok(false);
    }

    let hasher = identify_hasher(hash).ok_or_else(|| {
        TaxiError::InternalServerError(format!(
            "Unknown password hashing algorithm for hash: {}",
            hash.chars().take(10).collect::<String>()
        ))
    })?;

    hasher.verify(password, hash).await
}

/// Returns `true` if a stored hash should be replaced by a fresh Argon2id hash.
pub fn must_update_password(hash: &str) -> bool {
    is_password_usable(hash)
        && identify_hasher(hash)
            .map_or(true, |h| h.algorithm() != "argon2" || h.must_update(hash))
}

/// Returns `true` if the hash is a real password (not empty, not `!`-prefixed).
pub fn is_password_usable(hash: &str) -> bool {
    !hash.is_empty() && !hash.starts_with(UNUSABLE_PASSWORD_PREFIX)
}

/// Returns an encoded value that no password matches.
pub fn make_unusable_password() -> String {
    use rand::distributions::{Alphanumeric, DistString};
    format!(
        "{UNUSABLE_PASSWORD_PREFIX}{}",
        Alphanumeric.sample_string(&mut rand::thread_rng(), 40)
    )
}

// ── Password Validators ──────────────────────────────────────────────

/// A password strength rule.
pub trait PasswordValidator: Send + Sync {
    /// Returns an error message if the password breaks the rule.
    fn validate(&self, password: &str) -> Result<(), String>;

    /// Describes the rule for help text.
    fn get_help_text(&self) -> String;
}

/// Rejects passwords shorter than `min_length` characters.
#[derive(Debug, Clone)]
pub struct MinimumLengthValidator {
    pub min_length: usize,
}

impl Default for MinimumLengthValidator {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl PasswordValidator for MinimumLengthValidator {
    fn validate(&self, password: &str) -> Result<(), String> {
        if password.chars().count() < self.min_length {
            Err(format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_length
            ))
        } else {
            Ok(())
        }
    }

    fn get_help_text(&self) -> String {
        format!(
            "Your password must contain at least {} characters.",
            self.min_length
        )
    }
}

/// Rejects well-known passwords, compared case-insensitively.
#[derive(Debug, Clone)]
pub struct CommonPasswordValidator {
    pub common_passwords: Vec<String>,
}

impl Default for CommonPasswordValidator {
    fn default() -> Self {
        Self {
            common_passwords: [
                "password", "password1", "1234", "123456", "12345678", "123456789", "1234567890",
                "qwerty", "qwerty123", "abc123", "111111", "123123", "letmein", "welcome",
                "monkey", "dragon", "iloveyou", "admin", "admin123", "trustno1", "sunshine",
                "princess", "football", "baseball", "master", "shadow", "superman",
                "michael", "passw0rd", "starwars", "whatever", "freedom", "hello123",
                "taxi1234", "driver123",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl PasswordValidator for CommonPasswordValidator {
    fn validate(&self, password: &str) -> Result<(), String> {
        let lower = password.to_lowercase();
        if self.common_passwords.iter().any(|p| p == &lower) {
            Err("This password is too common.".to_string())
        } else {
            Ok(())
        }
    }

    fn get_help_text(&self) -> String {
        "Your password can't be a commonly used password.".to_string()
    }
}

/// Rejects passwords made only of digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericPasswordValidator;

impl PasswordValidator for NumericPasswordValidator {
    fn validate(&self, password: &str) -> Result<(), String> {
        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            Err("This password is entirely numeric.".to_string())
        } else {
            Ok(())
        }
    }

    fn get_help_text(&self) -> String {
        "Your password can't be entirely numeric.".to_string()
    }
}

fn default_validators() -> Vec<Box<dyn PasswordValidator>> {
    vec![
        Box::new(MinimumLengthValidator::default()),
        Box::new(CommonPasswordValidator::default()),
        Box::new(NumericPasswordValidator),
    ]
}

/// Runs every default validator, collecting all messages.
pub fn validate_password(password: &str) -> Result<(), Vec<String>> {
    let errors: Vec<String> = default_validators()
        .iter()
        .filter_map(|v| v.validate(password).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Help text for every default validator.
pub fn password_validators_help_texts() -> Vec<String> {
    default_validators()
        .iter()
        .map(|v| v.get_help_text())
        .collect()
}
