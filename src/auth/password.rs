use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::{distributions::Alphanumeric, rngs::OsRng, thread_rng, Rng};

use super::AuthError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const TEMPORARY_PASSWORD_LENGTH: usize = 12;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// A malformed stored hash counts as a mismatch
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Unparseable password hash: {}", e);
            false
        }
    }
}

pub fn generate_temporary_password() -> String {
    let mut rng = thread_rng();
    std::iter::repeat(())
        .map(|_| rng.sample(Alphanumeric) as char)
        .take(TEMPORARY_PASSWORD_LENGTH)
        .collect()
}

/// Length rule shared by self-service changes, admin resets and the CLI
pub fn validate_new_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn temporary_passwords_are_alphanumeric_and_long_enough() {
        let password = generate_temporary_password();
        assert_eq!(password.len(), TEMPORARY_PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(validate_new_password(&password).is_ok());
        assert_ne!(password, generate_temporary_password());
    }

    #[test]
    fn enforces_minimum_length() {
        assert!(validate_new_password("short").is_err());
        assert!(validate_new_password("12345678").is_ok());
    }
}
