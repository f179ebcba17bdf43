//! Password hashing for the credential store.

use thiserror::Error;

/// Hashing or verification failure inside the bcrypt library.
#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(#[from] bcrypt::BcryptError);

/// Hash a plaintext password with the default bcrypt cost.
///
/// # Errors
/// Returns [`PasswordError`] when bcrypt fails internally.
pub fn hash(password: &str) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Check a plaintext password against a stored hash.
///
/// # Errors
/// Returns [`PasswordError`] when the stored hash cannot be parsed.
pub fn verify(password: &str, hashed: &str) -> Result<bool, PasswordError> {
    Ok(bcrypt::verify(password, hashed)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_and_rejects_wrong_password() {
        let hashed = hash("hunter2").expect("hash");
        assert!(verify("hunter2", &hashed).expect("verify"));
        assert!(!verify("hunter3", &hashed).expect("verify"));
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify("hunter2", "not-a-bcrypt-hash").is_err());
    }
}
