use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes a plaintext password with bcrypt and a per-record random salt.
///
/// Hashing happens exactly once per plaintext, at registration; no other
/// write path touches the stored hash, so a record re-save never re-hashes.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, 12) // bcrypt default cost is 12
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks a plaintext password against a stored bcrypt hash.
///
/// Mismatches and malformed hashes both reduce to `false`; this never
/// errors, so a login path cannot distinguish "wrong password" from
/// "corrupt hash" and leak which one happened.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "Test_password123!";
        let hashed = hash_password(password).unwrap();

        assert!(verify_password(password, &hashed));
        assert!(!verify_password("Wrong_password1!", &hashed));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        // Random salts mean two users with the same password never share a hash
        let password = "Test_password123!";
        let first = hash_password(password).unwrap();
        let second = hash_password(password).unwrap();
        assert_ne!(first, second);

        assert!(verify_password(password, &first));
        assert!(verify_password(password, &second));
    }

    #[test]
    fn test_verify_with_invalid_hash_is_false() {
        assert!(!verify_password("Test_password123!", "invalidhashformat"));
        assert!(!verify_password("Test_password123!", ""));
    }
}
