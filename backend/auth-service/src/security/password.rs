/// Password hashing and verification using bcrypt
use crate::error::{AuthError, Result};

/// bcrypt work factor. 12 keeps a single hash around 250ms on current
/// hardware, slow enough to blunt offline guessing.
pub const HASH_COST: u32 = 12;

/// bcrypt silently truncates input beyond this bound, so longer passwords
/// are rejected up front instead of being weakened behind the caller's back.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password with bcrypt and a per-password random salt.
///
/// ## Errors
///
/// - `PasswordTooLong` when the input exceeds 72 bytes (checked before
///   hashing, deterministic)
/// - `Internal` when the hashing operation itself fails
pub fn hash_password(password: &str) -> Result<String> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::PasswordTooLong);
    }

    bcrypt::hash(password, HASH_COST)
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its stored digest.
///
/// A mismatch is `Ok(false)`, never an error; only a corrupt digest or a
/// library fault produces `Err`.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| AuthError::Internal(format!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cost 4 is the bcrypt minimum; tests would crawl at the production cost.
    fn quick_hash(password: &str) -> String {
        bcrypt::hash(password, 4).unwrap()
    }

    #[test]
    fn verify_accepts_matching_password() {
        let hash = quick_hash("Passw0rd!");
        assert!(verify_password("Passw0rd!", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = quick_hash("Passw0rd!");
        assert!(!verify_password("passw0rd!", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(quick_hash("Passw0rd!"), quick_hash("Passw0rd!"));
    }

    #[test]
    fn rejects_password_over_72_bytes() {
        let long = "A1!".repeat(25); // 75 bytes
        assert!(matches!(
            hash_password(&long),
            Err(AuthError::PasswordTooLong)
        ));
    }

    #[test]
    fn accepts_password_at_72_bytes() {
        let exact = "Aa1!".repeat(18); // 72 bytes
        assert_eq!(exact.len(), 72);
        assert!(hash_password(&exact).is_ok());
    }

    #[test]
    fn byte_length_not_char_length_is_the_bound() {
        // 38 chars but 74 bytes in UTF-8
        let wide = "Ü".repeat(36) + "a1";
        assert!(wide.len() > MAX_PASSWORD_BYTES);
        assert!(matches!(
            hash_password(&wide),
            Err(AuthError::PasswordTooLong)
        ));
    }

    #[test]
    fn verify_errors_on_corrupt_digest() {
        assert!(verify_password("Passw0rd!", "not-a-bcrypt-digest").is_err());
    }
}
