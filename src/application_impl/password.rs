use crate::application_port::AuthError;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordVerifier;

impl Argon2PasswordVerifier {
    /// Produces a PHC string with a fresh salt, suitable for `users.password_hash`.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("hash error: {e}")))?
            .to_string();
        Ok(hash)
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::Internal(format!("invalid PHC hash: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Internal(format!("verify error: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(password: &str) -> String {
        Argon2PasswordVerifier.hash_password(password).expect("hash")
    }

    #[test]
    fn matching_password_verifies() {
        let stored = hash("correct horse");

        assert!(
            Argon2PasswordVerifier
                .verify_password("correct horse", &stored)
                .expect("verify")
        );
    }

    #[test]
    fn wrong_password_is_false_not_error() {
        let stored = hash("correct horse");

        assert!(
            !Argon2PasswordVerifier
                .verify_password("battery staple", &stored)
                .expect("verify")
        );
    }

    #[test]
    fn malformed_hash_is_internal_error() {
        let err = Argon2PasswordVerifier
            .verify_password("anything", "not-a-phc-string")
            .expect_err("malformed");

        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash("same"), hash("same"));
    }
}
