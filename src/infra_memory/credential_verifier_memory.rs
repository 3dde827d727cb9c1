use crate::application_impl::Argon2PasswordVerifier;
use crate::application_port::AuthError;
use crate::domain_model::*;
use crate::domain_port::CredentialVerifier;
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct StoredUser {
    principal: Principal,
    password_hash: String,
}

/// Users keyed by email with Argon2 PHC hashes, for the memory backend.
#[derive(Debug, Default)]
pub struct MemoryCredentialVerifier {
    users: DashMap<String, StoredUser>,
    hasher: Argon2PasswordVerifier,
}

impl MemoryCredentialVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, email: impl Into<String>, principal: Principal, password_hash: impl Into<String>) {
        self.users.insert(
            email.into(),
            StoredUser {
                principal,
                password_hash: password_hash.into(),
            },
        );
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for MemoryCredentialVerifier {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, AuthError> {
        let user = self
            .users
            .get(email)
            .map(|u| u.clone())
            .ok_or(AuthError::UserNotFound)?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidPassword);
        }
        Ok(user.principal)
    }
}
