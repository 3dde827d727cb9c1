use crate::application_port::AuthError;
use crate::domain_model::Principal;

/// Opaque credential check owned by user management.
#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Fails with `UserNotFound` or `InvalidPassword`.
    async fn verify_credentials(&self, email: &str, password: &str)
    -> Result<Principal, AuthError>;
}
