use super::util::uuid_from_bytes;
use crate::application_impl::Argon2PasswordVerifier;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

#[derive(Debug, Clone)]
struct CredentialsRecord {
    user_id: UserId,
    password_hash: String,
    email_verified: bool,
}

/// Reads the user-management `users` table; never writes to it.
pub struct MySqlCredentialVerifier {
    pool: MySqlPool,
    hasher: Argon2PasswordVerifier,
}

impl MySqlCredentialVerifier {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlCredentialVerifier {
            pool,
            hasher: Argon2PasswordVerifier,
        }
    }

    fn row_to_record(row: MySqlRow) -> Result<CredentialsRecord, AuthError> {
        let user_id_bytes: Vec<u8> = row
            .try_get("id")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let user_id =
            UserId(uuid_from_bytes(&user_id_bytes).map_err(|e| AuthError::Store(e.to_string()))?);

        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let email_verified: bool = row
            .try_get("email_verified")
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(CredentialsRecord {
            user_id,
            password_hash,
            email_verified,
        })
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<CredentialsRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, password_hash, email_verified
FROM users
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for MySqlCredentialVerifier {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, AuthError> {
        let rec = self
            .get_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.hasher.verify_password(password, &rec.password_hash)? {
            return Err(AuthError::InvalidPassword);
        }

        Ok(Principal {
            id: rec.user_id,
            email_verified: rec.email_verified,
        })
    }
}
