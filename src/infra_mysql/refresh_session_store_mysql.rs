use super::util::{is_dup_key, uid_as_bytes, uuid_from_bytes};
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

/// `refresh_session` table; see `schema/refresh_session.sql`.
///
/// Every trait method is one statement, so atomicity comes from the server.
pub struct MySqlSessionStore {
    pool: MySqlPool,
}

impl MySqlSessionStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlSessionStore { pool }
    }

    fn backend(e: sqlx::Error) -> SessionStoreError {
        SessionStoreError::Backend(e.to_string())
    }

    fn row_to_session(row: MySqlRow) -> Result<RefreshSession, SessionStoreError> {
        let decode = |e: uuid::Error| SessionStoreError::Backend(e.to_string());

        let id: Vec<u8> = row.try_get("id").map_err(Self::backend)?;
        let token_id: Vec<u8> = row.try_get("token_id").map_err(Self::backend)?;
        let user_id: Vec<u8> = row.try_get("user_id").map_err(Self::backend)?;
        let expires_at: DateTime<Utc> = row.try_get("expires_at").map_err(Self::backend)?;
        let revoked: bool = row.try_get("revoked").map_err(Self::backend)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(Self::backend)?;

        Ok(RefreshSession {
            id: SessionId(uuid_from_bytes(&id).map_err(decode)?),
            token_id: TokenId(uuid_from_bytes(&token_id).map_err(decode)?),
            user_id: UserId(uuid_from_bytes(&user_id).map_err(decode)?),
            expires_at,
            revoked,
            created_at,
        })
    }
}

#[async_trait::async_trait]
impl RefreshSessionStore for MySqlSessionStore {
    async fn create(&self, session: &RefreshSession) -> Result<(), SessionStoreError> {
        sqlx::query(
            r#"
INSERT INTO refresh_session (id, token_id, user_id, expires_at, revoked, created_at)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(session.id.0.as_bytes().as_slice())
        .bind(session.token_id.0.as_bytes().as_slice())
        .bind(uid_as_bytes(&session.user_id))
        .bind(session.expires_at)
        .bind(session.revoked)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                SessionStoreError::Duplicate(session.token_id)
            } else {
                Self::backend(e)
            }
        })?;

        Ok(())
    }

    async fn find_active(
        &self,
        token_id: TokenId,
        now: DateTime<Utc>,
    ) -> Result<RefreshSession, SessionStoreError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, token_id, user_id, expires_at, revoked, created_at
FROM refresh_session
WHERE token_id = ? AND revoked = FALSE AND expires_at > ?
"#,
        )
        .bind(token_id.0.as_bytes().as_slice())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::backend)?;

        row_opt
            .map(Self::row_to_session)
            .transpose()?
            .ok_or(SessionStoreError::NotFound)
    }

    async fn revoke(&self, token_id: TokenId) -> Result<(), SessionStoreError> {
        sqlx::query(
            r#"
UPDATE refresh_session SET revoked = TRUE
WHERE token_id = ?
"#,
        )
        .bind(token_id.0.as_bytes().as_slice())
        .execute(&self.pool)
        .await
        .map_err(Self::backend)?;

        Ok(())
    }

    async fn revoke_all(&self, user_id: UserId) -> Result<u64, SessionStoreError> {
        let result = sqlx::query(
            r#"
UPDATE refresh_session SET revoked = TRUE
WHERE user_id = ? AND revoked = FALSE
"#,
        )
        .bind(uid_as_bytes(&user_id))
        .execute(&self.pool)
        .await
        .map_err(Self::backend)?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let result = sqlx::query(
            r#"
DELETE FROM refresh_session
WHERE expires_at <= ? OR revoked = TRUE
"#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Self::backend)?;

        Ok(result.rows_affected())
    }
}
