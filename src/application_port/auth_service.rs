use crate::domain_model::{TokenId, TokenKind, UserId};
use crate::domain_port::SessionStoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("user not found")]
    UserNotFound,
    #[error("invalid password")]
    InvalidPassword,
    #[error("token invalid")]
    InvalidToken,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SessionStoreError> for AuthError {
    fn from(error: SessionStoreError) -> Self {
        match error {
            SessionStoreError::NotFound => AuthError::InvalidToken,
            other => AuthError::Store(other.to_string()),
        }
    }
}

/// What rotation does when revoking the consumed session fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevokePolicy {
    /// Log and continue; the old token stays replayable until reaped or revoked.
    #[default]
    BestEffort,
    /// Fail the rotation with `Store`.
    Strict,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user_id: UserId,
    pub tokens: AuthTokens,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Claim set shared by access and refresh tokens. Only `kind` and the
/// signing secret tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub jti: TokenId,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedRefresh {
    pub token: RefreshToken,
    pub token_id: TokenId,
    pub expires_at: DateTime<Utc>,
}

pub trait TokenCodec: Send + Sync {
    fn issue_access_token(&self, user: UserId) -> Result<(AccessToken, DateTime<Utc>), AuthError>;

    /// Mints a refresh token. Persisting the matching session is the caller's job.
    fn issue_refresh_token(&self, user: UserId) -> Result<IssuedRefresh, AuthError>;

    /// Checks signature, expiry and the exact kind tag.
    fn validate(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;
    async fn logout(&self, user_id: UserId) -> Result<(), AuthError>;
    /// Signature, expiry and kind only; never touches the session store.
    async fn validate_access_token(&self, token: &str) -> Result<TokenClaims, AuthError>;
}
