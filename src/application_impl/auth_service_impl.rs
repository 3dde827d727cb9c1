use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Login, single-use refresh rotation and logout over a refresh session store.
///
/// Holds no locks of its own: concurrent calls are only as serialised as the
/// store's individual operations.
pub struct RealAuthService {
    credential_verifier: Arc<dyn CredentialVerifier>,
    token_codec: Arc<dyn TokenCodec>,
    session_store: Arc<dyn RefreshSessionStore>,
    clock: Arc<dyn Clock>,
    revoke_policy: RevokePolicy,
}

impl RealAuthService {
    pub fn new(
        credential_verifier: Arc<dyn CredentialVerifier>,
        token_codec: Arc<dyn TokenCodec>,
        session_store: Arc<dyn RefreshSessionStore>,
        clock: Arc<dyn Clock>,
        revoke_policy: RevokePolicy,
    ) -> Self {
        Self {
            credential_verifier,
            token_codec,
            session_store,
            clock,
            revoke_policy,
        }
    }

    async fn issue_pair(&self, user_id: UserId) -> Result<AuthTokens, AuthError> {
        let (access_token, access_exp) = self.token_codec.issue_access_token(user_id)?;
        let refresh = self.token_codec.issue_refresh_token(user_id)?;

        let session = RefreshSession::new(
            refresh.token_id,
            user_id,
            refresh.expires_at,
            self.clock.now(),
        );
        self.session_store
            .create(&session)
            .await
            .inspect_err(|e| {
                if let SessionStoreError::Duplicate(token_id) = e {
                    error!(%token_id, "refresh token id collided with an existing session");
                }
            })?;

        Ok(AuthTokens {
            access_token,
            refresh_token: refresh.token,
            access_token_expires_at: access_exp,
            refresh_token_expires_at: refresh.expires_at,
        })
    }

    async fn revoke_consumed(&self, token_id: TokenId) -> Result<(), AuthError> {
        match self.session_store.revoke(token_id).await {
            Ok(()) => Ok(()),
            Err(e) => match self.revoke_policy {
                RevokePolicy::BestEffort => {
                    warn!(%token_id, error = %e, "failed to revoke consumed refresh session");
                    Ok(())
                }
                RevokePolicy::Strict => Err(AuthError::Store(e.to_string())),
            },
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput { email, password } = request;

        let principal = self
            .credential_verifier
            .verify_credentials(&email, &password)
            .await?;

        let tokens = self.issue_pair(principal.id).await?;
        debug!(user_id = %principal.id, "login issued new session");

        Ok(LoginResult {
            user_id: principal.id,
            tokens,
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let claims = self.token_codec.validate(refresh_token, TokenKind::Refresh)?;

        let session = self
            .session_store
            .find_active(claims.jti, self.clock.now())
            .await?;
        if session.user_id != claims.sub {
            warn!(token_id = %claims.jti, "refresh session owner does not match token subject");
            return Err(AuthError::InvalidToken);
        }

        self.revoke_consumed(session.token_id).await?;

        let tokens = self.issue_pair(claims.sub).await?;
        debug!(user_id = %claims.sub, consumed = %claims.jti, "refresh session rotated");
        Ok(tokens)
    }

    async fn logout(&self, user_id: UserId) -> Result<(), AuthError> {
        let revoked = self.session_store.revoke_all(user_id).await?;
        debug!(%user_id, revoked, "logout revoked sessions");
        Ok(())
    }

    async fn validate_access_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.token_codec.validate(token, TokenKind::Access)
    }
}
