use super::claims_codec::{decode_claims, encode_claims};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::Clock;
use anyhow::{anyhow, bail};
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct JwtConfig {
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// HS256 issuer for access and refresh tokens, each kind under its own secret.
pub struct JwtTokenIssuer {
    cfg: JwtConfig,
    access_ttl: TimeDelta,
    refresh_ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl JwtTokenIssuer {
    /// Rejects configurations that would mint unusable or confusable tokens.
    pub fn try_new(cfg: JwtConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        if cfg.access_secret.is_empty() || cfg.refresh_secret.is_empty() {
            bail!("signing secrets must not be empty");
        }
        if cfg.access_secret == cfg.refresh_secret {
            bail!("access and refresh signing secrets must differ");
        }
        let access_ttl = Self::ttl(cfg.access_ttl, "access")?;
        let refresh_ttl = Self::ttl(cfg.refresh_ttl, "refresh")?;

        Ok(JwtTokenIssuer {
            cfg,
            access_ttl,
            refresh_ttl,
            clock,
        })
    }

    fn ttl(ttl: Duration, name: &str) -> anyhow::Result<TimeDelta> {
        if ttl.as_secs() == 0 {
            bail!("{name} token ttl must be at least one second, got {ttl:?}");
        }
        TimeDelta::from_std(ttl).map_err(|e| anyhow!("{name} token ttl out of range: {e}"))
    }

    fn sign(
        &self,
        user: UserId,
        kind: TokenKind,
    ) -> Result<(String, TokenId, DateTime<Utc>), AuthError> {
        // JWT timestamps are whole seconds; keep the returned expiry identical.
        let iat = self.clock.now().trunc_subsecs(0);
        let (ttl, secret) = match kind {
            TokenKind::Access => (self.access_ttl, &self.cfg.access_secret),
            TokenKind::Refresh => (self.refresh_ttl, &self.cfg.refresh_secret),
        };
        let exp = (iat + ttl).trunc_subsecs(0);
        let jti = TokenId::generate();

        let claims = TokenClaims {
            sub: user,
            kind,
            jti,
            iat: iat.timestamp(),
            exp: exp.timestamp(),
        };
        let token = encode_claims(&claims, secret)?;
        Ok((token, jti, exp))
    }
}

impl TokenCodec for JwtTokenIssuer {
    fn issue_access_token(&self, user: UserId) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let (token, _, exp) = self.sign(user, TokenKind::Access)?;
        Ok((AccessToken(token), exp))
    }

    fn issue_refresh_token(&self, user: UserId) -> Result<IssuedRefresh, AuthError> {
        let (token, token_id, expires_at) = self.sign(user, TokenKind::Refresh)?;
        Ok(IssuedRefresh {
            token: RefreshToken(token),
            token_id,
            expires_at,
        })
    }

    fn validate(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, AuthError> {
        let secret = match expected {
            TokenKind::Access => &self.cfg.access_secret,
            TokenKind::Refresh => &self.cfg.refresh_secret,
        };
        decode_claims(token, secret, expected, self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn config() -> JwtConfig {
        JwtConfig {
            access_secret: b"access-secret".to_vec(),
            refresh_secret: b"refresh-secret".to_vec(),
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }

    fn issuer_at(now: DateTime<Utc>) -> JwtTokenIssuer {
        JwtTokenIssuer::try_new(config(), Arc::new(FixedClock(now))).expect("valid config")
    }

    #[test]
    fn access_token_round_trips_to_same_principal() {
        let now = Utc::now();
        let issuer = issuer_at(now);
        let user = UserId::new_v4();

        let (token, exp) = issuer.issue_access_token(user).expect("issue");
        let claims = issuer.validate(&token.0, TokenKind::Access).expect("validate");

        assert_eq!(claims.sub, user);
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp, exp.timestamp());
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn access_token_fails_once_ttl_has_elapsed() {
        let issued_at = Utc::now().trunc_subsecs(0) - ChronoDuration::hours(2);
        let (token, exp) = issuer_at(issued_at)
            .issue_access_token(UserId::new_v4())
            .expect("issue");
        let ttl = ChronoDuration::minutes(15);
        assert_eq!(exp, issued_at + ttl);

        let just_before = issuer_at(issued_at + ttl - ChronoDuration::seconds(1))
            .validate(&token.0, TokenKind::Access);
        let at_ttl = issuer_at(issued_at + ttl).validate(&token.0, TokenKind::Access);
        let mid_second = issuer_at(issued_at + ttl + ChronoDuration::milliseconds(136))
            .validate(&token.0, TokenKind::Access);

        assert!(just_before.is_ok());
        assert!(matches!(at_ttl, Err(AuthError::InvalidToken)));
        assert!(matches!(mid_second, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn validation_reads_the_injected_clock() {
        let issued_at = Utc::now() - ChronoDuration::days(8);
        let issuer = issuer_at(issued_at);

        let issued = issuer.issue_refresh_token(UserId::new_v4()).expect("issue");

        // Expired by the wall clock, still inside its TTL for this issuer.
        issuer
            .validate(&issued.token.0, TokenKind::Refresh)
            .expect("valid at issuer time");
        assert!(matches!(
            issuer_at(Utc::now()).validate(&issued.token.0, TokenKind::Refresh),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn refresh_token_carries_returned_identifier_and_expiry() {
        let issuer = issuer_at(Utc::now());
        let user = UserId::new_v4();

        let issued = issuer.issue_refresh_token(user).expect("issue");
        let claims = issuer
            .validate(&issued.token.0, TokenKind::Refresh)
            .expect("validate");

        assert_eq!(claims.jti, issued.token_id);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[test]
    fn each_issuance_gets_a_fresh_identifier() {
        let issuer = issuer_at(Utc::now());
        let user = UserId::new_v4();

        let first = issuer.issue_refresh_token(user).expect("issue");
        let second = issuer.issue_refresh_token(user).expect("issue");

        assert_ne!(first.token_id, second.token_id);
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let issuer = issuer_at(Utc::now());
        let user = UserId::new_v4();

        let (access, _) = issuer.issue_access_token(user).expect("issue");
        let refresh = issuer.issue_refresh_token(user).expect("issue");

        assert!(matches!(
            issuer.validate(&refresh.token.0, TokenKind::Access),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            issuer.validate(&access.0, TokenKind::Refresh),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut cfg = config();
        cfg.refresh_ttl = Duration::ZERO;

        let result = JwtTokenIssuer::try_new(cfg, Arc::new(FixedClock(Utc::now())));

        assert!(result.is_err());
    }

    #[test]
    fn shared_secret_is_rejected() {
        let mut cfg = config();
        cfg.refresh_secret = cfg.access_secret.clone();

        let result = JwtTokenIssuer::try_new(cfg, Arc::new(FixedClock(Utc::now())));

        assert!(result.is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let rendered = format!("{:?}", config());

        assert!(!rendered.contains("access-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
