use crate::application_port::{AuthError, TokenClaims};
use crate::domain_model::TokenKind;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

pub fn encode_claims(claims: &TokenClaims, secret: &[u8]) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Internal(e.to_string()))
}

/// Verify `token` against `secret`, require its kind tag to be `expected` and
/// require `now < exp`.
///
/// Access and refresh tokens share one claim shape, so the kind check is what
/// stops one being accepted where the other is expected when secrets coincide.
/// Expiry is checked here against the caller's clock rather than by
/// `jsonwebtoken`, which still accepts a token during the second `exp` names.
pub fn decode_claims(
    token: &str,
    secret: &[u8],
    expected: TokenKind,
    now: DateTime<Utc>,
) -> Result<TokenClaims, AuthError> {
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = false;
    v.set_required_spec_claims(&["exp"]);
    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(secret), &v).map_err(
        |e| {
            match e.kind() {
                ErrorKind::InvalidSignature => debug!(kind = %expected, "token signature mismatch"),
                other => debug!(kind = %expected, error = ?other, "token rejected"),
            }
            AuthError::InvalidToken
        },
    )?;

    if data.claims.kind != expected {
        debug!(expected = %expected, found = %data.claims.kind, "token kind mismatch");
        return Err(AuthError::InvalidToken);
    }
    if data.claims.exp <= now.timestamp() {
        debug!(kind = %expected, exp = data.claims.exp, "token expired");
        return Err(AuthError::InvalidToken);
    }
    Ok(data.claims)
}
