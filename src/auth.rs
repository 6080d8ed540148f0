// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::TokenError;
use crate::session::Session;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authorized,
    Unauthorized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub exp: f64,
}

fn token_error(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidToken => TokenError::Shape,
        ErrorKind::Base64(_) => TokenError::Encoding,
        ErrorKind::MissingRequiredClaim(_) => TokenError::MissingExpiry,
        _ => TokenError::Claims,
    }
}

// The signature is not checked here; the backend's 401 is what enforces auth.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let token = token.trim();
    let header = decode_header(token).map_err(|e| token_error(e.kind()))?;
    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);
    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| token_error(e.kind()))
}

// Expired only once exp*1000 is strictly below now_ms.
pub fn evaluate(token: Option<&str>, now_ms: i64) -> AuthState {
    let Some(token) = token else {
        return AuthState::Unauthorized;
    };
    match decode_claims(token) {
        Ok(claims) => {
            if claims.exp * 1000.0 < now_ms as f64 {
                debug!(exp = claims.exp, "stored token has expired");
                AuthState::Unauthorized
            } else {
                AuthState::Authorized
            }
        }
        Err(err) => {
            debug!(error = %err, "stored token is malformed; treating as logged out");
            AuthState::Unauthorized
        }
    }
}

pub fn guard(session: &Session) -> AuthState {
    evaluate(session.token().as_deref(), Utc::now().timestamp_millis())
}

/// Admin views only look at the stored flag. It is neither tied to the token
/// nor checked for expiry, so editing the local database bypasses it; the
/// admin endpoints must enforce authorization themselves.
pub fn admin_gate(session: &Session) -> AuthState {
    if session.is_admin() {
        AuthState::Authorized
    } else {
        AuthState::Unauthorized
    }
}

pub fn session_expiry(token: &str) -> Option<DateTime<Utc>> {
    let claims = decode_claims(token).ok()?;
    DateTime::from_timestamp_millis((claims.exp * 1000.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn header() -> String {
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#)
    }

    fn token_with(payload: &str) -> String {
        format!("{}.{}.sig", header(), URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn expiry_boundary_is_strict() {
        let token = token_with(r#"{"exp": 1700000000}"#);
        assert_eq!(evaluate(Some(&token), 1_700_000_000_000), AuthState::Authorized);
        assert_eq!(evaluate(Some(&token), 1_700_000_000_001), AuthState::Unauthorized);
    }

    #[test]
    fn decode_errors_are_classified() {
        assert_eq!(decode_claims("nodots").unwrap_err(), TokenError::Shape);
        assert_eq!(
            decode_claims(&format!("{}.!!!.sig", header())).unwrap_err(),
            TokenError::Encoding
        );
        assert_eq!(
            decode_claims(&token_with("not json")).unwrap_err(),
            TokenError::Claims
        );
        assert_eq!(
            decode_claims(&token_with(r#"{"exp": "soon"}"#)).unwrap_err(),
            TokenError::Claims
        );
        assert_eq!(
            decode_claims(&token_with(r#"{"user_id": 7}"#)).unwrap_err(),
            TokenError::MissingExpiry
        );
    }

    #[test]
    fn signature_and_past_expiry_are_not_enforced_by_decoding() {
        let token = format!(
            "{}.{}.not-a-real-signature",
            header(),
            URL_SAFE_NO_PAD.encode(r#"{"exp": 1000}"#)
        );
        assert_eq!(decode_claims(&token).unwrap().exp, 1000.0);
        assert_eq!(evaluate(Some(&token), 2_000_000), AuthState::Unauthorized);
    }

    #[test]
    fn simplejwt_claims_decode() {
        let token = token_with(
            r#"{"token_type":"access","exp":1760000000,"iat":1759990000,"jti":"x","user_id":7}"#,
        );
        assert_eq!(decode_claims(&token).unwrap().exp, 1_760_000_000.0);
        let expiry = session_expiry(&token).unwrap();
        assert_eq!(expiry.timestamp(), 1_760_000_000);
    }
}
