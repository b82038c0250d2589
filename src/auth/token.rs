//! Signed bearer tokens
//!
//! Tokens are compact JWTs signed with HS512. They carry the username as the
//! subject plus issued-at and expiry timestamps in seconds, and are never
//! stored server-side.

use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AuthError, VerifyError};

/// Signing algorithm for every issued token
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS512;

/// Claims carried by a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username (email)
    pub sub: String,

    /// Issued-at, seconds since the epoch
    pub iat: i64,

    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Issues and verifies tokens with a shared secret and fixed validity window
///
/// Holds only immutable key material, so one instance is shared by all requests.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl TokenCodec {
    /// Create a codec from a secret and validity window
    pub fn new(secret: &str, validity: Duration) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity,
        }
    }

    /// Create a codec from the auth section of the configuration
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::from_millis(config.jwt_expiration_ms),
        )
    }

    /// Validity window applied to newly issued tokens
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issue a token for `subject`, valid from now for the configured window
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        let claims = self.claims_for(subject, Utc::now())?;

        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenIssue(e.to_string()))
    }

    fn claims_for(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<Claims, AuthError> {
        let validity = chrono::Duration::from_std(self.validity)
            .map_err(|e| AuthError::TokenIssue(e.to_string()))?;

        Ok(Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + validity).timestamp(),
        })
    }

    /// Verify a token and return its subject
    ///
    /// The token is expired once the current time is past `exp`; no clock
    /// skew allowance is applied.
    pub fn verify(&self, token: &str) -> Result<String, VerifyError> {
        if token.trim().is_empty() {
            return Err(VerifyError::Empty);
        }
        check_structure(token)?;

        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|e| classify(e.kind()))
    }
}

/// Check the three-segment layout and the header's algorithm
///
/// Header and claims must be non-empty base64url. The signature segment may
/// be empty, as in unsigned tokens. A header that parses but names any
/// algorithm other than [`TOKEN_ALGORITHM`] is `Unsupported`.
fn check_structure(token: &str) -> Result<(), VerifyError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, claims, signature] = segments.as_slice() else {
        return Err(VerifyError::Malformed);
    };

    if claims.is_empty() || URL_SAFE_NO_PAD.decode(claims).is_err() {
        return Err(VerifyError::Malformed);
    }
    if !signature.is_empty() && URL_SAFE_NO_PAD.decode(signature).is_err() {
        return Err(VerifyError::Malformed);
    }

    let header = URL_SAFE_NO_PAD
        .decode(header)
        .ok()
        .filter(|bytes| !bytes.is_empty())
        .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok())
        .filter(serde_json::Value::is_object)
        .ok_or(VerifyError::Malformed)?;

    match header.get("alg").and_then(serde_json::Value::as_str) {
        Some(alg) if alg.parse::<Algorithm>().ok() == Some(TOKEN_ALGORITHM) => Ok(()),
        alg => {
            tracing::debug!(alg = ?alg, "Token uses a disallowed algorithm");
            Err(VerifyError::Unsupported)
        }
    }
}

fn classify(kind: &ErrorKind) -> VerifyError {
    match kind {
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => VerifyError::Malformed,
        ErrorKind::InvalidSignature | ErrorKind::Crypto(_) => VerifyError::BadSignature,
        ErrorKind::ExpiredSignature => VerifyError::Expired,
        _ => VerifyError::Unsupported,
    }
}
