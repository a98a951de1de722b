use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    errors::ApiError,
};

/// Claims
///
/// The payload structure carried inside every issued JSON Web Token.
/// Signed with the process-wide secret and validated on every
/// authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the numeric ID of the user, as assigned by storage.
    pub sub: i64,
    /// Expiration Time (exp): timestamp after which the token must not be
    /// accepted. Expiry is the only invalidation mechanism; there is no
    /// revocation list.
    pub exp: usize,
    /// Issued At (iat): timestamp when the token was created.
    pub iat: usize,
}

/// TokenError
///
/// The token sub-taxonomy. Expiry is kept distinct from every other failure
/// because callers may surface it as "please log in again", while a malformed
/// or forged token gets the generic wording.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Missing header, malformed structure or bad signature.
    #[error("invalid or missing authentication token")]
    Invalid,
    /// The signature is fine but the validity window has passed.
    #[error("authentication token expired, please log in again")]
    Expired,
    /// Signing a new token failed. Internal; never caused by client input.
    #[error("token signing failed")]
    Signing,
}

/// TokenService
///
/// Issues and validates signed, time-bounded identity tokens (HS256 JWTs).
///
/// The signing secret is injected at construction and held read-only for the
/// process lifetime, never read from ambient state. Tokens are stateless and
/// self-verifying, so no session store or cross-request lock exists anywhere
/// in the authentication path.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    /// Builds a service around a signing secret and a fixed token lifetime.
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        // Validity is exactly [iat, exp); no grace window.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_secs)
    }

    /// issue
    ///
    /// Builds and signs the claims set `{sub, iat: now, exp: now + TTL}`.
    /// Deterministic given the same clock reading; calls differ only through
    /// the timestamp.
    pub fn issue(&self, subject_id: i64) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject_id,
            iat: now as usize,
            exp: (now + self.ttl_secs) as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|_| TokenError::Signing)
    }

    /// extract_subject
    ///
    /// Parses the token, verifies the signature against the secret and checks
    /// the validity window. An expired-but-authentic token yields `Expired`;
    /// every other failure collapses to `Invalid` so that a forged token is
    /// indistinguishable from a garbled one.
    pub fn extract_subject(&self, token: &str) -> Result<i64, TokenError> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::Invalid),
            },
        }
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the principal on whose
/// behalf the handler runs. Produced exclusively by the extractor below;
/// handlers take it as an argument and use `id` for every ownership check.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The unique, storage-assigned identifier of the user.
    pub id: i64,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any authenticated handler. This cleanly separates
/// authentication (extractor/middleware) from business logic (the handler).
///
/// The process:
/// 1. Local bypass: in `Env::Local` only, a numeric `x-user-id` header stands
///    in for a token to speed up development.
/// 2. Token extraction: `Authorization: Bearer <token>`; a missing or
///    unprefixed header is itself an invalid-token failure.
/// 3. Validation: signature and expiry checks via `TokenService`.
///
/// Rejection: 401 with a body that distinguishes expired from invalid.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        // Local development bypass. Guarded by the Env check so it can never
        // activate against a production configuration.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Some(id) = user_id_header
                    .to_str()
                    .ok()
                    .and_then(|s| s.parse::<i64>().ok())
                {
                    return Ok(AuthUser { id });
                }
            }
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(TokenError::Invalid)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(TokenError::Invalid)?;

        let tokens = TokenService::from_ref(state);
        let id = tokens.extract_subject(token)?;

        Ok(AuthUser { id })
    }
}
