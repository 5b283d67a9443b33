//! Access tokens and password hashing.
//!
//! Access tokens are HS256 JWTs carrying the username (`sub`) and the account's role. They are issued by
//! `POST /auth/token` and checked on every request under `/api` by [`crate::middleware::JwtMiddlewareFactory`], which
//! stores the validated [`JwtClaims`] in the request extensions. Handlers take `JwtClaims` as an argument to get at the
//! caller's identity.
//!
//! A token stays valid until it expires, even if the account behind it is disabled in the meantime. Handlers that
//! change marketplace state take an [`ActiveAccount`] instead, which looks the account up on every request.
use std::{
    future::{ready, Ready},
    marker::PhantomData,
};

use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use cattle_engine::{
    db_types::{Role, UserAccount},
    UserApi,
    UserApiError,
    UserManagement,
};
use chrono::{Duration, Utc};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, errors::ErrorKind as JwtErrorKind, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The username of the account the token was issued to
    pub sub: String,
    pub role: Role,
    /// Expiry, as a unix timestamp
    pub exp: i64,
}

impl JwtClaims {
    pub fn username(&self) -> &str {
        self.sub.as_str()
    }
}

fn claims_of(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    req.extensions().get::<JwtClaims>().cloned().ok_or_else(|| {
        warn!("💻️ No JWT claims found in request extensions. Is the route behind the JWT middleware?");
        ServerError::AuthenticationError(AuthError::MissingToken)
    })
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_of(req))
    }
}

/// The caller's claims, confirmed against the account store. The account must still exist, still be active and
/// still hold the role the token was issued for.
///
/// Requires a `web::Data<UserApi<B>>` in the app data.
pub struct ActiveAccount<B> {
    pub claims: JwtClaims,
    pub account: UserAccount,
    _backend: PhantomData<fn() -> B>,
}

impl<B> ActiveAccount<B> {
    pub fn username(&self) -> &str {
        self.claims.username()
    }

    fn confirm(claims: JwtClaims, account: Option<UserAccount>) -> Result<Self, AuthError> {
        let account = account.ok_or_else(|| {
            AuthError::ValidationError(format!("The account {} no longer exists.", claims.sub))
        })?;
        if !account.is_active {
            return Err(AuthError::AccountDisabled);
        }
        if account.role != claims.role {
            return Err(AuthError::ValidationError(format!(
                "The token was issued for the {} role, but {} is now a {}. Log in again.",
                claims.role, account.username, account.role
            )));
        }
        Ok(Self { claims, account, _backend: PhantomData })
    }
}

impl<B: UserManagement + 'static> FromRequest for ActiveAccount<B> {
    type Error = ServerError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = claims_of(req);
        let api = req.app_data::<web::Data<UserApi<B>>>().cloned();
        Box::pin(async move {
            let claims = claims?;
            let api = api.ok_or_else(|| {
                ServerError::ConfigurationError("Account checks need a UserApi in the app data".into())
            })?;
            let account = match api.profile(claims.username()).await {
                Ok(account) => Some(account),
                Err(UserApiError::UserNotFound(_)) => None,
                Err(e) => return Err(e.into()),
            };
            let active = Self::confirm(claims, account).map_err(|e| {
                debug!("💻️ Refused a token that its account no longer backs. {e}");
                ServerError::AuthenticationError(e)
            })?;
            Ok(active)
        })
    }
}

pub struct TokenIssuer {
    key: EncodingKey,
    expiry: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { key, expiry: config.token_expiry }
    }

    /// Issue a new access token for the given account.
    /// This method DOES NOT check the account's credentials. This must be done prior to calling `issue_token`.
    pub fn issue_token(&self, username: &str, role: Role) -> Result<String, AuthError> {
        let exp = (Utc::now() + self.expiry).timestamp();
        let claims = JwtClaims { sub: username.to_string(), role, exp };
        encode(&Header::default(), &claims, &self.key).map_err(|e| AuthError::SigningError(e.to_string()))
    }
}

#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { key, validation: Validation::default() }
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            JwtErrorKind::InvalidToken | JwtErrorKind::Base64(_) | JwtErrorKind::Json(_) | JwtErrorKind::Utf8(_) => {
                AuthError::PoorlyFormattedToken(e.to_string())
            },
            _ => AuthError::ValidationError(e.to_string()),
        })?;
        trace!("💻️ Access token validated for {}", data.claims.sub);
        Ok(data.claims)
    }
}

/// Hashes a password with Argon2id, returning the PHC-formatted hash (which includes the salt and parameters).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashingError(e.to_string()))
}

/// Checks a password against a stored hash. A malformed hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            warn!("💻️ Stored password hash could not be parsed. {e}");
            false
        },
    }
}
