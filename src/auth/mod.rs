//! Authenticated principal carried by JWTs.
//!
//! API clients send the token as `Authorization: Bearer <jwt>`; the admin
//! pages keep the same token as the `actix-identity` id of the session.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::types::{TypeConstraintError, UserId};
use crate::domain::user::{User, UserRole};
use crate::models::config::ServerConfig;
use crate::services::{ServiceError, ServiceResult};

pub mod password;

/// JWT claims identifying the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    /// User id.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Expiration as a unix timestamp.
    pub exp: i64,
}

impl AuthenticatedUser {
    pub fn new(user: &User, ttl: Duration) -> Self {
        Self {
            sub: user.id.to_string(),
            email: user.email.to_string(),
            name: user.display_name().to_string(),
            role: user.role,
            exp: (Utc::now() + ttl).timestamp(),
        }
    }

    pub fn user_id(&self) -> Result<UserId, TypeConstraintError> {
        self.sub.parse()
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn to_jwt(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn from_jwt(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}

/// Fails with [`ServiceError::Unauthorized`] unless `user` holds `role`.
pub fn ensure_role(user: &AuthenticatedUser, role: UserRole) -> ServiceResult<()> {
    if user.role == role {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Rejection produced by the [`AuthenticatedUser`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication required")]
    Missing,
    #[error("invalid or expired token")]
    Invalid,
    #[error("server configuration missing")]
    Misconfigured,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Missing | AuthError::Invalid => StatusCode::UNAUTHORIZED,
            AuthError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn session_token(req: &HttpRequest) -> Option<String> {
    req.get_identity().ok().and_then(|identity| identity.id().ok())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AuthError> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or(AuthError::Misconfigured)?;
    let token = bearer_token(req)
        .or_else(|| session_token(req))
        .ok_or(AuthError::Missing)?;

    AuthenticatedUser::from_jwt(&token, &config.secret).map_err(|err| {
        log::debug!("Rejected token: {err}");
        AuthError::Invalid
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::UserEmail;
    use chrono::NaiveDateTime;

    const SECRET: &str = "test-secret-test-secret-test-secret-test-secret-test-secret-0000";

    fn user(role: UserRole) -> User {
        User {
            id: UserId::generate(),
            email: UserEmail::new("staff@example.com").unwrap(),
            name: None,
            phone: None,
            role,
            created_at: NaiveDateTime::default(),
            version: 1,
        }
    }

    #[test]
    fn jwt_round_trip() {
        let claims = AuthenticatedUser::new(&user(UserRole::Admin), Duration::minutes(5));
        let token = claims.to_jwt(SECRET).unwrap();
        let decoded = AuthenticatedUser::from_jwt(&token, SECRET).unwrap();
        assert_eq!(decoded, claims);
        assert!(decoded.is_admin());
        assert_eq!(decoded.name, "staff@example.com");
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let expired = AuthenticatedUser::new(&user(UserRole::User), Duration::minutes(-10));
        let token = expired.to_jwt(SECRET).unwrap();
        assert!(AuthenticatedUser::from_jwt(&token, SECRET).is_err());

        let fresh = AuthenticatedUser::new(&user(UserRole::User), Duration::minutes(10));
        let token = fresh.to_jwt(SECRET).unwrap();
        assert!(AuthenticatedUser::from_jwt(&token, "another-secret").is_err());
    }

    #[test]
    fn ensure_role_checks_role() {
        let admin = AuthenticatedUser::new(&user(UserRole::Admin), Duration::minutes(5));
        let regular = AuthenticatedUser::new(&user(UserRole::User), Duration::minutes(5));
        assert!(ensure_role(&admin, UserRole::Admin).is_ok());
        assert!(matches!(
            ensure_role(&regular, UserRole::Admin),
            Err(ServiceError::Unauthorized)
        ));
    }
}
