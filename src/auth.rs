//! Bearer-token authentication
//!
//! Tokens are HS256 JWTs whose claims carry the user id under `userId`. The
//! verified id is the only source of the acting principal; request bodies never
//! supply it.

use actix_web::{dev::Payload, http::header, http::StatusCode, web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use thiserror::Error;

use crate::models::{ErrorResponse, PrincipalId};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token verifier is not configured")]
    NotConfigured,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new("not_authenticated", self.to_string()))
    }
}

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub exp: usize,
}

/// Verifies bearer tokens and yields the principal they name
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<PrincipalId, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        PrincipalId::new(data.claims.user_id)
            .ok_or_else(|| AuthError::InvalidToken("empty userId claim".to_string()))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: Option<&str>) -> Result<&str, AuthError> {
    header_value
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Principal of the authenticated caller
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal(pub PrincipalId);

impl FromRequest for AuthenticatedPrincipal {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedPrincipal, AuthError> {
    let verifier = req
        .app_data::<web::Data<TokenVerifier>>()
        .ok_or(AuthError::NotConfigured)?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = bearer_token(header_value)?;
    let principal = verifier.verify(token).map_err(|e| {
        tracing::info!("Rejected token on {}: {}", req.path(), e);
        e
    })?;

    Ok(AuthenticatedPrincipal(principal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, user_id: &str, exp_offset: i64) -> String {
        let claims = Claims {
            user_id: user_id.to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = TokenVerifier::new("secret");
        let principal = verifier.verify(&token("secret", "user-1", 3600)).unwrap();
        assert_eq!(principal.as_str(), "user-1");
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let verifier = TokenVerifier::new("secret");
        assert!(verifier.verify(&token("other", "user-1", 3600)).is_err());
    }

    #[test]
    fn test_verify_rejects_expired() {
        let verifier = TokenVerifier::new("secret");
        assert!(verifier.verify(&token("secret", "user-1", -3600)).is_err());
    }

    #[test]
    fn test_verify_rejects_empty_user() {
        let verifier = TokenVerifier::new("secret");
        assert!(verifier.verify(&token("secret", "", 3600)).is_err());
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(bearer_token(Some("Basic abc")).is_err());
        assert!(bearer_token(Some("Bearer ")).is_err());
        assert!(bearer_token(None).is_err());
    }
}
