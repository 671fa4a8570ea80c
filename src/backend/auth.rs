use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::backend::{error::ApiError, AppState};

// Long enough that a file-persisted token behaves like the browser
// localStorage token it replaces.
const TOKEN_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

pub fn mint_token(user_id: &str, secret: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::InvalidToken)
}

/// The decoded caller. Extracting it is what makes a route protected:
/// no header (or a header without a token after the scheme) rejects with
/// "No token provided", a failed verification with "Invalid token".
pub struct AuthUser {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.split_whitespace().nth(1))
            .ok_or(ApiError::MissingToken)?;

        let claims = verify_token(token, &state.config.jwt_secret)?;
        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn mint_then_verify_round_trips_the_user_id() {
        let token = mint_token("42", SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "42");
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert!(matches!(
            verify_token("not-a-jwt", SECRET),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn token_signed_with_another_secret_is_invalid() {
        let token = mint_token("42", "other-secret").unwrap();
        assert!(matches!(
            verify_token(&token, SECRET),
            Err(ApiError::InvalidToken)
        ));
    }
}
