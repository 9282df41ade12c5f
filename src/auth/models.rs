use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use buks_shop::schema::customers;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::state::AppState;
use crate::utils::AppError;

pub const ROLE_CUSTOMER: &str = "customer";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Queryable, Selectable, Debug, PartialEq)]
#[diesel(table_name=customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Customer {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub hashed_rt: Option<String>,
    pub role: String,
    pub phone: Option<String>,
    pub profile_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Customer row without credential columns, safe to serialize in responses.
#[derive(Queryable, Selectable, Debug, PartialEq, Serialize)]
#[diesel(table_name=customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SafeCustomer {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub profile_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name=customers)]
pub struct NewCustomer {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(AsChangeset)]
#[diesel(table_name=customers)]
pub struct CustomerChangeset {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_url: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub role: Option<String>,
    pub admin_key: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_url: Option<String>,
    pub current_password: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub new_password: Option<String>,
}

#[derive(Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: Uuid,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl AccessTokenClaims {
    pub fn new(sub: Uuid, role: &str, now: i64, ttl_secs: i64) -> Self {
        Self {
            sub,
            role: role.to_string(),
            iat: now,
            exp: now + ttl_secs,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

pub fn encode_token(claims: &AccessTokenClaims, secret: &str) -> Result<String, AppError> {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token encoding failed: {e}")))
}

pub fn decode_token(token: &str, secret: &str) -> Result<AccessTokenClaims, AppError> {
    jsonwebtoken::decode::<AccessTokenClaims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
        &jsonwebtoken::Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("invalid or expired token".to_string()))
}

/// Pulls claims out of an `Authorization: Bearer` header. Shared by the
/// extractors and the few handlers that branch on authentication.
pub fn claims_from_headers(
    headers: &axum::http::HeaderMap,
    secret: &str,
) -> Result<AccessTokenClaims, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_string()))?;

    decode_token(token, secret)
}

impl FromRequestParts<AppState> for AccessTokenClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        claims_from_headers(&parts.headers, &state.config.jwt_secret)
    }
}

/// Extractor that additionally requires the admin role.
pub struct AdminClaims(pub AccessTokenClaims);

impl FromRequestParts<AppState> for AdminClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = AccessTokenClaims::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            return Err(AppError::Forbidden("admin access required".to_string()));
        }
        Ok(AdminClaims(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trip_preserves_claims() {
        let sub = Uuid::new_v4();
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims::new(sub, ROLE_ADMIN, now, 900);

        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();

        assert_eq!(decoded.sub, sub);
        assert_eq!(decoded.role, ROLE_ADMIN);
        assert_eq!(decoded.exp, now + 900);
        assert!(decoded.is_admin());
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        // default validation applies 60s leeway, so go well past it
        let claims = AccessTokenClaims::new(Uuid::new_v4(), ROLE_CUSTOMER, now - 1000, 100);

        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims =
            AccessTokenClaims::new(Uuid::new_v4(), ROLE_CUSTOMER, Utc::now().timestamp(), 900);
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }
}
