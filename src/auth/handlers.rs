use axum::extract::{Json, Path, State};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

use super::models::{
    AccessTokenClaims, AdminClaims, Customer, CustomerChangeset, NewCustomer, ROLE_ADMIN,
    ROLE_CUSTOMER, RefreshRequest, SafeCustomer, SignInRequest, SignUpRequest, TokenPair,
    UpdateCustomerRequest, encode_token,
};
use crate::notification::models::{NewNotification, kind};
use crate::state::AppState;
use crate::utils::AppError;

pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<Json<SafeCustomer>, AppError> {
    use buks_shop::schema::customers;

    payload.validate()?;
    let role = resolve_role(&state, &payload)?;

    let mut conn = state.pool.get().await?;

    let password_hash = create_password_hash(payload.password).await?;

    let customer = NewCustomer {
        id: Uuid::new_v4(),
        full_name: payload.full_name,
        email: payload.email,
        password_hash,
        role: role.to_string(),
    };

    let res = diesel::insert_into(customers::table)
        .values(&customer)
        .returning(SafeCustomer::as_returning())
        .get_result(&mut conn)
        .await?;

    crate::notification::handlers::record(
        &mut conn,
        vec![NewNotification {
            user_id: res.id,
            message: format!("Welcome to Buks Snacks, {}!", res.full_name),
            kind: kind::WELCOME.to_string(),
            customer_name: Some(res.full_name.clone()),
            customer_email: Some(res.email.clone()),
        }],
    )
    .await?;

    Ok(Json(res))
}

fn resolve_role(state: &AppState, payload: &SignUpRequest) -> Result<&'static str, AppError> {
    match payload.role.as_deref() {
        None | Some(ROLE_CUSTOMER) => Ok(ROLE_CUSTOMER),
        Some(ROLE_ADMIN) => {
            let expected = state
                .config
                .admin_sign_up_key
                .as_deref()
                .ok_or_else(|| AppError::Forbidden("admin sign-up is disabled".to_string()))?;
            if payload.admin_key.as_deref() == Some(expected) {
                Ok(ROLE_ADMIN)
            } else {
                Err(AppError::Forbidden("invalid admin sign-up key".to_string()))
            }
        }
        Some(other) => Err(AppError::Validation(format!("unknown role: {other}"))),
    }
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<TokenPair>, AppError> {
    use buks_shop::schema::customers;

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    // only a missing row means bad credentials; real database trouble
    // stays a 500
    let customer = customers::table
        .filter(customers::email.eq(&payload.email))
        .select(Customer::as_select())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".to_string()))?;

    verify_password(payload.password, customer.password_hash.clone()).await?;

    let tokens = issue_tokens(&state, customer.id, &customer.role)?;

    diesel::update(customers::table.find(customer.id))
        .set(customers::hashed_rt.eq(refresh_digest(&tokens.refresh_token)))
        .execute(&mut conn)
        .await?;

    Ok(Json(tokens))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    use buks_shop::schema::customers;

    let claims = super::models::decode_token(&payload.refresh_token, &state.config.jwt_secret)?;

    let mut conn = state.pool.get().await?;

    let customer = customers::table
        .find(claims.sub)
        .select(Customer::as_select())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::Unauthorized("unknown session".to_string()))?;

    let stored = customer
        .hashed_rt
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("session revoked".to_string()))?;

    if stored != refresh_digest(&payload.refresh_token) {
        return Err(AppError::Unauthorized("session revoked".to_string()));
    }

    let tokens = issue_tokens(&state, customer.id, &customer.role)?;

    diesel::update(customers::table.find(customer.id))
        .set(customers::hashed_rt.eq(refresh_digest(&tokens.refresh_token)))
        .execute(&mut conn)
        .await?;

    Ok(Json(tokens))
}

pub async fn logout(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<serde_json::Value>, AppError> {
    use buks_shop::schema::customers;

    let mut conn = state.pool.get().await?;

    diesel::update(customers::table.find(claims.sub))
        .set(customers::hashed_rt.eq(None::<String>))
        .execute(&mut conn)
        .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn get_current_customer(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<SafeCustomer>, AppError> {
    use buks_shop::schema::customers;

    let mut conn = state.pool.get().await?;

    let res = customers::table
        .find(claims.sub)
        .select(SafeCustomer::as_select())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn get_all_customers(
    State(state): State<AppState>,
    AdminClaims(_): AdminClaims,
) -> Result<Json<Vec<SafeCustomer>>, AppError> {
    use buks_shop::schema::customers;

    let mut conn = state.pool.get().await?;

    let res = customers::table
        .order(customers::created_at.desc())
        .select(SafeCustomer::as_select())
        .load(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn get_customer_by_id(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<Uuid>,
) -> Result<Json<SafeCustomer>, AppError> {
    use buks_shop::schema::customers;

    require_self_or_admin(&claims, id)?;

    let mut conn = state.pool.get().await?;

    let res = customers::table
        .find(id)
        .select(SafeCustomer::as_select())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn update_customer(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<Json<SafeCustomer>, AppError> {
    use buks_shop::schema::customers;

    payload.validate()?;
    require_self_or_admin(&claims, id)?;

    let mut conn = state.pool.get().await?;

    let customer = customers::table
        .find(id)
        .select(Customer::as_select())
        .get_result(&mut conn)
        .await?;

    // changing the password requires proving the current one
    let password_hash = match payload.new_password {
        Some(new_password) => {
            let current = payload.current_password.ok_or_else(|| {
                AppError::Validation("current_password is required to set a new password".to_string())
            })?;
            verify_password(current, customer.password_hash.clone()).await?;
            Some(create_password_hash(new_password).await?)
        }
        None => None,
    };

    let changes = CustomerChangeset {
        full_name: payload.full_name,
        email: payload.email,
        phone: payload.phone,
        profile_url: payload.profile_url,
        password_hash,
    };

    let res = diesel::update(customers::table.find(id))
        .set(&changes)
        .returning(SafeCustomer::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

fn require_self_or_admin(claims: &AccessTokenClaims, id: Uuid) -> Result<(), AppError> {
    if claims.sub == id || claims.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("not your account".to_string()))
    }
}

fn issue_tokens(state: &AppState, customer_id: Uuid, role: &str) -> Result<TokenPair, AppError> {
    let now = Utc::now().timestamp();
    let access = AccessTokenClaims::new(customer_id, role, now, state.config.access_ttl_secs);
    let refresh = AccessTokenClaims::new(customer_id, role, now, state.config.refresh_ttl_secs);

    Ok(TokenPair {
        access_token: encode_token(&access, &state.config.jwt_secret)?,
        refresh_token: encode_token(&refresh, &state.config.jwt_secret)?,
        token_type: "Bearer",
        expires_in: state.config.access_ttl_secs,
    })
}

/// Tokens are digested before storage; bcrypt is unsuitable here since it
/// only considers the first 72 bytes and JWTs are longer than that.
fn refresh_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

async fn create_password_hash(password: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST)).await??;
    Ok(hashed)
}

async fn verify_password(password: String, password_hash: String) -> Result<(), AppError> {
    let ok = tokio::task::spawn_blocking(move || verify(password, &password_hash)).await??;
    if ok {
        Ok(())
    } else {
        Err(AppError::Unauthorized("invalid credentials".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hashed = create_password_hash("chin-chin-4-life".to_string())
            .await
            .unwrap();
        assert!(verify_password("chin-chin-4-life".to_string(), hashed.clone())
            .await
            .is_ok());
        assert!(verify_password("wrong".to_string(), hashed).await.is_err());
    }

    #[test]
    fn refresh_digest_is_stable_hex() {
        let digest = refresh_digest("some.jwt.token");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, refresh_digest("some.jwt.token"));
        assert_ne!(digest, refresh_digest("other.jwt.token"));
    }
}
