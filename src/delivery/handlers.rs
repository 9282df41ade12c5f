use axum::extract::{Json, Path, Query, State};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use validator::Validate;

use super::models::{DeliveryFee, NewDeliveryFee, Quote, QuoteQuery, pick_fee};
use crate::auth::models::AdminClaims;
use crate::state::AppState;
use crate::utils::AppError;

pub async fn load_bands(
    conn: &mut AsyncPgConnection,
) -> Result<Vec<DeliveryFee>, diesel::result::Error> {
    use buks_shop::schema::delivery_fees;

    delivery_fees::table
        .order(delivery_fees::min_weight.asc())
        .select(DeliveryFee::as_select())
        .load(conn)
        .await
}

pub async fn get_delivery_fees(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeliveryFee>>, AppError> {
    let mut conn = state.pool.get().await?;
    let res = load_bands(&mut conn).await?;
    Ok(Json(res))
}

pub async fn quote(
    State(state): State<AppState>,
    Query(params): Query<QuoteQuery>,
) -> Result<Json<Quote>, AppError> {
    if !params.weight.is_finite() || params.weight < 0.0 {
        return Err(AppError::Validation("weight must be non-negative".to_string()));
    }

    let mut conn = state.pool.get().await?;
    let bands = load_bands(&mut conn).await?;

    Ok(Json(Quote {
        weight: params.weight,
        fee: pick_fee(&bands, params.weight),
    }))
}

pub async fn create_delivery_fee(
    State(state): State<AppState>,
    AdminClaims(_): AdminClaims,
    Json(payload): Json<NewDeliveryFee>,
) -> Result<Json<DeliveryFee>, AppError> {
    use buks_shop::schema::delivery_fees;

    payload.validate()?;

    if let Some(max) = payload.max_weight {
        if max < payload.min_weight {
            return Err(AppError::Validation(
                "max_weight must not be below min_weight".to_string(),
            ));
        }
    }

    let mut conn = state.pool.get().await?;

    let res = diesel::insert_into(delivery_fees::table)
        .values(&payload)
        .returning(DeliveryFee::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn remove_delivery_fee(
    State(state): State<AppState>,
    AdminClaims(_): AdminClaims,
    Path(id): Path<i32>,
) -> Result<Json<DeliveryFee>, AppError> {
    use buks_shop::schema::delivery_fees;

    let mut conn = state.pool.get().await?;

    let res = diesel::delete(delivery_fees::table.find(id))
        .returning(DeliveryFee::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}
