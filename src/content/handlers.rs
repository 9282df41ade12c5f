use axum::extract::{Json, Path, State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::json;
use validator::Validate;

use super::models::{Faq, NewFaq, StoreInfo, UpdateFaq, UpdateStoreInfo};
use crate::auth::models::AdminClaims;
use crate::state::AppState;
use crate::utils::AppError;

/// The single store-info row, seeded by the migrations.
pub async fn get_store_info(State(state): State<AppState>) -> Result<Json<StoreInfo>, AppError> {
    use buks_shop::schema::store_info;

    let mut conn = state.pool.get().await?;

    let res = store_info::table
        .order(store_info::id.asc())
        .select(StoreInfo::as_select())
        .first(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn update_store_info(
    State(state): State<AppState>,
    AdminClaims(_): AdminClaims,
    Json(payload): Json<UpdateStoreInfo>,
) -> Result<Json<StoreInfo>, AppError> {
    use buks_shop::schema::store_info;

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    let current_id: i32 = store_info::table
        .order(store_info::id.asc())
        .select(store_info::id)
        .first(&mut conn)
        .await?;

    let res = diesel::update(store_info::table.find(current_id))
        .set(&payload)
        .returning(StoreInfo::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn get_faqs(State(state): State<AppState>) -> Result<Json<Vec<Faq>>, AppError> {
    use buks_shop::schema::faqs;

    let mut conn = state.pool.get().await?;

    let res = faqs::table
        .order((faqs::position.asc(), faqs::id.asc()))
        .select(Faq::as_select())
        .load(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn create_faq(
    State(state): State<AppState>,
    AdminClaims(_): AdminClaims,
    Json(payload): Json<NewFaq>,
) -> Result<Json<Faq>, AppError> {
    use buks_shop::schema::faqs;

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    let res = diesel::insert_into(faqs::table)
        .values(&payload)
        .returning(Faq::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn update_faq(
    State(state): State<AppState>,
    AdminClaims(_): AdminClaims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateFaq>,
) -> Result<Json<Faq>, AppError> {
    use buks_shop::schema::faqs;

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    let res = diesel::update(faqs::table.find(id))
        .set(&payload)
        .returning(Faq::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn remove_faq(
    State(state): State<AppState>,
    AdminClaims(_): AdminClaims,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    use buks_shop::schema::faqs;

    let mut conn = state.pool.get().await?;

    let deleted = diesel::delete(faqs::table.find(id))
        .execute(&mut conn)
        .await?;
    if deleted == 0 {
        return Err(AppError::NotFound("faq"));
    }

    Ok(Json(json!({ "deleted": id })))
}
