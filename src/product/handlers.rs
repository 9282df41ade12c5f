use axum::extract::{Json, Path, Query, State};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use validator::Validate;

use super::models::{NewProduct, Product, ProductQuery, UpdateProduct};
use crate::auth::models::AdminClaims;
use crate::state::AppState;
use crate::utils::AppError;

pub async fn get_products(
    State(state): State<AppState>,
    Query(params): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    use buks_shop::schema::products;

    let mut conn = state.pool.get().await?;

    let (offset, limit) = params.page();

    let mut query = products::table
        .select(Product::as_select())
        .into_boxed();

    if let Some(category_id) = params.category_id {
        query = query.filter(products::category_id.eq(category_id));
    }
    if let Some(q) = &params.q {
        query = query.filter(products::name.ilike(format!("%{q}%")));
    }
    if params.available.unwrap_or(false) {
        query = query.filter(products::is_available.eq(true));
    }

    let res = query
        .order(products::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn get_product_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, AppError> {
    use buks_shop::schema::products;

    let mut conn = state.pool.get().await?;

    let res = products::table
        .find(id)
        .select(Product::as_select())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn create_product(
    State(state): State<AppState>,
    AdminClaims(_): AdminClaims,
    Json(payload): Json<NewProduct>,
) -> Result<Json<Product>, AppError> {
    use buks_shop::schema::products;

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    let res = diesel::insert_into(products::table)
        .values(&payload)
        .returning(Product::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn update_product(
    State(state): State<AppState>,
    AdminClaims(_): AdminClaims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProduct>,
) -> Result<Json<Product>, AppError> {
    use buks_shop::schema::products;

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    let res = diesel::update(products::table.find(id))
        .set((&payload, products::updated_at.eq(Utc::now())))
        .returning(Product::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn remove_product(
    State(state): State<AppState>,
    AdminClaims(_): AdminClaims,
    Path(id): Path<i32>,
) -> Result<Json<Product>, AppError> {
    use buks_shop::schema::products;

    let mut conn = state.pool.get().await?;

    let res = diesel::delete(products::table.find(id))
        .returning(Product::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}
