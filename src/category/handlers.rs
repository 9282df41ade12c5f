use axum::extract::{Json, Path, State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use validator::Validate;

use super::models::{Category, NewCategory};
use crate::auth::models::AdminClaims;
use crate::state::AppState;
use crate::utils::AppError;

pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    use buks_shop::schema::categories;

    let mut conn = state.pool.get().await?;

    let res = categories::table
        .order(categories::title.asc())
        .select(Category::as_select())
        .load(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn get_category_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Category>, AppError> {
    use buks_shop::schema::categories;

    let mut conn = state.pool.get().await?;

    let res = categories::table
        .find(id)
        .select(Category::as_select())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn create_category(
    State(state): State<AppState>,
    AdminClaims(_): AdminClaims,
    Json(payload): Json<NewCategory>,
) -> Result<Json<Category>, AppError> {
    use buks_shop::schema::categories;

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    let res = diesel::insert_into(categories::table)
        .values(&payload)
        .returning(Category::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn update_category(
    State(state): State<AppState>,
    AdminClaims(_): AdminClaims,
    Path(id): Path<i32>,
    Json(payload): Json<NewCategory>,
) -> Result<Json<Category>, AppError> {
    use buks_shop::schema::categories;

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    let res = diesel::update(categories::table.find(id))
        .set(&payload)
        .returning(Category::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}
