use axum::extract::{Json, Path, State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use validator::Validate;

use super::models::{AddCartItem, CartItem, CartLine, UpdateCartItem};
use crate::auth::models::AccessTokenClaims;
use crate::product::models::Product;
use crate::state::AppState;
use crate::utils::AppError;

pub async fn get_cart(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<Vec<CartLine>>, AppError> {
    use buks_shop::schema::{cart_items, products};

    let mut conn = state.pool.get().await?;

    let rows = cart_items::table
        .inner_join(products::table)
        .filter(cart_items::customer_id.eq(claims.sub))
        .order(cart_items::created_at.asc())
        .select((CartItem::as_select(), Product::as_select()))
        .load::<(CartItem, Product)>(&mut conn)
        .await?;

    let res = rows
        .into_iter()
        .map(|(item, product)| CartLine {
            id: item.id,
            quantity: item.quantity,
            product,
        })
        .collect();

    Ok(Json(res))
}

pub async fn add_item(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Json(payload): Json<AddCartItem>,
) -> Result<Json<CartItem>, AppError> {
    use buks_shop::schema::cart_items;

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    // one row per (customer, product); adding again bumps the quantity
    let res = diesel::insert_into(cart_items::table)
        .values((
            cart_items::customer_id.eq(claims.sub),
            cart_items::product_id.eq(payload.product_id),
            cart_items::quantity.eq(payload.quantity),
        ))
        .on_conflict((cart_items::customer_id, cart_items::product_id))
        .do_update()
        .set(cart_items::quantity.eq(cart_items::quantity + payload.quantity))
        .returning(CartItem::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn update_item(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCartItem>,
) -> Result<Json<CartItem>, AppError> {
    use buks_shop::schema::cart_items;

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    let res = diesel::update(
        cart_items::table
            .find(id)
            .filter(cart_items::customer_id.eq(claims.sub)),
    )
    .set(cart_items::quantity.eq(payload.quantity))
    .returning(CartItem::as_returning())
    .get_result(&mut conn)
    .await?;

    Ok(Json(res))
}

pub async fn remove_item(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<CartItem>, AppError> {
    use buks_shop::schema::cart_items;

    let mut conn = state.pool.get().await?;

    let res = diesel::delete(
        cart_items::table
            .find(id)
            .filter(cart_items::customer_id.eq(claims.sub)),
    )
    .returning(CartItem::as_returning())
    .get_result(&mut conn)
    .await?;

    Ok(Json(res))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<serde_json::Value>, AppError> {
    use buks_shop::schema::cart_items;

    let mut conn = state.pool.get().await?;

    let removed =
        diesel::delete(cart_items::table.filter(cart_items::customer_id.eq(claims.sub)))
            .execute(&mut conn)
            .await?;

    Ok(Json(serde_json::json!({ "removed": removed })))
}
