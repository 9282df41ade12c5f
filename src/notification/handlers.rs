use axum::extract::{Json, Path, State};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use super::models::{NewNotification, Notification};
use crate::auth::models::AccessTokenClaims;
use crate::state::AppState;
use crate::utils::AppError;

/// Inserts notification rows. Called from checkout, webhook and order
/// handlers, including inside their transactions.
pub async fn record(
    conn: &mut AsyncPgConnection,
    rows: Vec<NewNotification>,
) -> Result<usize, diesel::result::Error> {
    use buks_shop::schema::notifications;

    diesel::insert_into(notifications::table)
        .values(&rows)
        .execute(conn)
        .await
}

pub async fn get_notifications(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<Vec<Notification>>, AppError> {
    use buks_shop::schema::notifications;

    let mut conn = state.pool.get().await?;

    let res = notifications::table
        .filter(notifications::user_id.eq(claims.sub))
        .order(notifications::created_at.desc())
        .select(Notification::as_select())
        .load(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn mark_as_read(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<Notification>, AppError> {
    use buks_shop::schema::notifications;

    let mut conn = state.pool.get().await?;

    let res = diesel::update(
        notifications::table
            .find(id)
            .filter(notifications::user_id.eq(claims.sub)),
    )
    .set(notifications::read.eq(true))
    .returning(Notification::as_returning())
    .get_result(&mut conn)
    .await?;

    Ok(Json(res))
}

pub async fn mark_all_as_read(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<serde_json::Value>, AppError> {
    use buks_shop::schema::notifications;

    let mut conn = state.pool.get().await?;

    let updated = diesel::update(
        notifications::table
            .filter(notifications::user_id.eq(claims.sub))
            .filter(notifications::read.eq(false)),
    )
    .set(notifications::read.eq(true))
    .execute(&mut conn)
    .await?;

    Ok(Json(serde_json::json!({ "updated": updated })))
}
