use axum::extract::{Json, State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use validator::Validate;

use super::models::{CreateReviewRequest, NewReview, Review, Testimonial};
use crate::auth::models::AccessTokenClaims;
use crate::state::AppState;
use crate::utils::AppError;

pub async fn create_review(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<Json<Review>, AppError> {
    use buks_shop::schema::{orders, reviews};

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    if let Some(order_id) = payload.order_id {
        let owner: Option<uuid::Uuid> = orders::table
            .find(order_id)
            .select(orders::customer_id)
            .first::<Option<uuid::Uuid>>(&mut conn)
            .await
            .optional()?
            .flatten();

        if owner != Some(claims.sub) {
            return Err(AppError::Forbidden("not your order".to_string()));
        }
    }

    // the unique (customer_id, order_id) index turns a second attempt
    // into a 409
    let res = diesel::insert_into(reviews::table)
        .values(&NewReview {
            customer_id: claims.sub,
            order_id: payload.order_id,
            rating: payload.rating,
            comment: payload.comment,
        })
        .returning(Review::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn get_recent_reviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<Testimonial>>, AppError> {
    use buks_shop::schema::{customers, reviews};

    let mut conn = state.pool.get().await?;

    let res = reviews::table
        .inner_join(customers::table)
        .order(reviews::created_at.desc())
        .limit(12)
        .select((
            reviews::rating,
            reviews::comment,
            reviews::created_at,
            customers::full_name,
            customers::profile_url,
        ))
        .load::<Testimonial>(&mut conn)
        .await?;

    Ok(Json(res))
}
