use axum::extract::{Json, State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use validator::Validate;

use super::models::{SubscribeRequest, Subscriber};
use crate::notification::models::ShopEvent;
use crate::rmq;
use crate::state::AppState;
use crate::utils::AppError;

pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> Result<Json<Subscriber>, AppError> {
    use buks_shop::schema::subscribers;

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    let already = subscribers::table
        .filter(subscribers::email.eq(&payload.email))
        .count()
        .get_result::<i64>(&mut conn)
        .await?;
    if already > 0 {
        return Err(AppError::Conflict("email is already subscribed".to_string()));
    }

    let subscriber: Subscriber = diesel::insert_into(subscribers::table)
        .values(&payload)
        .returning(Subscriber::as_returning())
        .get_result(&mut conn)
        .await?;

    let event = ShopEvent::SubscriberJoined {
        full_name: subscriber.full_name.clone(),
        email: subscriber.email.clone(),
    };
    if let Err(e) = rmq::publish_event(&state.config, &event).await {
        warn!("failed to publish subscriber event: {e}");
    }

    Ok(Json(subscriber))
}
