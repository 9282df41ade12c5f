use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::json;
use tracing::{debug, info};

use super::models::{GatewayEvent, GatewayObject};
use crate::order::handlers::{mark_order_canceled, mark_order_failed, mark_order_paid};
use crate::order::models::Order;
use crate::payments::signature;
use crate::state::AppState;
use crate::utils::AppError;

/// Payment gateway webhook endpoint.
///
/// The body is taken raw because the signature covers the exact bytes the
/// gateway sent. Events for sessions we do not recognize are acknowledged
/// with 200 so the gateway stops retrying them; a bad signature is the
/// only thing worth a 400.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let header = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Validation("missing signature header".to_string()))?;

    signature::verify(
        &state.config.webhook_secret,
        header,
        &body,
        Utc::now().timestamp(),
        state.config.webhook_tolerance_secs,
    )
    .map_err(|e| AppError::Validation(format!("invalid signature: {e}")))?;

    let event: GatewayEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("unreadable event payload: {e}")))?;

    match event.kind.as_str() {
        "checkout.session.completed" => {
            if let Some(order) = find_order(&state, &event.data.object).await? {
                let changed = mark_order_paid(
                    &state,
                    &order,
                    event.data.object.payment_intent.as_deref(),
                )
                .await?;
                if changed {
                    info!("order {} marked paid via webhook", order.id);
                } else {
                    debug!("order {} already settled, ignoring replay", order.id);
                }
            }
        }
        "checkout.session.expired" => {
            if let Some(order) = find_order(&state, &event.data.object).await? {
                if mark_order_canceled(&state, &order).await? {
                    info!("order {} canceled, checkout expired", order.id);
                }
            }
        }
        "payment_intent.payment_failed" | "checkout.session.async_payment_failed" => {
            if let Some(order) = find_order(&state, &event.data.object).await? {
                let changed =
                    mark_order_failed(&state, &order, event.data.object.failure_intent()).await?;
                if changed {
                    info!("order {} marked failed via webhook", order.id);
                }
            }
        }
        other => debug!("ignoring webhook event type '{other}'"),
    }

    Ok(Json(json!({ "received": true })))
}

/// Looks up the order an event refers to. Session events carry the
/// checkout session id; payment intent events carry the intent id we
/// stored when the session completed or was retrieved.
async fn find_order(
    state: &AppState,
    object: &GatewayObject,
) -> Result<Option<Order>, AppError> {
    use buks_shop::schema::orders;

    let mut conn = state.pool.get().await?;

    let order = if object.is_payment_intent() {
        orders::table
            .filter(orders::provider_payment_intent_id.eq(&object.id))
            .select(Order::as_select())
            .first(&mut conn)
            .await
            .optional()?
    } else {
        orders::table
            .filter(orders::provider_session_id.eq(&object.id))
            .select(Order::as_select())
            .first(&mut conn)
            .await
            .optional()?
    };

    if order.is_none() {
        debug!("no order for gateway object {}", object.id);
    }

    Ok(order)
}
