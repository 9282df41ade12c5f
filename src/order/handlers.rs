use axum::extract::{Json, Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::models::{
    Order, OrderDetail, OrderItem, OrderStatus, OrdersQuery, UpdateStatusRequest, item_status,
};
use crate::auth::models::{AccessTokenClaims, ROLE_ADMIN, claims_from_headers};
use crate::notification::handlers::record;
use crate::notification::models::{NewNotification, ShopEvent, kind};
use crate::product::models::Product;
use crate::rmq;
use crate::state::AppState;
use crate::utils::AppError;

/// Name and email shown in admin notifications and mail. Guest orders get
/// a placeholder name and no email.
pub struct Contact {
    pub name: String,
    pub email: Option<String>,
}

pub async fn customer_contact(
    conn: &mut AsyncPgConnection,
    customer_id: Option<Uuid>,
) -> Result<Contact, diesel::result::Error> {
    use buks_shop::schema::customers;

    let Some(id) = customer_id else {
        return Ok(Contact {
            name: "Guest".to_string(),
            email: None,
        });
    };

    let row = customers::table
        .find(id)
        .select((customers::full_name, customers::email))
        .first::<(String, String)>(conn)
        .await
        .optional()?;

    Ok(match row {
        Some((name, email)) => Contact {
            name,
            email: Some(email),
        },
        None => Contact {
            name: "Guest".to_string(),
            email: None,
        },
    })
}

/// Compare-and-set status update. Returns false when the order was not in
/// `from`, which callers treat as "someone else already moved it".
pub async fn transition(
    conn: &mut AsyncPgConnection,
    order_id: i32,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<bool, diesel::result::Error> {
    use buks_shop::schema::orders;

    let updated = diesel::update(
        orders::table
            .find(order_id)
            .filter(orders::status.eq(from.as_str())),
    )
    .set((
        orders::status.eq(to.as_str()),
        orders::updated_at.eq(Utc::now()),
    ))
    .execute(conn)
    .await?;

    Ok(updated > 0)
}

/// The three ways a pending order can settle once the gateway reports an
/// outcome.
#[derive(Clone, Copy)]
enum Settlement {
    Paid,
    Failed,
    Canceled,
}

impl Settlement {
    fn order_status(self) -> OrderStatus {
        match self {
            Settlement::Paid => OrderStatus::Paid,
            Settlement::Failed => OrderStatus::Failed,
            Settlement::Canceled => OrderStatus::Canceled,
        }
    }

    fn item_state(self) -> &'static str {
        match self {
            Settlement::Paid => item_status::FULFILLED,
            Settlement::Failed => item_status::FAILED,
            Settlement::Canceled => item_status::CANCELED,
        }
    }

    fn kind(self) -> &'static str {
        match self {
            Settlement::Paid => kind::ORDER_PAID,
            Settlement::Failed => kind::ORDER_FAILED,
            Settlement::Canceled => kind::ORDER_CANCELED,
        }
    }

    fn customer_message(self, order_id: i32) -> String {
        match self {
            Settlement::Paid => format!("Your order (#{order_id}) has been paid successfully."),
            Settlement::Failed => {
                format!("Payment for your order (#{order_id}) failed. Please try again.")
            }
            Settlement::Canceled => {
                format!("Your order (#{order_id}) was canceled because checkout expired.")
            }
        }
    }

    fn admin_message(self, order_id: i32, name: &str) -> String {
        match self {
            Settlement::Paid => format!("Order (#{order_id}) is now paid by {name}."),
            Settlement::Failed => format!("Payment failed for order (#{order_id}) by {name}."),
            Settlement::Canceled => {
                format!("Order (#{order_id}) by {name} was canceled because checkout expired.")
            }
        }
    }

    fn event(self, order_id: i32, contact: &Contact) -> ShopEvent {
        let customer_name = Some(contact.name.clone());
        let customer_email = contact.email.clone();
        match self {
            Settlement::Paid => ShopEvent::OrderPaid {
                order_id,
                customer_name,
                customer_email,
            },
            Settlement::Failed => ShopEvent::OrderFailed {
                order_id,
                customer_name,
                customer_email,
            },
            Settlement::Canceled => ShopEvent::OrderCanceled {
                order_id,
                customer_name,
                customer_email,
            },
        }
    }
}

/// Settles a pending order in one transaction: the status flip, the item
/// states, the cart sweep for paid orders, and the notification rows all
/// land together or not at all.
///
/// Returns false without side effects when the order already left
/// `pending`, so webhook retries and the success-page fallback can both
/// call this without double-processing.
async fn settle_order(
    state: &AppState,
    order: &Order,
    settlement: Settlement,
    payment_intent: Option<&str>,
) -> Result<bool, AppError> {
    use buks_shop::schema::{cart_items, order_items, orders};

    let mut conn = state.pool.get().await?;
    let contact = customer_contact(&mut conn, order.customer_id).await?;

    let mut rows = vec![NewNotification {
        user_id: state.config.admin_user_id,
        message: settlement.admin_message(order.id, &contact.name),
        kind: settlement.kind().to_string(),
        customer_name: Some(contact.name.clone()),
        customer_email: contact.email.clone(),
    }];
    if let Some(customer_id) = order.customer_id {
        rows.push(NewNotification {
            user_id: customer_id,
            message: settlement.customer_message(order.id),
            kind: settlement.kind().to_string(),
            customer_name: None,
            customer_email: None,
        });
    }

    let changed = conn
        .transaction::<bool, AppError, _>(|conn| {
            async move {
                if !transition(conn, order.id, OrderStatus::Pending, settlement.order_status())
                    .await?
                {
                    return Ok(false);
                }

                if let Some(intent) = payment_intent {
                    diesel::update(orders::table.find(order.id))
                        .set(orders::provider_payment_intent_id.eq(intent))
                        .execute(conn)
                        .await?;
                }

                diesel::update(order_items::table.filter(order_items::order_id.eq(order.id)))
                    .set(order_items::status.eq(settlement.item_state()))
                    .execute(conn)
                    .await?;

                if let (Settlement::Paid, Some(customer_id)) = (settlement, order.customer_id) {
                    diesel::delete(
                        cart_items::table.filter(cart_items::customer_id.eq(customer_id)),
                    )
                    .execute(conn)
                    .await?;
                }

                record(conn, rows).await?;

                Ok(true)
            }
            .scope_boxed()
        })
        .await?;

    if changed {
        let event = settlement.event(order.id, &contact);
        if let Err(e) = rmq::publish_event(&state.config, &event).await {
            warn!("failed to publish order event: {e}");
        }
    }

    Ok(changed)
}

pub async fn mark_order_paid(
    state: &AppState,
    order: &Order,
    payment_intent: Option<&str>,
) -> Result<bool, AppError> {
    settle_order(state, order, Settlement::Paid, payment_intent).await
}

pub async fn mark_order_failed(
    state: &AppState,
    order: &Order,
    payment_intent: Option<&str>,
) -> Result<bool, AppError> {
    settle_order(state, order, Settlement::Failed, payment_intent).await
}

pub async fn mark_order_canceled(state: &AppState, order: &Order) -> Result<bool, AppError> {
    settle_order(state, order, Settlement::Canceled, None).await
}

/// `GET /orders`. With `?session_id=` this is the public success-page
/// lookup; without it, the admin's view of all orders.
pub async fn get_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<OrdersQuery>,
) -> Result<Response, AppError> {
    use buks_shop::schema::orders;

    if let Some(session_id) = params.session_id {
        let detail = get_order_by_session(&state, &session_id).await?;
        return Ok(Json(detail).into_response());
    }

    let claims = claims_from_headers(&headers, &state.config.jwt_secret)?;
    if !claims.is_admin() {
        return Err(AppError::Forbidden("admin access required".to_string()));
    }

    let mut conn = state.pool.get().await?;

    let res = orders::table
        .order(orders::created_at.desc())
        .select(Order::as_select())
        .load(&mut conn)
        .await?;

    Ok(Json(res).into_response())
}

/// Success-page lookup by checkout session id. If the order is still
/// pending the gateway is asked directly, so a slow or lost webhook does
/// not leave the customer staring at an unpaid order.
async fn get_order_by_session(
    state: &AppState,
    session_id: &str,
) -> Result<OrderDetail, AppError> {
    use buks_shop::schema::orders;

    let mut conn = state.pool.get().await?;

    let mut order = orders::table
        .filter(orders::provider_session_id.eq(session_id))
        .select(Order::as_select())
        .get_result(&mut conn)
        .await?;

    if order.status == OrderStatus::Pending.as_str() {
        match state.payments.retrieve_checkout_session(session_id).await {
            Ok(session) if session.is_paid() => {
                drop(conn);
                mark_order_paid(state, &order, session.payment_intent.as_deref()).await?;
                conn = state.pool.get().await?;
                order = orders::table
                    .filter(orders::provider_session_id.eq(session_id))
                    .select(Order::as_select())
                    .get_result(&mut conn)
                    .await?;
            }
            Ok(_) => {}
            Err(e) => warn!("could not reconcile session {session_id}: {e}"),
        }
    }

    let items = load_items(&mut conn, order.id).await?;

    Ok(OrderDetail::assemble(order, items))
}

async fn load_items(
    conn: &mut AsyncPgConnection,
    order_id: i32,
) -> Result<Vec<(OrderItem, Product)>, diesel::result::Error> {
    use buks_shop::schema::{order_items, products};

    order_items::table
        .inner_join(products::table)
        .filter(order_items::order_id.eq(order_id))
        .select((OrderItem::as_select(), Product::as_select()))
        .load(conn)
        .await
}

pub async fn get_my_orders(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<Vec<Order>>, AppError> {
    use buks_shop::schema::orders;

    let mut conn = state.pool.get().await?;

    let res = orders::table
        .filter(orders::customer_id.eq(claims.sub))
        .order(orders::created_at.desc())
        .select(Order::as_select())
        .load(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn get_order_by_id(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<OrderDetail>, AppError> {
    use buks_shop::schema::orders;

    let mut conn = state.pool.get().await?;

    let order = orders::table
        .find(id)
        .select(Order::as_select())
        .get_result(&mut conn)
        .await?;

    if order.customer_id != Some(claims.sub) && claims.role != ROLE_ADMIN {
        return Err(AppError::Forbidden("not your order".to_string()));
    }

    let items = load_items(&mut conn, order.id).await?;

    Ok(Json(OrderDetail::assemble(order, items)))
}

/// Fulfillment updates. Admins move paid orders to `dispatched`; the
/// customer confirms `delivered`. Settlement statuses belong to the
/// payment flow and are rejected here.
pub async fn update_status(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    use buks_shop::schema::orders;

    let target = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::Validation(format!("unknown status '{}'", payload.status)))?;

    let mut conn = state.pool.get().await?;

    let order = orders::table
        .find(id)
        .select(Order::as_select())
        .get_result(&mut conn)
        .await?;

    match target {
        OrderStatus::Dispatched => {
            if claims.role != ROLE_ADMIN {
                return Err(AppError::Forbidden("admin access required".to_string()));
            }
        }
        OrderStatus::Delivered => {
            if order.customer_id != Some(claims.sub) && claims.role != ROLE_ADMIN {
                return Err(AppError::Forbidden("not your order".to_string()));
            }
        }
        _ => {
            return Err(AppError::Validation(format!(
                "status '{target}' cannot be set directly"
            )));
        }
    }

    let current = OrderStatus::parse(&order.status)
        .ok_or_else(|| AppError::Internal(format!("order {id} has bad status '{}'", order.status)))?;

    if !current.can_transition(target) {
        return Err(AppError::Conflict(format!(
            "cannot move order from '{current}' to '{target}'"
        )));
    }

    if !transition(&mut conn, id, current, target).await? {
        return Err(AppError::Conflict(format!(
            "order is no longer '{current}'"
        )));
    }

    match target {
        OrderStatus::Dispatched => {
            if let Some(customer_id) = order.customer_id {
                record(
                    &mut conn,
                    vec![NewNotification {
                        user_id: customer_id,
                        message: format!("Your order (#{id}) has been dispatched."),
                        kind: kind::ORDER_DISPATCHED.to_string(),
                        customer_name: None,
                        customer_email: None,
                    }],
                )
                .await?;
            }
        }
        OrderStatus::Delivered => {
            let contact = customer_contact(&mut conn, order.customer_id).await?;
            record(
                &mut conn,
                vec![NewNotification {
                    user_id: state.config.admin_user_id,
                    message: format!(
                        "{} confirmed delivery for order (#{id}).",
                        contact.name
                    ),
                    kind: kind::ORDER_DELIVERED.to_string(),
                    customer_name: Some(contact.name),
                    customer_email: contact.email,
                }],
            )
            .await?;
        }
        _ => {}
    }

    Ok(Json(json!({ "id": id, "status": target.as_str() })))
}
