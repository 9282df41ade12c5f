use axum::extract::{Json, State};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};
use tracing::warn;
use validator::Validate;

use super::models::{CheckoutRequest, CheckoutResponse, price_cart};
use crate::delivery::handlers::load_bands;
use crate::delivery::models::pick_fee;
use crate::notification::handlers::record;
use crate::notification::models::{NewNotification, ShopEvent, kind};
use crate::order::handlers::customer_contact;
use crate::order::models::{NewOrder, NewOrderItem, Order, OrderStatus, item_status};
use crate::payments::{CreateSessionRequest, SessionLineItem, client::to_minor_units};
use crate::product::models::Product;
use crate::rmq;
use crate::state::AppState;
use crate::utils::AppError;

/// Creates a hosted checkout session and records the matching pending
/// order. Everything the gateway charges is derived server-side: prices
/// and weights come from the catalog and the delivery fee from the
/// configured weight bands, so a tampered payload can only change
/// quantities of real products.
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    use buks_shop::schema::{order_items, orders, products};

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    let ids: Vec<i32> = payload.items.iter().map(|i| i.product_id).collect();
    let catalog: Vec<Product> = products::table
        .filter(products::id.eq_any(&ids))
        .select(Product::as_select())
        .load(&mut conn)
        .await?;

    let cart = price_cart(&catalog, &payload.items)?;

    let bands = load_bands(&mut conn).await?;
    let delivery_fee = pick_fee(&bands, cart.total_weight);
    let total_amount = cart.subtotal + delivery_fee;

    let contact = customer_contact(&mut conn, payload.customer_id).await?;

    let mut line_items: Vec<SessionLineItem> = cart
        .lines
        .iter()
        .map(|line| SessionLineItem {
            name: line.name.clone(),
            description: line.description.clone(),
            image_url: line.image_url.clone(),
            unit_amount: to_minor_units(line.unit_price),
            quantity: line.quantity as i64,
        })
        .collect();
    if delivery_fee > 0.0 {
        line_items.push(SessionLineItem {
            name: "Delivery Fee".to_string(),
            description: format!("Shipping for a {:.2}kg package", cart.total_weight),
            image_url: None,
            unit_amount: to_minor_units(delivery_fee),
            quantity: 1,
        });
    }

    let session = state
        .payments
        .create_checkout_session(&CreateSessionRequest {
            currency: state.config.currency.clone(),
            customer_email: contact.email.clone(),
            success_url: format!(
                "{}/success?session_id={{CHECKOUT_SESSION_ID}}",
                state.config.base_url
            ),
            cancel_url: format!("{}/cart", state.config.base_url),
            line_items,
        })
        .await?;

    let new_order = NewOrder {
        customer_id: payload.customer_id,
        status: OrderStatus::Pending.as_str().to_string(),
        subtotal: cart.subtotal,
        delivery_fee,
        total_amount,
        total_weight: cart.total_weight,
        currency: state.config.currency.clone(),
        payment_provider: "stripe".to_string(),
        provider_session_id: Some(session.id.clone()),
    };

    let admin_user_id = state.config.admin_user_id;
    let contact_name = contact.name.clone();
    let contact_email = contact.email.clone();
    let order = conn
        .transaction::<Order, AppError, _>(|conn| {
            async move {
                let order: Order = diesel::insert_into(orders::table)
                    .values(&new_order)
                    .returning(Order::as_returning())
                    .get_result(conn)
                    .await?;

                let items: Vec<NewOrderItem> = cart
                    .lines
                    .iter()
                    .map(|line| NewOrderItem {
                        order_id: order.id,
                        product_id: line.product_id,
                        quantity: line.quantity,
                        unit_price: line.unit_price,
                        total_price: line.line_total(),
                        status: item_status::PENDING.to_string(),
                    })
                    .collect();
                diesel::insert_into(order_items::table)
                    .values(&items)
                    .execute(conn)
                    .await?;

                let mut rows = vec![NewNotification {
                    user_id: admin_user_id,
                    message: format!("New order (#{}) placed by {contact_name}.", order.id),
                    kind: kind::ORDER_PLACED.to_string(),
                    customer_name: Some(contact_name.clone()),
                    customer_email: contact_email,
                }];
                if let Some(customer_id) = new_order.customer_id {
                    rows.push(NewNotification {
                        user_id: customer_id,
                        message: format!(
                            "You placed an order (#{}). We'll let you know when it ships.",
                            order.id
                        ),
                        kind: kind::ORDER_PLACED.to_string(),
                        customer_name: None,
                        customer_email: None,
                    });
                }
                record(conn, rows).await?;

                Ok(order)
            }
            .scope_boxed()
        })
        .await?;

    let event = ShopEvent::OrderPlaced {
        order_id: order.id,
        customer_name: Some(contact.name),
        customer_email: contact.email,
        total_amount,
        currency: state.config.currency.clone(),
    };
    if let Err(e) = rmq::publish_event(&state.config, &event).await {
        warn!("failed to publish order event: {e}");
    }

    Ok(Json(CheckoutResponse {
        url: session.url,
        session_id: session.id,
        order_id: order.id,
    }))
}
