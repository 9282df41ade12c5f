use std::fmt;

use buks_shop::schema::{order_items, orders};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::product::models::Product;

/// Order lifecycle. `Pending` is the only state the payment webhook may
/// move an order out of, which is what makes webhook replays harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
    Canceled,
    Dispatched,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Dispatched => "dispatched",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "failed" => Some(OrderStatus::Failed),
            "canceled" => Some(OrderStatus::Canceled),
            "dispatched" => Some(OrderStatus::Dispatched),
            "delivered" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }

    pub fn can_transition(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid | Failed | Canceled) | (Paid, Dispatched) | (Dispatched, Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-line fulfillment states mirrored onto order items.
pub mod item_status {
    pub const PENDING: &str = "pending";
    pub const FULFILLED: &str = "fulfilled";
    pub const FAILED: &str = "failed";
    pub const CANCELED: &str = "canceled";
}

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Serialize)]
#[diesel(table_name=orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Order {
    pub id: i32,
    pub customer_id: Option<Uuid>,
    pub status: String,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total_amount: f64,
    pub total_weight: f64,
    pub currency: String,
    pub payment_provider: String,
    pub provider_session_id: Option<String>,
    pub provider_payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name=orders)]
pub struct NewOrder {
    pub customer_id: Option<Uuid>,
    pub status: String,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total_amount: f64,
    pub total_weight: f64,
    pub currency: String,
    pub payment_provider: String,
    pub provider_session_id: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Serialize)]
#[diesel(table_name=order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
    pub status: String,
}

#[derive(Insertable)]
#[diesel(table_name=order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
    pub status: String,
}

#[derive(Deserialize)]
pub struct OrdersQuery {
    pub session_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// The success-page view of an order: the row plus its lines with product
/// details inlined.
#[derive(Serialize)]
pub struct OrderDetail {
    pub id: i32,
    pub status: String,
    pub total_amount: f64,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemDetail>,
}

#[derive(Serialize)]
pub struct OrderItemDetail {
    pub id: i32,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
    pub product_id: i32,
    pub product_name: String,
    pub product_description: String,
    pub product_image: Option<String>,
}

impl OrderDetail {
    pub fn assemble(order: Order, items: Vec<(OrderItem, Product)>) -> Self {
        Self {
            id: order.id,
            status: order.status,
            total_amount: order.total_amount,
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            currency: order.currency,
            created_at: order.created_at,
            items: items
                .into_iter()
                .map(|(item, product)| OrderItemDetail {
                    id: item.id,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    total_price: item.total_price,
                    product_id: product.id,
                    product_name: product.name,
                    product_description: product.description,
                    product_image: product.image_url,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;
    use super::*;

    #[test]
    fn pending_can_settle_three_ways() {
        assert!(Pending.can_transition(Paid));
        assert!(Pending.can_transition(Failed));
        assert!(Pending.can_transition(Canceled));
    }

    #[test]
    fn fulfillment_is_linear() {
        assert!(Paid.can_transition(Dispatched));
        assert!(Dispatched.can_transition(Delivered));
        assert!(!Paid.can_transition(Delivered));
        assert!(!Pending.can_transition(Dispatched));
    }

    #[test]
    fn settled_orders_cannot_regress() {
        for settled in [Paid, Failed, Canceled, Delivered] {
            assert!(!settled.can_transition(Pending));
        }
        assert!(!Paid.can_transition(Failed));
        assert!(!Delivered.can_transition(Dispatched));
        assert!(!Failed.can_transition(Paid));
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [Pending, Paid, Failed, Canceled, Dispatched, Delivered] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
    }
}
