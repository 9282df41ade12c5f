use buks_shop::schema::notifications;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification kinds written by the order lifecycle and auth flows.
pub mod kind {
    pub const WELCOME: &str = "welcome";
    pub const ORDER_PLACED: &str = "order_placed";
    pub const ORDER_PAID: &str = "order_paid";
    pub const ORDER_FAILED: &str = "order_failed";
    pub const ORDER_CANCELED: &str = "order_canceled";
    pub const ORDER_DISPATCHED: &str = "order_dispatched";
    pub const ORDER_DELIVERED: &str = "order_delivered";
}

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize)]
#[diesel(table_name=notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    pub id: i32,
    pub user_id: Uuid,
    pub message: String,
    pub kind: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name=notifications)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub message: String,
    pub kind: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

/// Events published to the mail queue by the request path and consumed by
/// the spawned mailer.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShopEvent {
    OrderPlaced {
        order_id: i32,
        customer_name: Option<String>,
        customer_email: Option<String>,
        total_amount: f64,
        currency: String,
    },
    OrderPaid {
        order_id: i32,
        customer_name: Option<String>,
        customer_email: Option<String>,
    },
    OrderFailed {
        order_id: i32,
        customer_name: Option<String>,
        customer_email: Option<String>,
    },
    OrderCanceled {
        order_id: i32,
        customer_name: Option<String>,
        customer_email: Option<String>,
    },
    SubscriberJoined {
        full_name: String,
        email: String,
    },
}
