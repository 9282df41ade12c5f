use axum::{
    Router,
    routing::{get, patch},
};

use super::handlers::{get_my_orders, get_order_by_id, get_orders, update_status};
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(get_orders))
        .route("/orders/mine", get(get_my_orders))
        .route("/orders/{id}", get(get_order_by_id))
        .route("/orders/{id}/status", patch(update_status))
}
