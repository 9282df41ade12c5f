use axum::{Router, routing::post};

use super::handlers::handle_webhook;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new().route("/webhooks/payment", post(handle_webhook))
}
