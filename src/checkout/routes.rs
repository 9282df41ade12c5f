use axum::{Router, routing::post};

use super::handlers::create_checkout;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new().route("/checkout", post(create_checkout))
}
