use axum::{Router, routing::post};

use super::handlers::send_message;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new().route("/contact", post(send_message))
}
