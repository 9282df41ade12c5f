use axum::{Router, routing::post};

use super::handlers::subscribe;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new().route("/newsletter", post(subscribe))
}
