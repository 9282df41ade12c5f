use axum::{
    Router,
    routing::{delete, get},
};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/delivery-fees",
            get(handlers::get_delivery_fees).post(handlers::create_delivery_fee),
        )
        .route("/delivery-fees/quote", get(handlers::quote))
        .route("/delivery-fees/{id}", delete(handlers::remove_delivery_fee))
}
