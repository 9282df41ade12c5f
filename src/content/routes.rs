use axum::{
    Router,
    routing::{get, patch},
};

use super::handlers::{
    create_faq, get_faqs, get_store_info, remove_faq, update_faq, update_store_info,
};
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route("/store-info", get(get_store_info).patch(update_store_info))
        .route("/faqs", get(get_faqs).post(create_faq))
        .route("/faqs/{id}", patch(update_faq).delete(remove_faq))
}
