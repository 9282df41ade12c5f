use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{create_review, get_recent_reviews};
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", post(create_review))
        .route("/reviews/recent", get(get_recent_reviews))
}
