use buks_shop::schema::reviews;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize)]
#[diesel(table_name=reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Review {
    pub id: i32,
    pub customer_id: Uuid,
    pub order_id: Option<i32>,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name=reviews)]
pub struct NewReview {
    pub customer_id: Uuid,
    pub order_id: Option<i32>,
    pub rating: i32,
    pub comment: String,
}

#[derive(Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub order_id: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

/// Testimonial shape for the landing page.
#[derive(Queryable, Serialize)]
pub struct Testimonial {
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_avatar: Option<String>,
}
