use buks_shop::schema::cart_items;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::product::models::Product;

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Serialize)]
#[diesel(table_name=cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItem {
    pub id: i32,
    pub customer_id: Uuid,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate)]
pub struct AddCartItem {
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Deserialize, Validate)]
pub struct UpdateCartItem {
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Serialize)]
pub struct CartLine {
    pub id: i32,
    pub quantity: i32,
    pub product: Product,
}
