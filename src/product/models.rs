use buks_shop::schema::products;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Serialize)]
#[diesel(table_name=products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Unit weight in kilograms, used for delivery fee quoting.
    pub weight: f64,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
    pub is_available: bool,
    pub brand: Option<String>,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Validate)]
#[diesel(table_name=products)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.01))]
    pub price: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub weight: f64,
    pub image_url: Option<String>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_available")]
    pub is_available: bool,
    pub brand: Option<String>,
    pub category_id: Option<i32>,
}

fn default_available() -> bool {
    true
}

#[derive(AsChangeset, Deserialize, Validate)]
#[diesel(table_name=products)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.01))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    pub image_url: Option<String>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    pub is_available: Option<bool>,
    pub brand: Option<String>,
    pub category_id: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct ProductQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub category_id: Option<i32>,
    pub q: Option<String>,
    pub available: Option<bool>,
}

impl ProductQuery {
    pub fn page(&self) -> (i64, i64) {
        let offset = self.offset.unwrap_or(0).max(0);
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        (offset, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamps() {
        let query = ProductQuery {
            offset: None,
            limit: None,
            category_id: None,
            q: None,
            available: None,
        };
        assert_eq!(query.page(), (0, 20));

        let query = ProductQuery {
            offset: Some(-5),
            limit: Some(1000),
            category_id: None,
            q: None,
            available: None,
        };
        assert_eq!(query.page(), (0, 100));
    }
}
