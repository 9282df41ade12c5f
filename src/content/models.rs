use buks_shop::schema::{faqs, store_info};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize)]
#[diesel(table_name=store_info)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StoreInfo {
    pub id: i32,
    pub business_name: String,
    pub business_logo: Option<String>,
    pub about: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(AsChangeset, Deserialize, Validate)]
#[diesel(table_name=store_info)]
pub struct UpdateStoreInfo {
    #[validate(length(min = 1, max = 100))]
    pub business_name: Option<String>,
    pub business_logo: Option<String>,
    pub about: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize)]
#[diesel(table_name=faqs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Faq {
    pub id: i32,
    pub question: String,
    pub answer: String,
    pub position: i32,
}

#[derive(Insertable, Deserialize, Validate)]
#[diesel(table_name=faqs)]
pub struct NewFaq {
    #[validate(length(min = 1))]
    pub question: String,
    #[validate(length(min = 1))]
    pub answer: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(AsChangeset, Deserialize, Validate)]
#[diesel(table_name=faqs)]
pub struct UpdateFaq {
    #[validate(length(min = 1))]
    pub question: Option<String>,
    #[validate(length(min = 1))]
    pub answer: Option<String>,
    pub position: Option<i32>,
}
