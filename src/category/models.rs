use buks_shop::schema::categories;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Serialize)]
#[diesel(table_name=categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Category {
    pub id: i32,
    pub title: String,
}

#[derive(Insertable, AsChangeset, Deserialize, Validate)]
#[diesel(table_name=categories)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 50))]
    pub title: String,
}
