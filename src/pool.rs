use diesel_async::{AsyncPgConnection, pooled_connection::AsyncDieselConnectionManager};

use crate::utils::types::Pool;

pub async fn get_pool(database_url: &str) -> Result<Pool, String> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = bb8::Pool::builder()
        .build(config)
        .await
        .map_err(|e| format!("Failed to create db pool: {}", e))?;

    Ok(pool)
}
