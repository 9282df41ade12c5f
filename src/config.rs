use std::{env, fmt::Display, str::FromStr};

use tracing::info;
use uuid::Uuid;

/// Runtime configuration, loaded once at startup from the environment
/// (with `.env` support via dotenvy in `main`).
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub rmq_url: Option<String>,

    pub jwt_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub admin_sign_up_key: Option<String>,
    /// Back-office account that receives admin-facing notifications.
    pub admin_user_id: Uuid,

    pub base_url: String,
    pub currency: String,
    pub payment_api_base: String,
    pub payment_secret_key: String,
    pub webhook_secret: String,
    pub webhook_tolerance_secs: i64,

    pub smtp_host: String,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub email_from: String,
    pub contact_inbox: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "3000"),
            database_url: required("DATABASE_URL"),
            rmq_url: optional("RMQ_URL"),

            jwt_secret: required("JWT_SECRET"),
            access_ttl_secs: try_load("ACCESS_TTL_SECS", "900"),
            refresh_ttl_secs: try_load("REFRESH_TTL_SECS", "1209600"),
            admin_sign_up_key: optional("ADMIN_SIGN_UP_KEY"),
            admin_user_id: try_load("ADMIN_USER_ID", "b05ec885-ed5f-4fb3-a013-849f9b6dc3e5"),

            base_url: try_load("BASE_URL", "http://localhost:3000"),
            currency: try_load("CURRENCY", "gbp"),
            payment_api_base: try_load("PAYMENT_API_BASE", "https://api.stripe.com"),
            payment_secret_key: required("PAYMENT_SECRET_KEY"),
            webhook_secret: required("PAYMENT_WEBHOOK_SECRET"),
            webhook_tolerance_secs: try_load("WEBHOOK_TOLERANCE_SECS", "300"),

            smtp_host: try_load("SMTP_HOST", "smtp.gmail.com"),
            smtp_username: optional("SMTP_USERNAME"),
            smtp_password: optional("SMTP_PASSWORD"),
            email_from: try_load("EMAIL_FROM", "Buks Snacks <no-reply@buks.shop>"),
            contact_inbox: try_load("CONTACT_INBOX", "hello@buks.shop"),
        }
    }
}

fn required(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .unwrap_or_else(|e| panic!("invalid {key} value: {e}"))
}
