use axum::extract::{Json, State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use validator::Validate;

use super::models::{ContactMessage, ContactRequest};
use crate::notification::email;
use crate::state::AppState;
use crate::utils::AppError;

/// Persists a contact-form submission, then forwards it to the store
/// inbox. The row is the source of truth; a mail failure is logged but
/// the sender still gets a success.
pub async fn send_message(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> Result<Json<ContactMessage>, AppError> {
    use buks_shop::schema::contact_messages;

    payload.validate()?;

    let mut conn = state.pool.get().await?;

    let saved: ContactMessage = diesel::insert_into(contact_messages::table)
        .values(&payload)
        .returning(ContactMessage::as_returning())
        .get_result(&mut conn)
        .await?;

    let config = state.config.clone();
    let id = saved.id;
    let full_name = saved.full_name.clone();
    let reply_to = saved.email.clone();
    let subject = saved.subject.clone();
    let body = saved.message.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(e) =
            email::send_contact_email(&config, &full_name, &reply_to, subject.as_deref(), &body)
        {
            warn!("failed to forward contact message #{id}: {e}");
        }
    });

    Ok(Json(saved))
}
