use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::models::ShopEvent;
use crate::config::Config;

/// Renders and sends the email for a queued shop event. Blocking; callers
/// run this inside `spawn_blocking`.
pub fn send_event_email(config: &Config, event: &ShopEvent) -> Result<(), String> {
    let Some((name, email, subject, body)) = render(event) else {
        // nothing to send, e.g. a guest order with no email on file
        return Ok(());
    };

    let message = build_email(config, &name, &email, &subject, &body)?;
    deliver(config, &message)
}

/// Forwards a contact-form submission to the store inbox.
pub fn send_contact_email(
    config: &Config,
    full_name: &str,
    reply_to: &str,
    subject: Option<&str>,
    body: &str,
) -> Result<(), String> {
    let subject = match subject {
        Some(s) => format!("Contact form: {s}"),
        None => format!("Contact form message from {full_name}"),
    };
    let body = format!("From: {full_name} <{reply_to}>\n\n{body}");

    let message = build_email(config, "Buks Snacks", &config.contact_inbox, &subject, &body)?;
    deliver(config, &message)
}

fn render(event: &ShopEvent) -> Option<(String, String, String, String)> {
    match event {
        ShopEvent::OrderPlaced {
            order_id,
            customer_name,
            customer_email,
            total_amount,
            currency,
        } => Some((
            customer_name.clone().unwrap_or_else(|| "Guest".to_string()),
            customer_email.clone()?,
            format!("Order #{order_id} received"),
            format!(
                "Thanks for your order! We received order #{order_id} for {:.2} {}.\n\
                 We'll email you again once payment is confirmed.",
                total_amount,
                currency.to_uppercase()
            ),
        )),
        ShopEvent::OrderPaid {
            order_id,
            customer_name,
            customer_email,
        } => Some((
            customer_name.clone().unwrap_or_else(|| "Guest".to_string()),
            customer_email.clone()?,
            format!("Order #{order_id} confirmed"),
            format!("Your payment for order #{order_id} went through. We're packing your snacks!"),
        )),
        ShopEvent::OrderFailed {
            order_id,
            customer_name,
            customer_email,
        } => Some((
            customer_name.clone().unwrap_or_else(|| "Guest".to_string()),
            customer_email.clone()?,
            format!("Payment for order #{order_id} failed"),
            format!("Payment for order #{order_id} didn't go through. Please try again."),
        )),
        ShopEvent::OrderCanceled {
            order_id,
            customer_name,
            customer_email,
        } => Some((
            customer_name.clone().unwrap_or_else(|| "Guest".to_string()),
            customer_email.clone()?,
            format!("Order #{order_id} canceled"),
            format!("Your checkout for order #{order_id} expired and the order was canceled."),
        )),
        ShopEvent::SubscriberJoined { full_name, email } => Some((
            full_name.clone(),
            email.clone(),
            "Welcome to the Buks Snacks newsletter".to_string(),
            format!("Hi {full_name}, thanks for subscribing! Snack news coming your way."),
        )),
    }
}

fn build_email(
    config: &Config,
    receiver_name: &str,
    receiver_email: &str,
    subject: &str,
    body: &str,
) -> Result<Message, String> {
    Message::builder()
        .from(
            config
                .email_from
                .parse()
                .map_err(|e| format!("Failed to parse sender email: {e}"))?,
        )
        .to(Mailbox::new(
            Some(receiver_name.to_owned()),
            receiver_email
                .parse()
                .map_err(|e| format!("Failed to parse receiver email: {e}"))?,
        ))
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_owned())
        .map_err(|e| format!("Failed to build a message: {e}"))
}

fn deliver(config: &Config, message: &Message) -> Result<(), String> {
    let mut builder = SmtpTransport::relay(&config.smtp_host)
        .map_err(|e| format!("Wrong smtp transport: {e}"))?;

    if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
        builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
    }

    builder
        .build()
        .send(message)
        .map_err(|e| format!("failed to send an email: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_event_renders_for_known_customer() {
        let event = ShopEvent::OrderPaid {
            order_id: 42,
            customer_name: Some("Ada".to_string()),
            customer_email: Some("ada@example.com".to_string()),
        };

        let (name, email, subject, _) = render(&event).unwrap();
        assert_eq!(name, "Ada");
        assert_eq!(email, "ada@example.com");
        assert!(subject.contains("#42"));
    }

    #[test]
    fn guest_order_without_email_renders_nothing() {
        let event = ShopEvent::OrderPaid {
            order_id: 42,
            customer_name: None,
            customer_email: None,
        };
        assert!(render(&event).is_none());
    }

    #[test]
    fn placed_event_mentions_total_and_currency() {
        let event = ShopEvent::OrderPlaced {
            order_id: 7,
            customer_name: Some("Ada".to_string()),
            customer_email: Some("ada@example.com".to_string()),
            total_amount: 23.5,
            currency: "gbp".to_string(),
        };

        let (_, _, _, body) = render(&event).unwrap();
        assert!(body.contains("23.50 GBP"));
    }
}
