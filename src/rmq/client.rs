use std::sync::Arc;

use futures_util::stream::StreamExt;
use lapin::{BasicProperties, Connection, ConnectionProperties, options::*, types::FieldTable};
use tokio_executor_trait::Tokio as TokioExec;
use tokio_reactor_trait::Tokio as TokioReactor;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::notification::email;
use crate::notification::models::ShopEvent;
use crate::utils::AppError;

pub const EVENT_QUEUE: &str = "shop.events";

async fn connect(url: &str) -> Result<Connection, lapin::Error> {
    Connection::connect(
        url,
        ConnectionProperties::default()
            .with_executor(TokioExec::current())
            .with_reactor(TokioReactor),
    )
    .await
}

/// Publishes a shop event to the mail queue. Best-effort: when no queue is
/// configured this is a no-op, and callers log rather than propagate errors
/// so the request path never fails on queue trouble.
pub async fn publish_event(config: &Config, event: &ShopEvent) -> Result<(), AppError> {
    let Some(url) = config.rmq_url.as_deref() else {
        debug!("RMQ_URL not configured, skipping event publish");
        return Ok(());
    };

    let payload = serde_json::to_vec(event)?;

    let channel = connect(url).await?.create_channel().await?;

    channel
        .queue_declare(
            EVENT_QUEUE,
            QueueDeclareOptions::default(),
            FieldTable::default(),
        )
        .await?;

    channel
        .basic_publish(
            "",
            EVENT_QUEUE,
            BasicPublishOptions::default(),
            &payload,
            BasicProperties::default(),
        )
        .await?
        .await?;

    Ok(())
}

async fn consume(url: &str, consumer_tag: &str, config: Arc<Config>) -> Result<(), lapin::Error> {
    let channel = connect(url).await?.create_channel().await?;

    channel
        .queue_declare(
            EVENT_QUEUE,
            QueueDeclareOptions::default(),
            FieldTable::default(),
        )
        .await?;

    let mut consumer = channel
        .basic_consume(
            EVENT_QUEUE,
            consumer_tag,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    info!("mail consumer listening on {EVENT_QUEUE}");

    while let Some(delivery) = consumer.next().await {
        let delivery = delivery?;

        match serde_json::from_slice::<ShopEvent>(&delivery.data) {
            Ok(event) => {
                let config = config.clone();
                let sent = tokio::task::spawn_blocking(move || {
                    email::send_event_email(&config, &event)
                })
                .await;

                match sent {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!("failed to send event email: {e}"),
                    Err(e) => error!("mail task panicked: {e}"),
                }
            }
            Err(e) => error!(
                "failed to parse queued event: {e}: {}",
                String::from_utf8_lossy(&delivery.data)
            ),
        }

        delivery.ack(BasicAckOptions::default()).await?;
    }

    Ok(())
}

pub fn spawn_consumer(config: Arc<Config>) {
    tokio::spawn(async move {
        let Some(url) = config.rmq_url.clone() else {
            info!("RMQ_URL not configured, mail consumer disabled");
            return;
        };

        if let Err(e) = consume(&url, "shop-mailer", config).await {
            error!("mail consumer stopped: {e}");
        }
    });
}
