use crate::gardenstock_logic::config::Config;
use crate::gardenstock_logic::model::{DeliveryRequest, OutboundNotification};
use lib_common::retrieve::json_client::JsonClient;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Drains the outbound queue and pushes each rendered message to the
/// delivery endpoint, authorized with the subscriber's own credential.
/// Results are fire-and-forget: a failed delivery is logged and dropped,
/// never retried and never propagated back into the feed pipeline.
pub async fn run(
    config: Config,
    mut outbound: mpsc::UnboundedReceiver<OutboundNotification>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let client = match JsonClient::new(Duration::from_secs(10)) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Delivery client init failed: {}", e);
            return;
        }
    };

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                log::info!("Delivery worker shutting down.");
                break;
            }
            maybe = outbound.recv() => {
                let Some(notification) = maybe else {
                    // All senders are gone; nothing left to deliver.
                    break;
                };
                let body = DeliveryRequest {
                    recipient_id: &notification.subscriber_id,
                    text: &notification.text,
                };
                if let Err(e) = client
                    .post_json(&config.delivery_url, &notification.credential, &body)
                    .await
                {
                    log::warn!(
                        "Delivery to {} failed: {}",
                        notification.subscriber_id,
                        e
                    );
                }
            }
        }
    }
}
