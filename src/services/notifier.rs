use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::models::common::NotificationKind;

/// Payload delivered to a party's notification channel
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Minor currency units; the refunded amount for REFUND_PROCESSED
    pub amount: i64,
    pub reason: Option<String>,
    pub timestamp: time::OffsetDateTime,
    pub message: String,
}

/// Best-effort notification sink. Delivery is fire-and-forget: callers
/// never let a failed send roll back or stall a financial transaction.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, party_id: Uuid, notification: Notification);
}

/// In-process per-party channels. Transport to devices or email is a
/// separate delivery service consuming these receivers.
#[derive(Default)]
pub struct ChannelNotifier {
    channels: Mutex<HashMap<Uuid, mpsc::UnboundedSender<Notification>>>,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer for a party's notifications, replacing any
    /// previous subscription for the same party.
    pub fn subscribe(&self, party_id: Uuid) -> mpsc::UnboundedReceiver<Notification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(party_id, tx);
        rx
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, party_id: Uuid, notification: Notification) {
        let sender = {
            let channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
            channels.get(&party_id).cloned()
        };

        match sender {
            Some(tx) => {
                if tx.send(notification).is_err() {
                    // Receiver dropped; prune the dead channel
                    self.channels
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .remove(&party_id);
                    debug!(party_id = %party_id, "Notification channel closed, message dropped");
                }
            }
            None => {
                debug!(party_id = %party_id, "No notification subscriber for party");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_subscribed_party() {
        let notifier = ChannelNotifier::new();
        let party_id = Uuid::new_v4();
        let mut rx = notifier.subscribe(party_id);

        notifier
            .notify(
                party_id,
                Notification {
                    kind: NotificationKind::RefundProcessed,
                    amount: 100_000,
                    reason: Some("doctor-no-response".to_string()),
                    timestamp: time::OffsetDateTime::UNIX_EPOCH,
                    message: "refund credited".to_string(),
                },
            )
            .await;

        let received = rx.try_recv().expect("notification should be delivered");
        assert_eq!(received.amount, 100_000);
        assert_eq!(received.kind, NotificationKind::RefundProcessed);
    }

    #[tokio::test]
    async fn notify_without_subscriber_is_a_noop() {
        let notifier = ChannelNotifier::new();

        // Must not panic or error
        notifier
            .notify(
                Uuid::new_v4(),
                Notification {
                    kind: NotificationKind::DoctorWarning,
                    amount: 0,
                    reason: None,
                    timestamp: time::OffsetDateTime::UNIX_EPOCH,
                    message: "warning".to_string(),
                },
            )
            .await;
    }
}
