//! In-process notification fan-out. Each user reads from their own topic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub resource_id: Option<Uuid>,
    pub resource_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: Uuid, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            message: message.into(),
            resource_id: None,
            resource_type: None,
            created_at: Utc::now(),
        }
    }

    pub fn about(mut self, resource_type: &str, resource_id: Uuid) -> Self {
        self.resource_type = Some(resource_type.to_string());
        self.resource_id = Some(resource_id);
        self
    }
}

/// Destination a user's notifications are addressed to.
pub fn topic(user_id: Uuid) -> String {
    format!("/user/{user_id}/queue/notifications")
}

/// Delivery must never fail the action that triggered it.
pub trait Notifier: Send + Sync {
    fn publish(&self, notification: Notification);
}

#[derive(Clone)]
pub struct NotificationHub {
    sender: broadcast::Sender<Notification>,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self, user_id: Uuid) -> Subscription {
        Subscription {
            user_id,
            receiver: self.sender.subscribe(),
        }
    }
}

impl Notifier for NotificationHub {
    fn publish(&self, notification: Notification) {
        let destination = topic(notification.user_id);
        // An error only means nobody is subscribed right now
        match self.sender.send(notification) {
            Ok(receivers) => debug!(%destination, receivers, "notification published"),
            Err(_) => debug!(%destination, "notification dropped, no subscribers"),
        }
    }
}

/// One user's view of the hub.
pub struct Subscription {
    user_id: Uuid,
    receiver: broadcast::Receiver<Notification>,
}

impl Subscription {
    pub fn topic(&self) -> String {
        topic(self.user_id)
    }

    /// Waits for the next notification addressed to this user. Returns
    /// `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(n) if n.user_id == self.user_id => return Some(n),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "notification subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`Subscription::recv`].
    pub fn try_recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.try_recv() {
                Ok(n) if n.user_id == self.user_id => return Some(n),
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_is_per_user() {
        let id = Uuid::nil();
        assert_eq!(topic(id), "/user/00000000-0000-0000-0000-000000000000/queue/notifications");
    }

    #[tokio::test]
    async fn subscribers_only_see_their_own_notifications() {
        let hub = NotificationHub::new(8);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut alice_sub = hub.subscribe(alice);

        hub.publish(Notification::new(bob, "Task assigned", "for bob"));
        hub.publish(Notification::new(alice, "Task assigned", "for alice"));

        let received = alice_sub.recv().await.unwrap();
        assert_eq!(received.message, "for alice");
        assert!(alice_sub.try_recv().is_none());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let hub = NotificationHub::default();
        hub.publish(Notification::new(Uuid::new_v4(), "Deliverable approved", "ok"));
    }

    #[test]
    fn serializes_camel_case() {
        let n = Notification::new(Uuid::nil(), "t", "m").about("TASK", Uuid::nil());
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["resourceType"], "TASK");
        assert!(value.get("userId").is_some());
    }
}
