//! Persists notifications and pushes them to the recipient's live connections.

use std::collections::HashSet;
use std::sync::Arc;

use bson::{oid::ObjectId, DateTime};
use drinkup_db::models::Notification;
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::dao::base::{DaoError, DaoResult};
use crate::realtime::{DeliveryError, NotificationTransport, RECEIVE_NOTIFICATION_EVENT};
use crate::store::NotificationStore;

/// Wire shape of a notification pushed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    pub id: Option<String>,
    pub user_id: String,
    pub notification_type: String,
    pub title: String,
    pub body: String,
    pub metadata: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<&Notification> for NotificationPayload {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.map(|id| id.to_hex()),
            user_id: n.user_id.to_hex(),
            notification_type: n.notification_type.clone(),
            title: n.title.clone(),
            body: n.body.clone(),
            metadata: n.metadata.clone(),
            is_read: n.is_read,
            created_at: n.created_at.to_chrono().to_rfc3339(),
        }
    }
}

/// Outcome of a multi-recipient delivery.
#[derive(Debug, Default)]
pub struct FanOutReport {
    /// Recipients reached, with the number of connections that got the event.
    pub delivered: Vec<(ObjectId, usize)>,
    pub failed: Vec<(ObjectId, DeliveryError)>,
}

impl FanOutReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    transport: Arc<dyn NotificationTransport>,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        transport: Arc<dyn NotificationTransport>,
    ) -> Self {
        Self { store, transport }
    }

    /// Stores a new unread notification, then pushes it to the recipient.
    ///
    /// A storage failure is returned and nothing is sent. A delivery failure
    /// is only logged; the stored record stays for later retrieval.
    pub async fn create_and_send(
        &self,
        user_id: ObjectId,
        notification_type: &str,
        title: &str,
        body: &str,
        metadata: Option<&serde_json::Value>,
    ) -> DaoResult<Notification> {
        let metadata = metadata
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DaoError::Validation(format!("Invalid notification metadata: {e}")))?;

        let notification = Notification {
            id: Some(ObjectId::new()),
            user_id,
            notification_type: notification_type.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            metadata,
            is_read: false,
            read_at: None,
            created_at: DateTime::now(),
        };

        let persisted = self.store.create(notification).await?;

        if let Err(e) = self.send(user_id, &persisted).await {
            warn!(%user_id, notification_id = ?persisted.id, %e, "Notification stored but not delivered");
        }

        Ok(persisted)
    }

    /// Pushes `notification` to every live connection of `user_id`.
    /// Returns the number of connections reached; an offline user gets 0.
    pub async fn send(
        &self,
        user_id: ObjectId,
        notification: &Notification,
    ) -> Result<usize, DeliveryError> {
        let payload = serde_json::to_value(NotificationPayload::from(notification))?;
        let delivered = self
            .transport
            .send_to_group(&user_id.to_hex(), RECEIVE_NOTIFICATION_EVENT, &payload)
            .await?;
        debug!(%user_id, delivered, "Notification sent");
        Ok(delivered)
    }

    /// Delivers the same notification to each distinct recipient concurrently.
    /// Every delivery is awaited; one failure never stops the others.
    pub async fn send_to_many(
        &self,
        user_ids: &[ObjectId],
        notification: &Notification,
    ) -> FanOutReport {
        let mut seen = HashSet::new();
        let recipients: Vec<ObjectId> = user_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let outcomes = join_all(recipients.into_iter().map(|user_id| async move {
            (user_id, self.send(user_id, notification).await)
        }))
        .await;

        let mut report = FanOutReport::default();
        for (user_id, outcome) in outcomes {
            match outcome {
                Ok(count) => report.delivered.push((user_id, count)),
                Err(e) => {
                    warn!(%user_id, %e, "Fan-out delivery failed");
                    report.failed.push((user_id, e));
                }
            }
        }
        report
    }
}
