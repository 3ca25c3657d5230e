use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use super::{DeliveryError, NotificationTransport};

/// Outbound half of one live connection. Frames are serialized JSON text.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub connection_id: String,
    pub sender: mpsc::Sender<String>,
}

/// Tracks live connections by group key (the hex user id).
/// A user can have several connections (tabs, devices).
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    groups: DashMap<String, Vec<ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a connection. Re-attaching the same id replaces its sender.
    pub fn add_connection_to_group(
        &self,
        connection_id: &str,
        group_key: &str,
        sender: mpsc::Sender<String>,
    ) {
        let mut members = self.groups.entry(group_key.to_string()).or_default();
        members.retain(|c| c.connection_id != connection_id);
        members.push(ConnectionHandle {
            connection_id: connection_id.to_string(),
            sender,
        });
        debug!(group_key, connection_id, size = members.len(), "Connection attached");
    }

    pub fn remove_connection_from_group(&self, connection_id: &str, group_key: &str) {
        // Pruning and the emptiness check run under one shard lock.
        self.groups.remove_if_mut(group_key, |_, members| {
            members.retain(|c| c.connection_id != connection_id);
            members.is_empty()
        });
        debug!(group_key, connection_id, "Connection detached");
    }

    /// Copy of the group's handles at this instant.
    pub fn snapshot(&self, group_key: &str) -> Vec<ConnectionHandle> {
        self.groups
            .get(group_key)
            .map(|members| members.clone())
            .unwrap_or_default()
    }

    pub fn is_online(&self, group_key: &str) -> bool {
        self.groups.contains_key(group_key)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn connection_count(&self) -> usize {
        self.groups.iter().map(|g| g.value().len()).sum()
    }
}

#[async_trait]
impl NotificationTransport for ConnectionRegistry {
    async fn send_to_group(
        &self,
        group_key: &str,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<usize, DeliveryError> {
        let targets = self.snapshot(group_key);
        if targets.is_empty() {
            debug!(group_key, event_name, "No live connections");
            return Ok(0);
        }

        let frame = serde_json::to_string(&serde_json::json!({
            "type": event_name,
            "data": payload,
        }))?;

        // Never waits on a slow reader: a full queue skips that connection.
        let mut delivered = 0;
        let mut saturated = 0;
        for target in &targets {
            match target.sender.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    saturated += 1;
                    warn!(group_key, connection_id = %target.connection_id, "Connection queue full, event dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    warn!(group_key, connection_id = %target.connection_id, "Connection closed during delivery");
                }
            }
        }

        if delivered == 0 {
            if saturated > 0 {
                return Err(DeliveryError::Saturated(saturated));
            }
            return Err(DeliveryError::Closed(targets.len()));
        }
        debug!(group_key, event_name, delivered, "Event delivered");
        Ok(delivered)
    }
}
