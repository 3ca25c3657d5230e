pub mod registry;

use async_trait::async_trait;
use thiserror::Error;

pub use registry::{ConnectionHandle, ConnectionRegistry};

/// Event name clients listen on for pushed notifications.
pub const RECEIVE_NOTIFICATION_EVENT: &str = "ReceiveNotification";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("All {0} connection(s) of the group are closed")]
    Closed(usize),
    #[error("No connection accepted the event, {0} queue(s) full")]
    Saturated(usize),
    #[error("Payload serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Group-addressed push channel to connected clients.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Sends `{"type": event_name, "data": payload}` to every connection
    /// currently in `group_key` and returns how many accepted it.
    /// Must not wait on a connection that is not draining its queue.
    async fn send_to_group(
        &self,
        group_key: &str,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<usize, DeliveryError>;
}
