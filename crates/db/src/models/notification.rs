use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    /// Free-form category such as `mention` or `invite`.
    pub notification_type: String,
    pub title: String,
    pub body: String,
    /// Opaque key-value payload, stored as serialized JSON text.
    pub metadata: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub read_at: Option<DateTime>,
    pub created_at: DateTime,
}

impl Notification {
    pub const COLLECTION: &'static str = "notifications";
}

/// Category tags used by this service. The field itself stays free-form.
pub mod notification_type {
    pub const MENTION: &str = "mention";
    pub const INVITE: &str = "invite";
    pub const ACHIEVEMENT: &str = "achievement";
}
