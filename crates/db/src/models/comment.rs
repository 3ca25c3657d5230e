use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A comment left on a drinking session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub session_id: ObjectId,
    pub author_id: ObjectId,
    pub content: String,
    pub created_at: DateTime,
}

impl Comment {
    pub const COLLECTION: &'static str = "comments";
}
