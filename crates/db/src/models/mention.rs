use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// An `@username` reference found in a comment.
///
/// Offsets count characters, not bytes, and cover the leading `@`.
/// Records are written once per comment and removed with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub comment_id: ObjectId,
    pub user_id: ObjectId,
    pub start_offset: u32,
    pub length: u32,
    pub created_at: DateTime,
}

impl Mention {
    pub const COLLECTION: &'static str = "mentions";

    pub fn end_offset(&self) -> u32 {
        self.start_offset + self.length
    }
}
