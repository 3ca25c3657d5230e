use std::collections::HashSet;
use std::sync::Arc;

use bson::oid::ObjectId;
use drinkup_db::models::{notification_type, Comment, Mention};
use futures::future::join_all;
use tracing::{info, warn};

use crate::dao::base::{DaoError, DaoResult};
use crate::mention::MentionService;
use crate::notification::NotificationDispatcher;
use crate::store::{CommentStore, MentionStore};

const MENTION_TITLE: &str = "You were mentioned";
const PREVIEW_CHARS: usize = 140;

/// A stored comment together with the mentions resolved from it.
#[derive(Debug, Clone)]
pub struct CreatedComment {
    pub comment: Comment,
    pub mentions: Vec<Mention>,
}

/// Saves comments and drives mention resolution and mention notifications.
pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    mention_store: Arc<dyn MentionStore>,
    mentions: Arc<MentionService>,
    notifications: Arc<NotificationDispatcher>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentStore>,
        mention_store: Arc<dyn MentionStore>,
        mentions: Arc<MentionService>,
        notifications: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            comments,
            mention_store,
            mentions,
            notifications,
        }
    }

    /// Stores the comment and its mentions, then notifies each mentioned user
    /// once. If the mentions cannot be stored the comment is removed again.
    /// Notification failures are logged and do not fail the comment.
    pub async fn create(
        &self,
        session_id: ObjectId,
        author_id: ObjectId,
        content: String,
    ) -> DaoResult<CreatedComment> {
        let comment = self.comments.create(session_id, author_id, content).await?;
        let comment_id = comment
            .id
            .ok_or_else(|| DaoError::Validation("comment has no id".to_string()))?;

        let mentions = match self
            .mentions
            .resolve_and_persist(comment_id, &comment.content, author_id)
            .await
        {
            Ok(mentions) => mentions,
            Err(e) => {
                // A failed create leaves no comment behind.
                if let Err(cleanup) = self.comments.delete(comment_id).await {
                    warn!(%comment_id, %cleanup, "Could not remove comment after mention failure");
                }
                return Err(e);
            }
        };

        self.notify_mentioned(&comment, comment_id, &mentions).await;

        info!(%comment_id, %session_id, mentions = mentions.len(), "Comment created");
        Ok(CreatedComment { comment, mentions })
    }

    /// Deletes the comment's mentions, then the comment itself.
    pub async fn delete(&self, comment_id: ObjectId) -> DaoResult<bool> {
        let removed = self.mention_store.delete_by_comment(comment_id).await?;
        let deleted = self.comments.delete(comment_id).await?;
        info!(%comment_id, mentions_removed = removed, deleted, "Comment deleted");
        Ok(deleted)
    }

    async fn notify_mentioned(&self, comment: &Comment, comment_id: ObjectId, mentions: &[Mention]) {
        let mut seen = HashSet::new();
        let recipients: Vec<ObjectId> = mentions
            .iter()
            .map(|m| m.user_id)
            .filter(|id| seen.insert(*id))
            .collect();
        if recipients.is_empty() {
            return;
        }

        let body = preview(&comment.content);
        let metadata = serde_json::json!({
            "comment_id": comment_id.to_hex(),
            "session_id": comment.session_id.to_hex(),
            "author_id": comment.author_id.to_hex(),
        });

        let outcomes = join_all(recipients.iter().map(|&user_id| {
            let body = &body;
            let metadata = &metadata;
            async move {
                let result = self
                    .notifications
                    .create_and_send(
                        user_id,
                        notification_type::MENTION,
                        MENTION_TITLE,
                        body,
                        Some(metadata),
                    )
                    .await;
                (user_id, result)
            }
        }))
        .await;

        for (user_id, outcome) in outcomes {
            if let Err(e) = outcome {
                warn!(%comment_id, %user_id, %e, "Mention notification failed");
            }
        }
    }
}

fn preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_CHARS {
        return content.to_string();
    }
    let mut cut: String = content.chars().take(PREVIEW_CHARS).collect();
    cut.push('…');
    cut
}
