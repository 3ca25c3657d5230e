//! `@username` extraction and resolution for comment text.

use std::sync::{Arc, LazyLock};

use bson::{oid::ObjectId, DateTime};
use drinkup_db::models::Mention;
use regex::Regex;
use tracing::{debug, warn};

use crate::dao::base::{DaoError, DaoResult};
use crate::store::{MentionStore, UserDirectory};

/// `@` followed by the longest run of word characters (Unicode letters,
/// digits, underscore).
static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("Invalid mention regex"));

/// One `@username` token found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMention {
    pub username: String,
    /// Character index of the `@`.
    pub start: usize,
    /// Character length including the `@`.
    pub length: usize,
}

/// Scans `content` left to right and returns every mention token in order.
///
/// Duplicates are kept. A bare `@` is not a mention.
pub fn parse(content: &str) -> Vec<ParsedMention> {
    let mut mentions = Vec::new();
    // Regex positions are byte offsets; count chars incrementally to
    // report character offsets.
    let mut byte_cursor = 0;
    let mut char_cursor = 0;

    for cap in MENTION_REGEX.captures_iter(content) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        char_cursor += content[byte_cursor..whole.start()].chars().count();
        byte_cursor = whole.start();

        mentions.push(ParsedMention {
            username: name.as_str().to_string(),
            start: char_cursor,
            length: 1 + name.as_str().chars().count(),
        });
    }

    mentions
}

/// Resolves parsed tokens against the user directory and stores the hits.
pub struct MentionService {
    users: Arc<dyn UserDirectory>,
    mentions: Arc<dyn MentionStore>,
}

impl MentionService {
    pub fn new(users: Arc<dyn UserDirectory>, mentions: Arc<dyn MentionStore>) -> Self {
        Self { users, mentions }
    }

    /// Parses `content`, keeps the tokens naming a known user and persists
    /// them as one batch.
    ///
    /// Unknown usernames and failed lookups are dropped without surfacing
    /// an error. A failed batch insert fails the whole call.
    pub async fn resolve_and_persist(
        &self,
        comment_id: ObjectId,
        content: &str,
        created_by: ObjectId,
    ) -> DaoResult<Vec<Mention>> {
        let parsed = parse(content);
        if parsed.is_empty() {
            return Ok(Vec::new());
        }

        let now = DateTime::now();
        let mut resolved = Vec::with_capacity(parsed.len());
        for token in &parsed {
            let user = match self.users.find_by_username(&token.username).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    debug!(%comment_id, username = %token.username, "Mention did not resolve");
                    continue;
                }
                Err(e) => {
                    warn!(%comment_id, username = %token.username, %e, "Mention lookup failed");
                    continue;
                }
            };
            let Some(user_id) = user.id else {
                continue;
            };

            let offset = |value: usize| {
                u32::try_from(value).map_err(|_| {
                    DaoError::Validation(format!("Mention offset {value} out of range"))
                })
            };
            resolved.push(Mention {
                id: None,
                comment_id,
                user_id,
                start_offset: offset(token.start)?,
                length: offset(token.length)?,
                created_at: now,
            });
        }

        if resolved.is_empty() {
            return Ok(Vec::new());
        }

        let persisted = self.mentions.create_many(resolved).await?;
        debug!(
            %comment_id,
            %created_by,
            parsed = parsed.len(),
            persisted = persisted.len(),
            "Mentions persisted"
        );
        Ok(persisted)
    }
}
