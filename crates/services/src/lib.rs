pub mod auth;
pub mod comment;
pub mod dao;
pub mod mention;
pub mod notification;
pub mod realtime;
pub mod store;

pub use auth::AuthService;
pub use comment::CommentService;
pub use mention::{MentionService, parse as parse_mentions};
pub use notification::NotificationDispatcher;
pub use realtime::ConnectionRegistry;
