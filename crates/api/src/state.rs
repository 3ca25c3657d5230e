use drinkup_config::Settings;
use drinkup_services::{
    AuthService, CommentService, ConnectionRegistry, MentionService, NotificationDispatcher,
    dao::{comment::CommentDao, mention::MentionDao, notification::NotificationDao, user::UserDao},
};
use mongodb::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub comment_store: Arc<CommentDao>,
    pub mention_store: Arc<MentionDao>,
    pub notification_store: Arc<NotificationDao>,
    pub registry: Arc<ConnectionRegistry>,
    pub mentions: Arc<MentionService>,
    pub notifications: Arc<NotificationDispatcher>,
    pub comments: Arc<CommentService>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let users = Arc::new(UserDao::new(&db));
        let comment_store = Arc::new(CommentDao::new(&db));
        let mention_store = Arc::new(MentionDao::new(&db));
        let notification_store = Arc::new(NotificationDao::new(&db));
        let registry = Arc::new(ConnectionRegistry::new());

        let mentions = Arc::new(MentionService::new(users.clone(), mention_store.clone()));
        let notifications = Arc::new(NotificationDispatcher::new(
            notification_store.clone(),
            registry.clone(),
        ));
        let comments = Arc::new(CommentService::new(
            comment_store.clone(),
            mention_store.clone(),
            mentions.clone(),
            notifications.clone(),
        ));

        Self {
            db,
            settings,
            auth,
            users,
            comment_store,
            mention_store,
            notification_store,
            registry,
            mentions,
            notifications,
            comments,
        }
    }
}
