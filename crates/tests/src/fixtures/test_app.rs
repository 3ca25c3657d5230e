use bson::oid::ObjectId;
use drinkup_api::{build_router, state::AppState};
use drinkup_config::{AppSettings, DatabaseSettings, JwtSettings, RealtimeSettings, Settings};
use mongodb::{Client, options::ClientOptions};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

/// A running test server.
///
/// The MongoDB client connects lazily, so tests that never touch a DAO
/// run without a database. Set DRINKUP__DATABASE__URL to point the DAOs
/// at a real server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let mut settings = test_settings();
        if let Ok(url) = std::env::var("DRINKUP__DATABASE__URL") {
            settings.database.url = url;
        }
        settings.database.name = format!("drinkup_test_{}", uuid::Uuid::new_v4().simple());

        let client_options = ClientOptions::parse(&settings.database.url)
            .await
            .expect("Failed to parse MongoDB URL");
        let mongo_client =
            Client::with_options(client_options).expect("Failed to create MongoDB client");
        let db = mongo_client.database(&settings.database.name);

        let state = AppState::new(db, settings);
        let app = build_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            base_url: format!("http://{}", addr),
            state,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// WebSocket URL authenticated as a fresh token for `user_id`.
    pub fn ws_url(&self, user_id: ObjectId, username: &str) -> String {
        let token = self
            .state
            .auth
            .issue_access_token(user_id, username)
            .expect("Failed to issue token");
        format!("ws://{}/ws?token={}", self.addr, token)
    }

    /// Waits until the registry holds `expected` connections.
    pub async fn wait_for_connections(&self, expected: usize) {
        let registry = self.state.registry.clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            while registry.connection_count() != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("Timed out waiting for registry to settle");
    }
}

pub fn test_settings() -> Settings {
    Settings {
        app: AppSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
        },
        database: DatabaseSettings {
            url: "mongodb://localhost:27017".to_string(),
            name: "drinkup_test".to_string(),
            max_pool_size: Some(5),
            min_pool_size: None,
        },
        jwt: JwtSettings {
            secret: "test-secret-key-for-jwt-signing-minimum-32-chars".to_string(),
            access_token_ttl_secs: 3600,
            issuer: "drinkup".to_string(),
        },
        realtime: RealtimeSettings {
            channel_buffer_size: 16,
        },
    }
}
