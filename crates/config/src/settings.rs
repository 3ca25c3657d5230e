use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub realtime: RealtimeSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub issuer: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeSettings {
    /// Outbound frames queued per connection before senders wait.
    pub channel_buffer_size: usize,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("DRINKUP"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "drinkup")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("jwt.issuer", "drinkup")?
            .set_default("realtime.channel_buffer_size", 64)?
            .build()?;

        config.try_deserialize()
    }
}
