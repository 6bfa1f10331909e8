use std::env;

use shared::SESSION_SWEEP_INTERVAL_SECS;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_port: u16,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Absent in development: the service falls back to the in-memory store.
    pub url: Option<String>,
    pub pool_size: u32,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from_address: String,
    /// Base URL used when building verification and reset links.
    pub app_url: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub sweep_interval_secs: u64,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()?,
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").ok(),
                pool_size: env::var("DATABASE_POOL_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()?,
            },
            mail: MailConfig {
                from_address: env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "no-reply@casino.local".to_string()),
                app_url: env::var("APP_URL")
                    .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            },
            session: SessionConfig {
                sweep_interval_secs: env::var("SESSION_SWEEP_SECS")
                    .unwrap_or_else(|_| SESSION_SWEEP_INTERVAL_SECS.to_string())
                    .parse()?,
            },
        })
    }
}
