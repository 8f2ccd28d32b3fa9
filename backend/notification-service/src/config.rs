//! Configuration management for notification-service

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub amqp: AmqpSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        // Load .env file in development
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Settings {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            amqp: AmqpSettings::from_env()?,
        })
    }
}

/// AMQP consumer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmqpSettings {
    pub url: String,
    pub exchange: String,
    pub queue: String,
    pub prefetch: u16,
}

impl AmqpSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("AMQP_URL").context("AMQP_URL must be set")?,
            exchange: env::var("AMQP_EXCHANGE").unwrap_or_else(|_| "user-events".to_string()),
            queue: env::var("AMQP_QUEUE").unwrap_or_else(|_| "user-notifications".to_string()),
            prefetch: env::var("AMQP_PREFETCH")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("Invalid AMQP_PREFETCH")?,
        })
    }
}
