use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

use crate::ai::{AiError, TextGenerator};
use crate::config::Config;
use crate::models::{Direction, Exit, Trade};
use crate::store::LocalStore;

/// A Config suitable for testing: no API key, UTC days, temp data dir.
pub fn default_test_config() -> Config {
    Config {
        data_dir: std::env::temp_dir()
            .join("edge_cipher_test")
            .to_string_lossy()
            .to_string(),
        account_balance: 25000.0,
        timezone: "UTC".to_string(),
        ai_base_url: "https://api.openai.com/v1".to_string(),
        ai_api_key: String::new(),
        ai_model: "gpt-4o-mini".to_string(),
        ai_timeout_secs: 5,
        ai_temperature: 0.7,
        log_level: "ERROR".to_string(),
    }
}

/// A fresh store under the temp dir, unique per test name and process.
pub fn temp_store(name: &str) -> LocalStore {
    let dir = std::env::temp_dir().join(format!(
        "edge_cipher_test_{}_{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    LocalStore::new(dir)
}

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

/// A fully closed, unlevered trade entered 2024-01-15 12:00 UTC and exited an hour later.
pub fn closed_trade(symbol: &str, direction: Direction, entry: f64, exit: f64, qty: f64) -> Trade {
    let entered = at("2024-01-15T12:00:00Z");
    Trade::new(symbol, direction, entry, qty)
        .with_entry_date(entered)
        .with_exit(Exit::new(entered + Duration::hours(1), exit, qty))
}

/// Replies with a fixed string (or a fixed failure) and remembers the last prompt.
pub struct CannedGenerator {
    reply: Option<String>,
    last_prompt: Mutex<Option<String>>,
}

impl CannedGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            last_prompt: Mutex::new(None),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.reply.clone().ok_or(AiError::Api {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}
