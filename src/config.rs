use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Local store
    pub data_dir: String,

    // Account
    pub account_balance: f64,
    /// IANA name used to decide where a trading day starts and ends
    pub timezone: String,

    // Text generation
    pub ai_base_url: String,
    pub ai_api_key: String,
    pub ai_model: String,
    pub ai_timeout_secs: u64,
    pub ai_temperature: f32,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Config {
            data_dir: env("DATA_DIR", "data"),
            account_balance: env("ACCOUNT_BALANCE", "25000")
                .parse()
                .unwrap_or(25000.0),
            timezone: env("TIMEZONE", "UTC"),
            ai_base_url: env("AI_BASE_URL", "https://api.openai.com/v1"),
            ai_api_key: env("AI_API_KEY", ""),
            ai_model: env("AI_MODEL", "gpt-4o-mini"),
            ai_timeout_secs: env("AI_TIMEOUT_SECS", "60").parse().unwrap_or(60),
            ai_temperature: env("AI_TEMPERATURE", "0.7").parse().unwrap_or(0.7),
            log_level: env("LOG_LEVEL", "INFO"),
        }
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Falls back to UTC for names chrono-tz does not know.
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::UTC)
    }

    pub fn ai_configured(&self) -> bool {
        !self.ai_api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::default_test_config;

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        let mut cfg = default_test_config();
        cfg.timezone = "Mars/Olympus_Mons".to_string();
        assert_eq!(cfg.tz(), Tz::UTC);

        cfg.timezone = "America/New_York".to_string();
        assert_eq!(cfg.tz(), chrono_tz::America::New_York);
    }

    #[test]
    fn ai_needs_a_key() {
        let mut cfg = default_test_config();
        assert!(!cfg.ai_configured());
        cfg.ai_api_key = "sk-test".to_string();
        assert!(cfg.ai_configured());
    }
}
