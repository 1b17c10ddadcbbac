use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

use edge_cipher::ai::{AiError, TextGenerator};
use edge_cipher::store::LocalStore;

pub fn utc(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

/// A fresh data dir per test name and process.
pub fn fresh_store(name: &str) -> LocalStore {
    let dir = std::env::temp_dir().join(format!(
        "edge_cipher_integ_{}_{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    LocalStore::new(dir)
}

/// Hands out scripted replies in order and records every prompt it saw.
pub struct MockGenerator {
    replies: Mutex<Vec<Result<String, u16>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new(replies: Vec<Result<String, u16>>) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(status)) => Err(AiError::Api {
                status,
                body: "mock failure".to_string(),
            }),
            None => Err(AiError::InvalidResponse("no scripted reply left".to_string())),
        }
    }
}
