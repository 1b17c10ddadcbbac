//! Coaching flows backed by an external text-generation service.
//!
//! Each flow validates its form input, fills a prompt template, asks the
//! generator for a JSON object and checks the object against the flow's
//! output schema. Nothing is retried.

pub mod client;
pub mod flows;
pub mod prompt;

pub use client::HttpTextGenerator;
pub use flows::{
    analyze_performance, get_recommendations, performance_insights,
    trade_planning_recommendations, FlowError, FlowOutcome, PerformanceInsights,
    PerformanceInsightsInput, TradePlanningRecommendations, TradePlanningRecommendationsInput,
};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("text generation is not configured (set AI_API_KEY)")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("output did not match the expected schema: {0}")]
    InvalidOutput(String),
}

/// Anything that turns a prompt into text. The HTTP client is one; tests use canned replies.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}
