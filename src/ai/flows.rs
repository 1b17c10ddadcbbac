use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::ai::prompt::{self, PromptTemplate};
use crate::ai::{AiError, TextGenerator};
use crate::error::ValidationErrors;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Ai(#[from] AiError),
}

/// What a coaching form gets back: a headline message plus either a result or field errors.
#[derive(Debug, Clone, Serialize)]
pub struct FlowOutcome<T> {
    pub message: String,
    pub result: Option<T>,
    pub errors: Option<ValidationErrors>,
}

impl<T> FlowOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    /// The outcome of a form that never got past validation.
    pub fn invalid(errors: ValidationErrors) -> Self {
        FlowOutcome {
            message: "Please check the form for errors.".to_string(),
            result: None,
            errors: Some(errors),
        }
    }

    fn from_result(result: Result<T, FlowError>, success: &str) -> Self {
        match result {
            Ok(value) => FlowOutcome {
                message: success.to_string(),
                result: Some(value),
                errors: None,
            },
            Err(FlowError::Invalid(errors)) => FlowOutcome::invalid(errors),
            Err(FlowError::Ai(e)) => FlowOutcome {
                message: format!("An error occurred: {}", e),
                result: None,
                errors: None,
            },
        }
    }
}

trait FlowOutput: DeserializeOwned {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

async fn run_flow<T: FlowOutput>(
    generator: &dyn TextGenerator,
    template: &PromptTemplate,
    vars: &[(&str, &str)],
) -> Result<T, AiError> {
    let text = template.render(vars);
    let reply = generator.generate(&text).await?;

    let json = prompt::extract_json(&reply)
        .ok_or_else(|| AiError::InvalidOutput(format!("{} returned no JSON object", template.name)))?;
    let output: T = serde_json::from_str(json)
        .map_err(|e| AiError::InvalidOutput(format!("{}: {}", template.name, e)))?;
    output
        .validate()
        .map_err(|e| AiError::InvalidOutput(format!("{}: {}", template.name, e)))?;
    Ok(output)
}

fn non_empty(errors: &mut ValidationErrors, field: &str, value: &str) {
    errors.check(!value.trim().is_empty(), field, "must not be empty");
}

// Performance insights

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceInsightsInput {
    pub trading_history: String,
    pub risk_tolerance: String,
    pub investment_goals: String,
}

impl PerformanceInsightsInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_len(
            "trading_history",
            &self.trading_history,
            10,
            "Please provide a more detailed trading history.",
        );
        errors.min_len(
            "risk_tolerance",
            &self.risk_tolerance,
            3,
            "Please describe your risk tolerance.",
        );
        errors.min_len(
            "investment_goals",
            &self.investment_goals,
            10,
            "Please describe your investment goals in more detail.",
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceInsights {
    pub summary: String,
    pub strengths: String,
    pub weaknesses: String,
    #[serde(alias = "risk_tendencies")]
    pub risk_tendencies: String,
    pub habits: String,
    pub recommendations: String,
}

impl FlowOutput for PerformanceInsights {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        non_empty(&mut errors, "summary", &self.summary);
        non_empty(&mut errors, "strengths", &self.strengths);
        non_empty(&mut errors, "weaknesses", &self.weaknesses);
        non_empty(&mut errors, "riskTendencies", &self.risk_tendencies);
        non_empty(&mut errors, "habits", &self.habits);
        non_empty(&mut errors, "recommendations", &self.recommendations);
        errors.into_result()
    }
}

pub async fn performance_insights(
    generator: &dyn TextGenerator,
    input: &PerformanceInsightsInput,
) -> Result<PerformanceInsights, FlowError> {
    input.validate()?;
    let insights = run_flow(
        generator,
        &prompt::PERFORMANCE_INSIGHTS,
        &[
            ("tradingHistory", input.trading_history.as_str()),
            ("riskTolerance", input.risk_tolerance.as_str()),
            ("investmentGoals", input.investment_goals.as_str()),
        ],
    )
    .await?;
    Ok(insights)
}

pub async fn analyze_performance(
    generator: &dyn TextGenerator,
    input: &PerformanceInsightsInput,
) -> FlowOutcome<PerformanceInsights> {
    let result = performance_insights(generator, input).await;
    match &result {
        Ok(_) => info!("Performance insights generated"),
        Err(e) => error!("Performance insights failed: {}", e),
    }
    FlowOutcome::from_result(result, "Successfully generated insights.")
}

// Trade-planning recommendations

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlanningRecommendationsInput {
    pub user_profile: String,
    pub historical_data: String,
}

impl TradePlanningRecommendationsInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_len(
            "user_profile",
            &self.user_profile,
            10,
            "Please provide a more detailed user profile.",
        );
        errors.min_len(
            "historical_data",
            &self.historical_data,
            10,
            "Please provide more detailed historical data.",
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlanningRecommendations {
    pub recommendations: String,
}

impl FlowOutput for TradePlanningRecommendations {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        non_empty(&mut errors, "recommendations", &self.recommendations);
        errors.into_result()
    }
}

pub async fn trade_planning_recommendations(
    generator: &dyn TextGenerator,
    input: &TradePlanningRecommendationsInput,
) -> Result<TradePlanningRecommendations, FlowError> {
    input.validate()?;
    let recs = run_flow(
        generator,
        &prompt::TRADE_PLANNING_RECOMMENDATIONS,
        &[
            ("userProfile", input.user_profile.as_str()),
            ("historicalData", input.historical_data.as_str()),
        ],
    )
    .await?;
    Ok(recs)
}

pub async fn get_recommendations(
    generator: &dyn TextGenerator,
    input: &TradePlanningRecommendationsInput,
) -> FlowOutcome<TradePlanningRecommendations> {
    let result = trade_planning_recommendations(generator, input).await;
    match &result {
        Ok(_) => info!("Trade planning recommendations generated"),
        Err(e) => error!("Trade planning recommendations failed: {}", e),
    }
    FlowOutcome::from_result(result, "Successfully generated recommendations.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::CannedGenerator;

    fn insights_input() -> PerformanceInsightsInput {
        PerformanceInsightsInput {
            trading_history: "30 BTC trades, mostly longs, 55% win rate".to_string(),
            risk_tolerance: "medium".to_string(),
            investment_goals: "steady growth with small drawdowns".to_string(),
        }
    }

    const INSIGHTS_REPLY: &str = r#"{
        "summary": "Profitable but inconsistent.",
        "strengths": "Cuts losers quickly.",
        "weaknesses": "Oversizes after wins.",
        "riskTendencies": "Risk creeps up on streaks.",
        "habits": "Trades the New York open.",
        "recommendations": "Fix risk at 1% per trade."
    }"#;

    #[tokio::test]
    async fn insights_happy_path() {
        let generator = CannedGenerator::new(INSIGHTS_REPLY);
        let outcome = analyze_performance(&generator, &insights_input()).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.message, "Successfully generated insights.");
        let insights = outcome.result.unwrap();
        assert_eq!(insights.risk_tendencies, "Risk creeps up on streaks.");

        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("Risk Tolerance: medium"));
        assert!(prompt.contains("- riskTendencies: "));
    }

    #[tokio::test]
    async fn short_inputs_never_reach_the_generator() {
        let generator = CannedGenerator::new(INSIGHTS_REPLY);
        let input = PerformanceInsightsInput {
            trading_history: "few".to_string(),
            risk_tolerance: "hi".to_string(),
            investment_goals: "money".to_string(),
        };
        let outcome = analyze_performance(&generator, &input).await;
        assert_eq!(outcome.message, "Please check the form for errors.");
        let errors = outcome.errors.unwrap();
        assert_eq!(errors.fields().len(), 3);
        assert_eq!(
            errors.get("risk_tolerance"),
            ["Please describe your risk tolerance.".to_string()]
        );
        assert!(generator.last_prompt().is_none());
    }

    #[test]
    fn padded_input_counts_its_whitespace() {
        let input = PerformanceInsightsInput {
            investment_goals: "  growth    ".to_string(),
            ..insights_input()
        };
        assert!(input.validate().is_ok());
    }

    #[tokio::test]
    async fn missing_output_field_is_an_error() {
        let generator = CannedGenerator::new(r#"{"summary": "ok"}"#);
        let outcome = analyze_performance(&generator, &insights_input()).await;
        assert!(!outcome.is_success());
        assert!(outcome.message.starts_with("An error occurred: "));
        assert!(outcome.errors.is_none());
    }

    #[tokio::test]
    async fn blank_output_field_is_an_error() {
        let generator = CannedGenerator::new(r#"{"recommendations": "   "}"#);
        let input = TradePlanningRecommendationsInput {
            user_profile: "swing trader, low risk".to_string(),
            historical_data: "12 trades, 7 wins".to_string(),
        };
        let err = trade_planning_recommendations(&generator, &input)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Ai(AiError::InvalidOutput(_))));
    }

    #[tokio::test]
    async fn recommendations_from_fenced_reply() {
        let generator = CannedGenerator::new(
            "```json\n{\"recommendations\": \"Trade the 4h trend, risk 1%.\"}\n```",
        );
        let input = TradePlanningRecommendationsInput {
            user_profile: "swing trader, low risk".to_string(),
            historical_data: "12 trades, 7 wins".to_string(),
        };
        let outcome = get_recommendations(&generator, &input).await;
        assert_eq!(outcome.message, "Successfully generated recommendations.");
        assert_eq!(
            outcome.result.unwrap().recommendations,
            "Trade the 4h trend, risk 1%."
        );
    }

    #[tokio::test]
    async fn generator_failure_surfaces_its_message() {
        let generator = CannedGenerator::failing();
        let input = TradePlanningRecommendationsInput {
            user_profile: "swing trader, low risk".to_string(),
            historical_data: "12 trades, 7 wins".to_string(),
        };
        let outcome = get_recommendations(&generator, &input).await;
        assert_eq!(
            outcome.message,
            "An error occurred: API error 503: service unavailable"
        );
    }
}
