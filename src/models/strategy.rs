use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationErrors;
use crate::models::Timeframe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyType {
    Momentum,
    #[serde(rename = "Mean Reversion")]
    MeanReversion,
    Breakout,
    Scalping,
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            StrategyType::Momentum => "Momentum",
            StrategyType::MeanReversion => "Mean Reversion",
            StrategyType::Breakout => "Breakout",
            StrategyType::Scalping => "Scalping",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StrategyStatus {
    Running,
    Paused,
    #[default]
    Draft,
}

impl StrategyStatus {
    /// Running pauses; anything else (including a draft) starts running.
    pub fn toggled(self) -> StrategyStatus {
        match self {
            StrategyStatus::Running => StrategyStatus::Paused,
            _ => StrategyStatus::Running,
        }
    }
}

impl fmt::Display for StrategyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyStatus::Running => write!(f, "Running"),
            StrategyStatus::Paused => write!(f, "Paused"),
            StrategyStatus::Draft => write!(f, "Draft"),
        }
    }
}

/// An automated strategy card. Performance figures are supplied, never computed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub strategy_type: StrategyType,
    pub market: String,
    pub timeframe: Timeframe,
    #[serde(default = "default_broker")]
    pub broker: String,
    #[serde(default)]
    pub trades_30d: u32,
    #[serde(default)]
    pub win_rate: f64,
    #[serde(default)]
    pub net_pnl: f64,
    #[serde(default)]
    pub max_drawdown: f64,
    #[serde(default)]
    pub status: StrategyStatus,
    pub description: String,
    pub risk_per_trade: f64,
    pub max_open_positions: u32,
    #[serde(default)]
    pub notes: String,
}

fn default_broker() -> String {
    "Paper".to_string()
}

impl Strategy {
    /// Blank draft with the dialog defaults.
    pub fn draft(name: &str, description: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            strategy_type: StrategyType::Momentum,
            market: "BTC/USDT".to_string(),
            timeframe: Timeframe::H1,
            broker: default_broker(),
            trades_30d: 0,
            win_rate: 0.0,
            net_pnl: 0.0,
            max_drawdown: 0.0,
            status: StrategyStatus::Draft,
            description: description.to_string(),
            risk_per_trade: 1.0,
            max_open_positions: 1,
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_len("name", &self.name, 3, "Name must be at least 3 characters");
        errors.min_len("market", &self.market, 1, "Market is required");
        errors.check(
            (0.0..=100.0).contains(&self.win_rate),
            "win_rate",
            "Win rate must be between 0 and 100",
        );
        errors.check(
            self.max_drawdown >= 0.0,
            "max_drawdown",
            "Max drawdown cannot be negative",
        );
        errors.min_len(
            "description",
            &self.description,
            10,
            "Please provide a brief description.",
        );
        errors.check(
            (0.1..=10.0).contains(&self.risk_per_trade),
            "risk_per_trade",
            "Risk per trade must be between 0.1% and 10%",
        );
        errors.check(
            (1..=10).contains(&self.max_open_positions),
            "max_open_positions",
            "Max open positions must be between 1 and 10",
        );
        errors.into_result()
    }
}
