use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationErrors;
use crate::models::Direction;

/// Leverage assumed when estimating margin.
pub const ASSUMED_LEVERAGE: f64 = 10.0;
/// Risking more than this fraction of the balance raises a warning.
pub const MAX_RISK_FRACTION: f64 = 0.10;
/// A stop closer than this fraction of entry raises a warning.
pub const MIN_STOP_DISTANCE: f64 = 0.005;

pub const MIN_RISK_PERCENT: f64 = 0.1;
pub const MAX_RISK_PERCENT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradePlan {
    pub symbol: String,
    pub current_price: f64,
    pub account_balance: f64,
    pub risk_percent: f64,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl Default for TradePlan {
    fn default() -> Self {
        Self {
            symbol: "ETH/USDT".to_string(),
            current_price: 3500.0,
            account_balance: 25000.0,
            risk_percent: 1.0,
            entry: 3500.0,
            stop_loss: 3450.0,
            take_profit: 3650.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradePlanCalculation {
    pub direction: Direction,
    pub risk_amount: f64,
    pub risk_per_unit: f64,
    pub position_size: f64,
    pub total_trade_value: f64,
    pub margin_requirement: f64,
    pub potential_profit: f64,
    pub risk_reward_ratio: f64,
}

/// Advisory banner raised for a computed plan. Never blocks anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlanWarning {
    MaxRisk,
    TightStop,
    InsufficientMargin,
}

impl PlanWarning {
    pub fn message(&self) -> &'static str {
        match self {
            PlanWarning::MaxRisk => {
                "Max Risk Alert: You are risking more than 10% of your account."
            }
            PlanWarning::TightStop => {
                "Stop Loss Warning: Stop is very close to entry, liquidation risk is high."
            }
            PlanWarning::InsufficientMargin => "Margin Warning: Not enough margin for this trade.",
        }
    }
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

fn present(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

impl TradePlan {
    pub fn new(account_balance: f64, risk_percent: f64, entry: f64, stop_loss: f64, take_profit: f64) -> Self {
        Self {
            account_balance,
            risk_percent,
            entry,
            current_price: entry,
            stop_loss,
            take_profit,
            ..Self::default()
        }
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = symbol.to_string();
        self
    }

    /// `None` while the form is incomplete: a missing/zero input, or stop equal to entry.
    pub fn calculate(&self) -> Option<TradePlanCalculation> {
        let required = [
            self.account_balance,
            self.risk_percent,
            self.entry,
            self.stop_loss,
            self.take_profit,
        ];
        if !required.iter().all(|&x| present(x)) || self.stop_loss == self.entry {
            return None;
        }

        let risk_amount = self.account_balance * self.risk_percent / 100.0;
        let risk_per_unit = (self.entry - self.stop_loss).abs();
        let position_size = risk_amount / risk_per_unit;
        let total_trade_value = position_size * self.entry;
        let margin_requirement = total_trade_value / ASSUMED_LEVERAGE;
        let potential_profit = position_size * (self.take_profit - self.entry).abs();
        let risk_reward_ratio = potential_profit / risk_amount;

        Some(TradePlanCalculation {
            direction: Direction::from_stop(self.entry, self.stop_loss),
            risk_amount,
            risk_per_unit,
            position_size,
            total_trade_value,
            margin_requirement,
            potential_profit,
            risk_reward_ratio,
        })
    }

    pub fn warnings(&self) -> Vec<PlanWarning> {
        let Some(calc) = self.calculate() else {
            return Vec::new();
        };

        let mut out = Vec::new();
        if calc.risk_amount > self.account_balance * MAX_RISK_FRACTION {
            out.push(PlanWarning::MaxRisk);
        }
        if calc.risk_per_unit / self.entry < MIN_STOP_DISTANCE {
            out.push(PlanWarning::TightStop);
        }
        if calc.margin_requirement > self.account_balance {
            out.push(PlanWarning::InsufficientMargin);
        }
        out
    }

    /// Form-level checks. `calculate` does not depend on these passing.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let positive = [
            ("current_price", self.current_price, "Current price must be positive"),
            ("account_balance", self.account_balance, "Account balance must be positive"),
            ("entry", self.entry, "Entry must be positive"),
            ("stop_loss", self.stop_loss, "Stop loss must be positive"),
            ("take_profit", self.take_profit, "Take profit must be positive"),
        ];
        for (field, value, msg) in positive {
            errors.check(present(value), field, msg);
        }
        errors.check(
            (MIN_RISK_PERCENT..=MAX_RISK_PERCENT).contains(&self.risk_percent),
            "risk_percent",
            "Risk must be between 0.1% and 10%",
        );
        errors.into_result()
    }

    /// Base asset of a `BASE/QUOTE` symbol.
    pub fn base_asset(&self) -> &str {
        self.symbol.split('/').next().unwrap_or("")
    }
}
