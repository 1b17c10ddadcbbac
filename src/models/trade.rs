use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;
use crate::models::Direction;

pub const MIN_LEVERAGE: f64 = 1.0;
pub const MAX_LEVERAGE: f64 = 500.0;

/// How a journal entry was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TradeType {
    #[default]
    Manual,
    Image,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Manual => "Manual",
            TradeType::Image => "Image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exit {
    pub date: DateTime<Utc>,
    pub price: f64,
    pub quantity: f64,
}

impl Exit {
    pub fn new(date: DateTime<Utc>, price: f64, quantity: f64) -> Self {
        Self {
            date,
            price,
            quantity,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.price > 0.0, "price", "Exit price must be positive");
        errors.check(
            self.quantity > 0.0,
            "quantity",
            "Exit quantity must be positive",
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(default)]
    pub id: Option<String>,
    pub symbol: String,
    pub direction: Direction,
    pub entry_date: DateTime<Utc>,
    #[serde(default)]
    pub trade_type: TradeType,
    pub entry_price: f64,
    pub quantity: f64,
    #[serde(default = "default_leverage")]
    pub leverage: f64,
    #[serde(default)]
    pub commission: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub exits: Vec<Exit>,
}

fn default_leverage() -> f64 {
    MIN_LEVERAGE
}

impl Trade {
    /// A manual, unlevered entry opened now with no exits.
    pub fn new(symbol: &str, direction: Direction, entry_price: f64, quantity: f64) -> Self {
        Self {
            id: None,
            symbol: symbol.to_string(),
            direction,
            entry_date: Utc::now(),
            trade_type: TradeType::Manual,
            entry_price,
            quantity,
            leverage: MIN_LEVERAGE,
            commission: 0.0,
            notes: String::new(),
            exits: Vec::new(),
        }
    }

    pub fn with_leverage(mut self, leverage: f64) -> Self {
        self.leverage = leverage;
        self
    }

    pub fn with_commission(mut self, commission: f64) -> Self {
        self.commission = commission;
        self
    }

    pub fn with_entry_date(mut self, entry_date: DateTime<Utc>) -> Self {
        self.entry_date = entry_date;
        self
    }

    pub fn with_exit(mut self, exit: Exit) -> Self {
        self.exits.push(exit);
        self
    }

    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or("-")
    }

    pub fn exited_quantity(&self) -> f64 {
        self.exits.iter().map(|e| e.quantity).sum()
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_len("symbol", &self.symbol, 1, "Symbol is required");
        errors.check(
            self.entry_price > 0.0,
            "entry_price",
            "Entry price must be positive",
        );
        errors.check(self.quantity > 0.0, "quantity", "Quantity must be positive");
        errors.check(
            (MIN_LEVERAGE..=MAX_LEVERAGE).contains(&self.leverage),
            "leverage",
            "Leverage must be between 1 and 500",
        );
        errors.check(
            self.commission >= 0.0,
            "commission",
            "Commission cannot be negative",
        );

        for (i, exit) in self.exits.iter().enumerate() {
            if let Err(e) = exit.validate() {
                errors.nest(&format!("exits.{}", i), e);
            }
            errors.check(
                exit.date >= self.entry_date,
                &format!("exits.{}.date", i),
                "Exit cannot precede the entry",
            );
        }
        // Small tolerance so 0.1 + 0.2 style sums still close a 0.3 position
        errors.check(
            self.exited_quantity() <= self.quantity + 1e-9,
            "exits",
            "Exit quantities exceed the position size",
        );

        errors.into_result()
    }
}
