use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(alias = "long")]
    Long,
    #[serde(alias = "short")]
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
        }
    }

    /// +1 for long, -1 for short: multiply a price move by this to get PnL per unit.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Direction> {
        match s.to_ascii_lowercase().as_str() {
            "long" | "buy" | "l" => Some(Direction::Long),
            "short" | "sell" | "s" => Some(Direction::Short),
            _ => None,
        }
    }

    /// Direction implied by a plan's stop placement.
    pub fn from_stop(entry: f64, stop_loss: f64) -> Direction {
        if stop_loss < entry {
            Direction::Long
        } else {
            Direction::Short
        }
    }
}
