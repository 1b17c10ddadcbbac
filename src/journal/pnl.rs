use serde::Serialize;

use crate::models::{Exit, Trade};

/// Remaining size below this counts as flat.
const FLAT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TradeStatus {
    Open,
    Partial,
    Closed,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "open",
            TradeStatus::Partial => "partial",
            TradeStatus::Closed => "closed",
        }
    }
}

/// Everything derived from a trade's entry and exits. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradePnl {
    pub status: TradeStatus,
    pub exited_quantity: f64,
    pub remaining_quantity: f64,
    pub gross_pnl: f64,
    /// Gross minus commission. Commission is charged once, whatever the exit count.
    pub realized_pnl: f64,
    pub avg_exit_price: Option<f64>,
    /// Realised PnL over the margin posted for the exited size, in percent.
    pub return_on_margin: Option<f64>,
}

pub fn exit_pnl(trade: &Trade, exit: &Exit) -> f64 {
    trade.direction.sign() * (exit.price - trade.entry_price) * exit.quantity
}

pub fn compute(trade: &Trade) -> TradePnl {
    let exited_quantity = trade.exited_quantity();
    let remaining_quantity = (trade.quantity - exited_quantity).max(0.0);
    let gross_pnl: f64 = trade.exits.iter().map(|e| exit_pnl(trade, e)).sum();
    let realized_pnl = gross_pnl - trade.commission;

    let status = if trade.exits.is_empty() {
        TradeStatus::Open
    } else if remaining_quantity <= FLAT_EPSILON {
        TradeStatus::Closed
    } else {
        TradeStatus::Partial
    };

    let avg_exit_price = if exited_quantity > 0.0 {
        Some(
            trade
                .exits
                .iter()
                .map(|e| e.price * e.quantity)
                .sum::<f64>()
                / exited_quantity,
        )
    } else {
        None
    };

    let margin = trade.entry_price * exited_quantity / trade.leverage.max(1.0);
    let return_on_margin = if margin > 0.0 {
        Some(realized_pnl / margin * 100.0)
    } else {
        None
    };

    TradePnl {
        status,
        exited_quantity,
        remaining_quantity,
        gross_pnl,
        realized_pnl,
        avg_exit_price,
        return_on_margin,
    }
}

/// Mark-to-market PnL of whatever is still open.
pub fn unrealized(trade: &Trade, mark_price: f64) -> f64 {
    let remaining = (trade.quantity - trade.exited_quantity()).max(0.0);
    trade.direction.sign() * (mark_price - trade.entry_price) * remaining
}
