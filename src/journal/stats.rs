use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::journal::pnl::{self, TradeStatus};
use crate::models::Trade;

/// Win/loss breakdown for one slice of the journal (a symbol, a direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    pub dimension: String,
    pub value: String,
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub avg_pnl: f64,
    pub total_pnl: f64,
    pub payoff_ratio: f64,
    pub edge: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub closed_trades: usize,
    pub open_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percent, one decimal.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    /// Gross wins over gross losses; `None` until there is a loss.
    pub profit_factor: Option<f64>,
    pub expectancy: f64,
    pub by_symbol: BTreeMap<String, BucketStats>,
    pub by_direction: BTreeMap<String, BucketStats>,
}

impl PerformanceStats {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut closed: Vec<(&Trade, f64)> = Vec::new();
        let mut open_trades = 0;
        for t in trades {
            let p = pnl::compute(t);
            if p.status == TradeStatus::Closed {
                closed.push((t, p.realized_pnl));
            } else {
                open_trades += 1;
            }
        }

        let pnls: Vec<f64> = closed.iter().map(|(_, p)| *p).collect();
        let wins: Vec<f64> = pnls.iter().copied().filter(|p| *p > 0.0).collect();
        let losses: Vec<f64> = pnls.iter().copied().filter(|p| *p <= 0.0).collect();

        let total_pnl: f64 = pnls.iter().sum();
        let gross_win: f64 = wins.iter().sum();
        let gross_loss: f64 = losses.iter().sum::<f64>().abs();

        let mean = |xs: &[f64]| {
            if xs.is_empty() {
                0.0
            } else {
                xs.iter().sum::<f64>() / xs.len() as f64
            }
        };

        let by_symbol = bucketize(&closed, "symbol", |t| t.symbol.clone());
        let by_direction = bucketize(&closed, "direction", |t| t.direction.to_string());

        if pnls.is_empty() {
            return Self {
                closed_trades: 0,
                open_trades,
                wins: 0,
                losses: 0,
                win_rate: 0.0,
                total_pnl: 0.0,
                avg_win: 0.0,
                avg_loss: 0.0,
                best_trade: 0.0,
                worst_trade: 0.0,
                profit_factor: None,
                expectancy: 0.0,
                by_symbol,
                by_direction,
            };
        }

        Self {
            closed_trades: pnls.len(),
            open_trades,
            wins: wins.len(),
            losses: losses.len(),
            win_rate: round1(wins.len() as f64 / pnls.len() as f64 * 100.0),
            total_pnl: round2(total_pnl),
            avg_win: round2(mean(&wins)),
            avg_loss: round2(mean(&losses)),
            best_trade: round2(pnls.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            worst_trade: round2(pnls.iter().copied().fold(f64::INFINITY, f64::min)),
            profit_factor: if gross_loss > 0.0 {
                Some(round2(gross_win / gross_loss))
            } else {
                None
            },
            expectancy: round2(total_pnl / pnls.len() as f64),
            by_symbol,
            by_direction,
        }
    }
}

fn bucketize(
    closed: &[(&Trade, f64)],
    dimension: &str,
    key: impl Fn(&Trade) -> String,
) -> BTreeMap<String, BucketStats> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (t, p) in closed {
        groups.entry(key(t)).or_default().push(*p);
    }
    groups
        .into_iter()
        .map(|(value, pnls)| {
            let stats = compute_bucket(dimension, &value, &pnls);
            (value, stats)
        })
        .collect()
}

fn compute_bucket(dimension: &str, value: &str, pnls: &[f64]) -> BucketStats {
    let total = pnls.len();
    let wins = pnls.iter().filter(|p| **p > 0.0).count();
    let losses = total - wins;
    let win_rate = if total > 0 {
        wins as f64 / total as f64
    } else {
        0.0
    };

    let total_pnl: f64 = pnls.iter().sum();
    let avg_pnl = if total > 0 {
        total_pnl / total as f64
    } else {
        0.0
    };

    let avg_win = if wins > 0 {
        pnls.iter().filter(|p| **p > 0.0).sum::<f64>() / wins as f64
    } else {
        0.0
    };
    let avg_loss = if losses > 0 {
        (pnls.iter().filter(|p| **p <= 0.0).sum::<f64>() / losses as f64).abs()
    } else {
        0.0
    };

    let payoff_ratio = if avg_loss > 0.0 {
        avg_win / avg_loss
    } else {
        0.0
    };
    let edge = if total > 0 {
        (win_rate * avg_win) - ((1.0 - win_rate) * avg_loss)
    } else {
        0.0
    };

    BucketStats {
        dimension: dimension.to_string(),
        value: value.to_string(),
        total,
        wins,
        losses,
        win_rate: round4(win_rate),
        avg_pnl: round4(avg_pnl),
        total_pnl: round4(total_pnl),
        payoff_ratio: round4(payoff_ratio),
        edge: round4(edge),
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}
