pub mod book;
pub mod pnl;
pub mod stats;

pub use book::{DraftKind, Journal, JOURNAL_KEY};
pub use pnl::{TradePnl, TradeStatus};
pub use stats::{BucketStats, PerformanceStats};

use crate::models::Trade;
use crate::planning::format_usd;

/// Plain-text trading history, one line per trade, oldest first.
pub fn history_summary(trades: &[Trade]) -> String {
    let mut lines: Vec<String> = trades
        .iter()
        .rev()
        .map(|t| {
            let p = pnl::compute(t);
            let mut line = format!(
                "{} {} {} {} @ {:.2} (x{}) - {}",
                t.entry_date.format("%Y-%m-%d"),
                t.direction,
                t.quantity,
                t.symbol,
                t.entry_price,
                t.leverage,
                p.status.as_str()
            );
            if let Some(avg) = p.avg_exit_price {
                line.push_str(&format!(
                    ", exited {} @ {:.2}, PnL {}",
                    p.exited_quantity,
                    avg,
                    format_usd(p.realized_pnl)
                ));
            }
            if !t.notes.trim().is_empty() {
                line.push_str(&format!(". Notes: {}", t.notes.trim()));
            }
            line
        })
        .collect();

    let stats = PerformanceStats::from_trades(trades);
    if stats.closed_trades > 0 {
        lines.push(format!(
            "Closed {} trades, win rate {:.1}%, total PnL {}",
            stats.closed_trades,
            stats.win_rate,
            format_usd(stats.total_pnl)
        ));
    }
    lines.join("\n")
}
