pub mod direction;
pub mod strategy;
pub mod timeframe;
pub mod trade;

pub use direction::Direction;
pub use strategy::{Strategy, StrategyStatus, StrategyType};
pub use timeframe::Timeframe;
pub use trade::{Exit, Trade, TradeType};

/// `<prefix>-<millis>`, suffixed with a counter if that id is already taken.
pub(crate) fn next_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = format!("{}-{}", prefix, chrono::Utc::now().timestamp_millis());
    if !taken(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{}-{}", base, n))
        .find(|id| !taken(id))
        .unwrap_or(base)
}
