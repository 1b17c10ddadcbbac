use std::fmt;
use tracing::info;

use crate::error::RecordError;
use crate::models::{next_id, Strategy, StrategyStatus, StrategyType, Timeframe};
use crate::store::LocalStore;

pub const STRATEGIES_KEY: &str = "edge-cipher-strategies";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(StrategyStatus),
}

impl StatusFilter {
    pub fn from_str_loose(s: &str) -> Option<StatusFilter> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Some(StatusFilter::All),
            "running" => Some(StatusFilter::Only(StrategyStatus::Running)),
            "paused" => Some(StatusFilter::Only(StrategyStatus::Paused)),
            "draft" => Some(StatusFilter::Only(StrategyStatus::Draft)),
            _ => None,
        }
    }

    pub fn matches(&self, status: StrategyStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(s) => *s == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => write!(f, "All"),
            StatusFilter::Only(s) => write!(f, "{}", s),
        }
    }
}

/// Strategy cards, newest first. Every mutation is written through to the store.
pub struct StrategyBook {
    store: LocalStore,
    strategies: Vec<Strategy>,
}

impl StrategyBook {
    /// Seeds the sample strategies when nothing usable is stored.
    pub fn open(store: LocalStore) -> Self {
        let strategies = store.load_or(STRATEGIES_KEY, seed_strategies);
        let book = Self { store, strategies };
        book.save();
        book
    }

    pub fn all(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn get(&self, id: &str) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.id.as_deref() == Some(id))
    }

    pub fn filter(&self, filter: StatusFilter) -> Vec<&Strategy> {
        self.strategies
            .iter()
            .filter(|s| filter.matches(s.status))
            .collect()
    }

    fn position(&self, id: &str) -> Result<usize, RecordError> {
        self.strategies
            .iter()
            .position(|s| s.id.as_deref() == Some(id))
            .ok_or_else(|| RecordError::NotFound(id.to_string()))
    }

    pub fn add(&mut self, mut strategy: Strategy) -> Result<&Strategy, RecordError> {
        strategy.validate()?;
        strategy.id = Some(next_id("strat", |id| self.get(id).is_some()));
        info!("Strategy Added: {} has been saved.", strategy.name);
        self.strategies.insert(0, strategy);
        self.save();
        Ok(&self.strategies[0])
    }

    pub fn update(&mut self, strategy: Strategy) -> Result<&Strategy, RecordError> {
        let id = strategy.id.clone().unwrap_or_default();
        let idx = self.position(&id)?;
        strategy.validate()?;
        info!("Strategy Updated: {} has been saved.", strategy.name);
        self.strategies[idx] = strategy;
        self.save();
        Ok(&self.strategies[idx])
    }

    pub fn delete(&mut self, id: &str) -> Result<Strategy, RecordError> {
        let idx = self.position(id)?;
        let removed = self.strategies.remove(idx);
        info!("Strategy Deleted: {}", removed.name);
        self.save();
        Ok(removed)
    }

    pub fn toggle_status(&mut self, id: &str) -> Result<StrategyStatus, RecordError> {
        let idx = self.position(id)?;
        let s = &mut self.strategies[idx];
        s.status = s.status.toggled();
        let status = s.status;
        info!("{} is now {}", s.name, status);
        self.save();
        Ok(status)
    }

    pub fn save_notes(&mut self, id: &str, notes: &str) -> Result<(), RecordError> {
        let idx = self.position(id)?;
        self.strategies[idx].notes = notes.to_string();
        self.save();
        Ok(())
    }

    fn save(&self) {
        self.store.save_quietly(STRATEGIES_KEY, &self.strategies);
    }
}

/// Sample cards shown before the user has saved anything.
pub fn seed_strategies() -> Vec<Strategy> {
    #[allow(clippy::too_many_arguments)]
    fn card(
        id: &str,
        name: &str,
        strategy_type: StrategyType,
        market: &str,
        timeframe: Timeframe,
        status: StrategyStatus,
        perf: (u32, f64, f64, f64),
        description: &str,
    ) -> Strategy {
        let (trades_30d, win_rate, net_pnl, max_drawdown) = perf;
        Strategy {
            id: Some(id.to_string()),
            name: name.to_string(),
            strategy_type,
            market: market.to_string(),
            timeframe,
            broker: "Paper".to_string(),
            trades_30d,
            win_rate,
            net_pnl,
            max_drawdown,
            status,
            description: description.to_string(),
            risk_per_trade: 1.0,
            max_open_positions: 2,
            notes: String::new(),
        }
    }

    vec![
        card(
            "strat-1",
            "BTC Momentum Rider",
            StrategyType::Momentum,
            "BTC/USDT",
            Timeframe::H4,
            StrategyStatus::Running,
            (42, 61.9, 4820.5, 8.4),
            "Follows 4h momentum after a confirmed break of structure.",
        ),
        card(
            "strat-2",
            "ETH Range Fader",
            StrategyType::MeanReversion,
            "ETH/USDT",
            Timeframe::H1,
            StrategyStatus::Paused,
            (67, 54.2, 1210.0, 11.7),
            "Fades moves to the edges of the overnight range.",
        ),
        card(
            "strat-3",
            "SOL Breakout Hunter",
            StrategyType::Breakout,
            "SOL/USDT",
            Timeframe::M15,
            StrategyStatus::Running,
            (88, 47.7, 2390.25, 14.2),
            "Enters on volume-backed breaks of the prior day's high or low.",
        ),
        card(
            "strat-4",
            "Session Scalper",
            StrategyType::Scalping,
            "BTC/USDT",
            Timeframe::M1,
            StrategyStatus::Draft,
            (0, 0.0, 0.0, 0.0),
            "Quick scalps around the London and New York opens.",
        ),
    ]
}
