pub mod book;

pub use book::{seed_strategies, StatusFilter, StrategyBook, STRATEGIES_KEY};
