pub mod ai;
pub mod config;
pub mod error;
pub mod journal;
pub mod models;
pub mod planning;
pub mod risk;
pub mod settings;
pub mod store;
pub mod strategies;
#[cfg(test)]
pub mod test_helpers;
