use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{StoreError, ValidationErrors};
use crate::journal::pnl::{self, TradeStatus};
use crate::models::Trade;
use crate::planning::TradePlan;
use crate::store::LocalStore;

pub const GUARDRAILS_KEY: &str = "edgecipher-risk-guardrails";

const RECOMMENDED_MAX_RISK_PER_TRADE: f64 = 2.0;
const RECOMMENDED_MAX_DAILY_LOSS: f64 = 5.0;

/// Soft limits. Breaching one only produces an alert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Guardrails {
    /// Percent of balance.
    pub max_risk_per_trade: f64,
    /// Percent of balance.
    pub max_daily_loss: f64,
    pub max_trades_per_day: u32,
    pub max_concurrent_positions: u32,
}

impl Default for Guardrails {
    fn default() -> Self {
        Self {
            max_risk_per_trade: 2.0,
            max_daily_loss: 5.0,
            max_trades_per_day: 10,
            max_concurrent_positions: 4,
        }
    }
}

/// How the journal looks against the guardrails on one trading day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehaviourSnapshot {
    pub date: NaiveDate,
    pub trades_today: usize,
    pub realized_pnl_today: f64,
    pub daily_pnl_percent: f64,
    pub open_positions: usize,
}

impl BehaviourSnapshot {
    /// Days are calendar days in `tz`. Exit PnL lands on the exit's day,
    /// commission on the entry's day.
    pub fn compute(trades: &[Trade], balance: f64, tz: Tz, now: DateTime<Utc>) -> Self {
        let today = now.with_timezone(&tz).date_naive();
        let local_day = |t: DateTime<Utc>| t.with_timezone(&tz).date_naive();

        let mut trades_today = 0;
        let mut realized = 0.0;
        let mut open_positions = 0;

        for t in trades {
            if local_day(t.entry_date) == today {
                trades_today += 1;
                realized -= t.commission;
            }
            realized += t
                .exits
                .iter()
                .filter(|e| local_day(e.date) == today)
                .map(|e| pnl::exit_pnl(t, e))
                .sum::<f64>();
            if pnl::compute(t).status != TradeStatus::Closed {
                open_positions += 1;
            }
        }

        let daily_pnl_percent = if balance > 0.0 {
            realized / balance * 100.0
        } else {
            0.0
        };

        Self {
            date: today,
            trades_today,
            realized_pnl_today: realized,
            daily_pnl_percent,
            open_positions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GuardrailBreach {
    RiskPerTrade { planned: f64, limit: f64 },
    DailyLoss { loss_percent: f64, limit: f64 },
    TradesPerDay { count: usize, limit: u32 },
    ConcurrentPositions { count: usize, limit: u32 },
}

impl fmt::Display for GuardrailBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardrailBreach::RiskPerTrade { planned, limit } => write!(
                f,
                "Planned risk of {:.2}% exceeds your {:.2}% per-trade limit",
                planned, limit
            ),
            GuardrailBreach::DailyLoss {
                loss_percent,
                limit,
            } => write!(
                f,
                "Down {:.2}% today, past your {:.2}% daily loss limit",
                loss_percent, limit
            ),
            GuardrailBreach::TradesPerDay { count, limit } => {
                write!(f, "{} trades today, over your limit of {}", count, limit)
            }
            GuardrailBreach::ConcurrentPositions { count, limit } => write!(
                f,
                "{} open positions, over your limit of {}",
                count, limit
            ),
        }
    }
}

impl Guardrails {
    pub fn load(store: &LocalStore) -> Guardrails {
        let g: Guardrails = store.load_or(GUARDRAILS_KEY, Guardrails::default);
        match g.validate() {
            Ok(()) => g,
            Err(e) => {
                warn!("Stored guardrails are invalid ({}), using defaults", e);
                Guardrails::default()
            }
        }
    }

    pub fn save(&self, store: &LocalStore) -> Result<(), StoreError> {
        store.set(GUARDRAILS_KEY, self)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            self.max_risk_per_trade > 0.0 && self.max_risk_per_trade <= 100.0,
            "max_risk_per_trade",
            "Max risk per trade must be between 0 and 100%",
        );
        errors.check(
            self.max_daily_loss > 0.0 && self.max_daily_loss <= 100.0,
            "max_daily_loss",
            "Max daily loss must be between 0 and 100%",
        );
        errors.check(
            self.max_trades_per_day > 0,
            "max_trades_per_day",
            "Max trades per day must be at least 1",
        );
        errors.check(
            self.max_concurrent_positions > 0,
            "max_concurrent_positions",
            "Max concurrent positions must be at least 1",
        );
        errors.into_result()
    }

    /// Changes one limit by name (`maxRiskPerTrade` or `max_risk_per_trade`, ...).
    /// Nothing changes unless the result still validates.
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut next = *self;
        let key = field.replace(['_', '-'], "").to_ascii_lowercase();

        match key.as_str() {
            "maxriskpertrade" | "maxdailyloss" => match value.parse::<f64>() {
                Ok(v) if key == "maxriskpertrade" => next.max_risk_per_trade = v,
                Ok(v) => next.max_daily_loss = v,
                Err(_) => errors.add(field, "Must be a number"),
            },
            "maxtradesperday" | "maxconcurrentpositions" => match value.parse::<u32>() {
                Ok(v) if key == "maxtradesperday" => next.max_trades_per_day = v,
                Ok(v) => next.max_concurrent_positions = v,
                Err(_) => errors.add(field, "Must be a whole number"),
            },
            _ => errors.add(field, "Unknown guardrail"),
        }
        errors.into_result()?;

        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Hints shown next to limits that are set looser than recommended.
    pub fn advisories(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.max_risk_per_trade > RECOMMENDED_MAX_RISK_PER_TRADE {
            out.push("Consider keeping risk per trade at or below 2%.");
        }
        if self.max_daily_loss > RECOMMENDED_MAX_DAILY_LOSS {
            out.push("This daily loss limit is quite high and could lead to large equity swings.");
        }
        out
    }

    /// Limits are breached only when exceeded, not when reached.
    pub fn check(&self, snapshot: &BehaviourSnapshot) -> Vec<GuardrailBreach> {
        let mut out = Vec::new();

        let loss_percent = -snapshot.daily_pnl_percent;
        if loss_percent > self.max_daily_loss {
            out.push(GuardrailBreach::DailyLoss {
                loss_percent,
                limit: self.max_daily_loss,
            });
        }
        if snapshot.trades_today > self.max_trades_per_day as usize {
            out.push(GuardrailBreach::TradesPerDay {
                count: snapshot.trades_today,
                limit: self.max_trades_per_day,
            });
        }
        if snapshot.open_positions > self.max_concurrent_positions as usize {
            out.push(GuardrailBreach::ConcurrentPositions {
                count: snapshot.open_positions,
                limit: self.max_concurrent_positions,
            });
        }

        debug!(
            "Guardrails on {}: {} breach(es)",
            snapshot.date,
            out.len()
        );
        out
    }

    pub fn check_plan(&self, plan: &TradePlan) -> Option<GuardrailBreach> {
        (plan.risk_percent > self.max_risk_per_trade).then_some(GuardrailBreach::RiskPerTrade {
            planned: plan.risk_percent,
            limit: self.max_risk_per_trade,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, Exit};
    use crate::test_helpers::{at, temp_store};
    use chrono::Duration;

    #[test]
    fn defaults_and_persistence() {
        let store = temp_store("guardrails_persist");
        assert_eq!(Guardrails::load(&store), Guardrails::default());

        let g = Guardrails {
            max_trades_per_day: 3,
            ..Guardrails::default()
        };
        g.save(&store).unwrap();
        assert_eq!(Guardrails::load(&store), g);

        store
            .set_raw(GUARDRAILS_KEY, r#"{"maxTradesPerDay":0}"#)
            .unwrap();
        assert_eq!(Guardrails::load(&store), Guardrails::default());
    }

    #[test]
    fn stored_with_camel_case_keys() {
        let store = temp_store("guardrails_camel");
        Guardrails::default().save(&store).unwrap();
        let raw = store.get_raw(GUARDRAILS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"maxRiskPerTrade\""));
        assert!(raw.contains("\"maxConcurrentPositions\""));

        store
            .set_raw(GUARDRAILS_KEY, r#"{"maxDailyLoss":3,"maxTradesPerDay":6}"#)
            .unwrap();
        let g = Guardrails::load(&store);
        assert_eq!(g.max_daily_loss, 3.0);
        assert_eq!(g.max_trades_per_day, 6);
        assert_eq!(g.max_risk_per_trade, 2.0);
    }

    #[test]
    fn advisories_for_loose_limits() {
        let mut g = Guardrails::default();
        assert!(g.advisories().is_empty());

        g.max_risk_per_trade = 2.5;
        assert_eq!(
            g.advisories(),
            vec!["Consider keeping risk per trade at or below 2%."]
        );

        g.max_daily_loss = 8.0;
        let hints = g.advisories();
        assert_eq!(hints.len(), 2);
        assert_eq!(
            hints[1],
            "This daily loss limit is quite high and could lead to large equity swings."
        );
    }

    #[test]
    fn set_by_field_name() {
        let mut g = Guardrails::default();
        g.set("maxRiskPerTrade", "1.5").unwrap();
        g.set("max_trades_per_day", "3").unwrap();
        assert_eq!(g.max_risk_per_trade, 1.5);
        assert_eq!(g.max_trades_per_day, 3);

        assert!(g.set("maxConcurrentPositions", "0").is_err());
        assert!(g.set("maxDailyLoss", "lots").is_err());
        assert!(g.set("maxLeverage", "10").is_err());
        assert_eq!(g.max_concurrent_positions, 4);
        assert_eq!(g.max_daily_loss, 5.0);
    }

    #[test]
    fn plan_risk_over_limit() {
        let g = Guardrails::default();
        let ok = TradePlan::new(10000.0, 2.0, 100.0, 95.0, 110.0);
        assert!(g.check_plan(&ok).is_none());
        let hot = TradePlan::new(10000.0, 3.0, 100.0, 95.0, 110.0);
        assert!(matches!(
            g.check_plan(&hot),
            Some(GuardrailBreach::RiskPerTrade { planned, .. }) if planned == 3.0
        ));
    }

    #[test]
    fn snapshot_counts_today_only() {
        let now = at("2024-03-08T15:00:00Z");
        let yesterday = now - Duration::days(1);

        let old_loss = Trade::new("BTC/USDT", Direction::Long, 100.0, 10.0)
            .with_entry_date(yesterday)
            .with_exit(Exit::new(yesterday + Duration::hours(1), 90.0, 10.0));
        let today_loss = Trade::new("ETH/USDT", Direction::Short, 100.0, 10.0)
            .with_entry_date(now - Duration::hours(3))
            .with_commission(5.0)
            .with_exit(Exit::new(now - Duration::hours(2), 150.0, 10.0));
        let still_open = Trade::new("SOL/USDT", Direction::Long, 10.0, 1.0)
            .with_entry_date(now - Duration::hours(1));

        let snap = BehaviourSnapshot::compute(
            &[still_open, today_loss, old_loss],
            10000.0,
            Tz::UTC,
            now,
        );
        assert_eq!(snap.trades_today, 2);
        assert_eq!(snap.realized_pnl_today, -505.0);
        assert!((snap.daily_pnl_percent + 5.05).abs() < 1e-9);
        assert_eq!(snap.open_positions, 1);

        let breaches = Guardrails::default().check(&snap);
        assert_eq!(breaches.len(), 1);
        assert!(matches!(breaches[0], GuardrailBreach::DailyLoss { .. }));
    }

    #[test]
    fn day_boundary_follows_timezone() {
        // 03:00 UTC is still the previous evening in New York
        let now = at("2024-03-08T03:00:00Z");
        let entered = at("2024-03-07T22:00:00Z");
        let t = Trade::new("BTC/USDT", Direction::Long, 100.0, 1.0).with_entry_date(entered);

        let utc = BehaviourSnapshot::compute(std::slice::from_ref(&t), 1000.0, Tz::UTC, now);
        assert_eq!(utc.trades_today, 0);

        let ny = BehaviourSnapshot::compute(
            std::slice::from_ref(&t),
            1000.0,
            chrono_tz::America::New_York,
            now,
        );
        assert_eq!(ny.trades_today, 1);
    }

    #[test]
    fn counts_over_limit_are_flagged() {
        let g = Guardrails {
            max_trades_per_day: 2,
            max_concurrent_positions: 2,
            ..Guardrails::default()
        };
        let snap = BehaviourSnapshot {
            date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            trades_today: 3,
            realized_pnl_today: 0.0,
            daily_pnl_percent: 0.0,
            open_positions: 2,
        };
        let breaches = g.check(&snap);
        assert_eq!(
            breaches,
            vec![GuardrailBreach::TradesPerDay { count: 3, limit: 2 }]
        );
        assert_eq!(breaches[0].to_string(), "3 trades today, over your limit of 2");
    }
}
