use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::store::LocalStore;

pub const RISK_PROFILE_KEY: &str = "edgecipher-risk-profile";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskProfile {
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "Conservative",
            RiskProfile::Moderate => "Moderate",
            RiskProfile::Aggressive => "Aggressive",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<RiskProfile> {
        let s = s.trim().trim_matches('"');
        RiskProfile::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
    }

    pub fn drawdown(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "5-10%",
            RiskProfile::Moderate => "10-20%",
            RiskProfile::Aggressive => "20%+",
        }
    }

    pub fn risk_per_trade(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "0.5-1%",
            RiskProfile::Moderate => "1-2%",
            RiskProfile::Aggressive => "2-5%",
        }
    }

    pub fn leverage(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "1-5x",
            RiskProfile::Moderate => "5-20x",
            RiskProfile::Aggressive => "20x+",
        }
    }

    /// Stored as the bare profile name.
    pub fn load(store: &LocalStore) -> RiskProfile {
        match store.get_raw(RISK_PROFILE_KEY) {
            Ok(Some(raw)) => RiskProfile::from_str_loose(&raw).unwrap_or_else(|| {
                warn!("Unknown risk profile '{}', using default", raw.trim());
                RiskProfile::default()
            }),
            Ok(None) => RiskProfile::default(),
            Err(e) => {
                warn!("Failed to load risk profile: {}", e);
                RiskProfile::default()
            }
        }
    }

    pub fn save(&self, store: &LocalStore) -> Result<(), StoreError> {
        store.set_raw(RISK_PROFILE_KEY, self.as_str())?;
        info!("Your risk profile has been set to {}.", self);
        Ok(())
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
