use tracing::{info, warn};

use crate::error::StoreError;
use crate::planning::TradePlan;
use crate::store::LocalStore;

pub const TEMPLATE_KEY: &str = "edge-cipher-trade-template";

/// Last saved plan, or the default plan when nothing usable is stored.
pub fn load_template(store: &LocalStore) -> TradePlan {
    let plan = match store.get::<TradePlan>(TEMPLATE_KEY) {
        Ok(Some(plan)) => plan,
        Ok(None) => return TradePlan::default(),
        Err(e) => {
            warn!("Trade template unreadable, using defaults: {}", e);
            return TradePlan::default();
        }
    };

    match plan.validate() {
        Ok(()) => plan,
        Err(e) => {
            warn!("Stored trade template is invalid ({}), using defaults", e);
            TradePlan::default()
        }
    }
}

pub fn save_template(store: &LocalStore, plan: &TradePlan) -> Result<(), StoreError> {
    store.set(TEMPLATE_KEY, plan)?;
    info!("Trade template saved for {}", plan.symbol);
    Ok(())
}
