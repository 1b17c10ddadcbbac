use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreError;
use crate::store::LocalStore;

pub const PLATFORM_KEY: &str = "edgecipher-platform";
pub const ONBOARDING_KEY: &str = "edgecipher-onboarding-complete";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Show explanatory hints next to risk figures.
    pub proactive_help: bool,
    pub onboarding_complete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            proactive_help: true,
            onboarding_complete: false,
        }
    }
}

impl Settings {
    /// Only a boolean `proactiveHelp` in the platform document is honoured;
    /// onboarding counts as complete only when stored as exactly `true`.
    pub fn load(store: &LocalStore) -> Settings {
        let mut settings = Settings::default();

        match store.get::<serde_json::Value>(PLATFORM_KEY) {
            Ok(Some(platform)) => {
                if let Some(help) = platform["proactiveHelp"].as_bool() {
                    settings.proactive_help = help;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to load platform settings: {}", e),
        }

        match store.get_raw(ONBOARDING_KEY) {
            Ok(Some(raw)) => settings.onboarding_complete = raw.trim() == "true",
            Ok(None) => {}
            Err(e) => warn!("Failed to load onboarding flag: {}", e),
        }

        settings
    }

    /// Other fields already in the platform document are preserved.
    pub fn set_proactive_help(&mut self, store: &LocalStore, value: bool) -> Result<(), StoreError> {
        let mut platform = match store.get::<serde_json::Value>(PLATFORM_KEY) {
            Ok(Some(v)) if v.is_object() => v,
            _ => serde_json::json!({}),
        };
        platform["proactiveHelp"] = serde_json::Value::Bool(value);
        store.set(PLATFORM_KEY, &platform)?;
        self.proactive_help = value;
        Ok(())
    }

    pub fn set_onboarding_complete(
        &mut self,
        store: &LocalStore,
        value: bool,
    ) -> Result<(), StoreError> {
        store.set_raw(ONBOARDING_KEY, if value { "true" } else { "false" })?;
        self.onboarding_complete = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::temp_store;

    #[test]
    fn defaults_without_storage() {
        let store = temp_store("settings_default");
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn updates_persist_and_keep_other_fields() {
        let store = temp_store("settings_update");
        store
            .set_raw(PLATFORM_KEY, r#"{"theme":"dark","proactiveHelp":true}"#)
            .unwrap();

        let mut s = Settings::load(&store);
        s.set_proactive_help(&store, false).unwrap();
        s.set_onboarding_complete(&store, true).unwrap();

        let reloaded = Settings::load(&store);
        assert!(!reloaded.proactive_help);
        assert!(reloaded.onboarding_complete);

        let platform: serde_json::Value = store.get(PLATFORM_KEY).unwrap().unwrap();
        assert_eq!(platform["theme"], "dark");
    }

    #[test]
    fn ignores_wrongly_typed_values() {
        let store = temp_store("settings_types");
        store
            .set_raw(PLATFORM_KEY, r#"{"proactiveHelp":"no"}"#)
            .unwrap();
        store.set_raw(ONBOARDING_KEY, "yes").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
