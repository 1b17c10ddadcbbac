pub mod guardrails;
pub mod profile;

pub use guardrails::{BehaviourSnapshot, GuardrailBreach, Guardrails, GUARDRAILS_KEY};
pub use profile::{RiskProfile, RISK_PROFILE_KEY};
