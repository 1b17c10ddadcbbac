/// Above this risk percentage the checklist leads with a caution.
pub const CHECKLIST_RISK_THRESHOLD: f64 = 3.0;

const REMINDERS: [&str; 5] = [
    "Risk/reward ratio appears acceptable for this setup.",
    "Entry point aligns with your pre-defined strategy rules.",
    "Market conditions are favorable for this type of trade.",
    "Do not move your stop-loss further away once in the trade.",
    "Consider your emotional state. Are you trading out of FOMO or discipline?",
];

pub fn pre_trade_checklist(risk_percent: f64) -> Vec<String> {
    let lead = if risk_percent > CHECKLIST_RISK_THRESHOLD {
        "Risk per trade is above the recommended 3% threshold. Proceed with caution."
    } else {
        "Risk per trade is within your acceptable range."
    };

    std::iter::once(lead)
        .chain(REMINDERS)
        .map(str::to_string)
        .collect()
}
