pub mod calculator;
pub mod checklist;
pub mod template;

pub use calculator::{PlanWarning, TradePlan, TradePlanCalculation};
pub use checklist::pre_trade_checklist;
pub use template::{load_template, save_template, TEMPLATE_KEY};

/// `$1,234.56` / `-$12.00`, as shown on every summary panel.
pub fn format_usd(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
