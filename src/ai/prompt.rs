/// A named prompt: `{{{field}}}` placeholders plus the JSON fields the reply must carry.
pub struct PromptTemplate {
    pub name: &'static str,
    pub template: &'static str,
    pub output_fields: &'static [(&'static str, &'static str)],
}

impl PromptTemplate {
    /// Substitutes each `{{{key}}}` verbatim and appends the output contract.
    /// Substituted values are never rescanned for placeholders.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut text = String::with_capacity(self.template.len());
        let mut rest = self.template;
        while let Some(start) = rest.find("{{{") {
            text.push_str(&rest[..start]);
            let after = &rest[start + 3..];
            let Some(end) = after.find("}}}") else {
                text.push_str(&rest[start..]);
                rest = "";
                break;
            };
            let key = &after[..end];
            match vars.iter().find(|(k, _)| *k == key) {
                Some((_, value)) => text.push_str(value),
                None => text.push_str(&rest[start..start + 3 + end + 3]),
            }
            rest = &after[end + 3..];
        }
        text.push_str(rest);

        text.push_str("\nRespond with a single JSON object and nothing else. ");
        text.push_str("It must contain exactly these string fields:\n");
        for (field, description) in self.output_fields {
            text.push_str(&format!("- {}: {}\n", field, description));
        }
        text
    }
}

/// Pulls the JSON object out of a reply, tolerating code fences and chatter around it.
pub fn extract_json(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

pub const PERFORMANCE_INSIGHTS: PromptTemplate = PromptTemplate {
    name: "performanceInsightsPrompt",
    template: "You are an AI-powered trading coach. Analyze the user's trading history, risk tolerance, and investment goals to provide personalized insights.

Trading History: {{{tradingHistory}}}
Risk Tolerance: {{{riskTolerance}}}
Investment Goals: {{{investmentGoals}}}

Generate a summary of the user's trading performance, highlighting strengths, weaknesses, risk tendencies, and habits. Provide specific recommendations for improvement.

Ensure that each field is populated with relevant and helpful information.
",
    output_fields: &[
        ("summary", "A concise summary of the user's trading performance."),
        ("strengths", "Key strengths identified in the user's trading strategy."),
        ("weaknesses", "Areas where the user could improve their trading strategy."),
        ("riskTendencies", "An analysis of the user's risk-taking behavior and tendencies."),
        ("habits", "Notable trading habits observed in the user's trading history."),
        ("recommendations", "Specific recommendations for improving the user's trading performance and risk management."),
    ],
};

pub const TRADE_PLANNING_RECOMMENDATIONS: PromptTemplate = PromptTemplate {
    name: "tradePlanningRecommendationsPrompt",
    template: "You are an AI-powered trading strategy expert. Analyze the user profile and historical trading data provided, and generate tailored recommendations for ideal trading strategies.

User Profile: {{{userProfile}}}
Historical Data: {{{historicalData}}}

Provide a detailed recommendation on trading strategies that align with the user's profile and historical data, ensuring you provide reasoning for the suggested strategies.
",
    output_fields: &[("recommendations", "The AI-powered trade planning recommendations.")],
};
