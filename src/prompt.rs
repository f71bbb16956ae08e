//! Deterministic prompt construction for the advice gateway.
//!
//! Prompts carry the user's own numbers formatted to two decimals, with an
//! explicit `N/A` marker for fields that were never provided. Zero is a real
//! value and must stay distinguishable from "not provided", so absence is
//! tracked with `Option` all the way to the formatting step.

use crate::advice::{FootprintBreakdown, FootprintSnapshot, HistoryMessage, HistoryRole};
use crate::llm::{ChatTurn, Role};

/// Maximum number of history turns forwarded upstream.
pub const HISTORY_WINDOW: usize = 6;

fn tons(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    }
}

fn trend(footprint: &FootprintSnapshot) -> &'static str {
    match (footprint.previous_total, footprint.total) {
        (Some(prev), Some(total)) if total < prev => "improving",
        (Some(prev), Some(total)) if total > prev => "worsening",
        (Some(_), Some(_)) => "stable",
        _ => "unknown",
    }
}

/// Build the single instruction block for a coaching chat reply.
pub fn chat_prompt(
    message: &str,
    footprint: &FootprintSnapshot,
    habit_description: Option<&str>,
) -> String {
    let previous = match footprint.previous_total {
        Some(prev) => format!("{prev:.2} tons"),
        None => "not available".to_string(),
    };
    let habit_block = match habit_description.map(str::trim) {
        Some(habits) if !habits.is_empty() => {
            format!("\nThe user describes their habits as: \"{habits}\"\n")
        }
        _ => String::new(),
    };

    format!(
        "You are an expert and friendly carbon footprint coach. Your goal is to help the user \
understand their carbon emissions and give actionable advice to reduce them.\n\
\n\
User's current carbon footprint (tons CO2e per year):\n\
- Transport: {transport}\n\
- Home energy: {energy}\n\
- Diet: {diet}\n\
- Waste: {waste}\n\
- Total: {total}\n\
\n\
Previous total (if available): {previous} (shows a {trend} trend)\n\
{habit_block}\
User's question: \"{message}\"\n\
\n\
Guidelines:\n\
1. Be friendly and encouraging, with a warm conversational tone.\n\
2. Keep answers under 150 words unless the question requires more detail.\n\
3. Be specific and actionable, referring to the user's own numbers.\n\
4. If asked how to reduce or where to improve, start with the category that has the \
highest emissions and suggest 2-3 concrete changes with estimated savings in tons per year.\n\
5. If asked for comparisons, note that the average US footprint is about 16 tons and the \
global average is about 4 tons.\n\
6. If the question is unclear or unrelated to carbon reduction, politely ask for \
clarification instead of changing topics.\n\
7. Always end on a positive, motivating note.\n\
\n\
Write plain text, no markdown. Now answer the user's question.",
        transport = tons(footprint.transport),
        energy = tons(footprint.energy),
        diet = tons(footprint.diet),
        waste = tons(footprint.waste),
        total = tons(footprint.total),
        trend = trend(footprint),
    )
}

/// Build the instruction block for structured suggestion generation.
pub fn suggestions_prompt(footprint: &FootprintBreakdown, habit_description: Option<&str>) -> String {
    let habit_block = match habit_description.map(str::trim) {
        Some(habits) if !habits.is_empty() => {
            format!(
                "\nThe user describes their habits as: \"{habits}\"\nFactor this into your suggestions.\n"
            )
        }
        _ => String::new(),
    };

    format!(
        "You are an expert sustainability coach.\n\
A user just calculated their annual carbon footprint:\n\
- Transport: {transport:.2} tons CO2e\n\
- Energy (home): {energy:.2} tons CO2e\n\
- Diet: {diet:.2} tons CO2e\n\
- Waste: {waste:.2} tons CO2e\n\
- Total: {total:.2} tons CO2e\n\
{habit_block}\
\n\
Based on this breakdown, provide exactly 3 highly personalized, actionable suggestions. \
Focus on their worst categories first.\n\
\n\
IMPORTANT: Return ONLY a raw JSON array. No markdown, no explanation outside the JSON.\n\
Format:\n\
[\n\
    {{\n\
        \"title\": \"Short action title (max 8 words)\",\n\
        \"description\": \"Practical explanation (2-3 sentences)\",\n\
        \"impact\": 0.5,\n\
        \"difficulty\": \"Easy\"\n\
    }}\n\
]\n\
The \"impact\" field must be a NUMBER (tons CO2e saved per year), not a string.\n\
\"difficulty\" must be exactly one of: Easy, Medium, Hard",
        transport = footprint.transport,
        energy = footprint.energy,
        diet = footprint.diet,
        waste = footprint.waste,
        total = footprint.total,
    )
}

/// Translate caller-supplied history into upstream turns.
///
/// Entry 0 is the UI's greeting chrome and never part of the dialogue. The
/// remainder is truncated to the most recent [`HISTORY_WINDOW`] turns, then
/// leading turns are dropped until the window opens with a user turn, since
/// the upstream API rejects sequences that start with the model.
pub fn history_window(history: &[HistoryMessage]) -> Vec<ChatTurn> {
    let rest = history.get(1..).unwrap_or_default();
    let start = rest.len().saturating_sub(HISTORY_WINDOW);
    let mut turns: Vec<ChatTurn> = rest[start..]
        .iter()
        .map(|m| match m.role {
            HistoryRole::User => ChatTurn::user(m.content.clone()),
            HistoryRole::Assistant => ChatTurn::model(m.content.clone()),
        })
        .collect();
    while turns.first().is_some_and(|t| t.role != Role::User) {
        turns.remove(0);
    }
    turns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: HistoryRole, content: &str) -> HistoryMessage {
        HistoryMessage {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn missing_fields_render_as_na_not_zero() {
        let footprint = FootprintSnapshot {
            transport: Some(0.0),
            energy: None,
            ..Default::default()
        };
        let prompt = chat_prompt("help", &footprint, None);
        assert!(prompt.contains("- Transport: 0.00"));
        assert!(prompt.contains("- Home energy: N/A"));
        assert!(prompt.contains("- Total: N/A"));
    }

    #[test]
    fn trend_reflects_previous_total() {
        let footprint = FootprintSnapshot {
            total: Some(10.0),
            previous_total: Some(12.0),
            ..Default::default()
        };
        assert!(chat_prompt("q", &footprint, None).contains("improving"));

        let footprint = FootprintSnapshot {
            total: Some(12.0),
            previous_total: Some(10.0),
            ..Default::default()
        };
        assert!(chat_prompt("q", &footprint, None).contains("worsening"));

        let footprint = FootprintSnapshot::default();
        assert!(chat_prompt("q", &footprint, None).contains("unknown"));
    }

    #[test]
    fn habit_text_is_appended_verbatim() {
        let breakdown = FootprintBreakdown {
            transport: 1.0,
            energy: 2.0,
            diet: 3.0,
            waste: 0.5,
            total: 6.5,
        };
        let prompt = suggestions_prompt(&breakdown, Some("I bike to work, long showers"));
        assert!(prompt.contains("\"I bike to work, long showers\""));
        let without = suggestions_prompt(&breakdown, Some("   "));
        assert!(!without.contains("describes their habits"));
    }

    #[test]
    fn window_drops_greeting_and_truncates_to_six() {
        let mut history = vec![msg(HistoryRole::Assistant, "greeting")];
        for i in 0..9 {
            let role = if i % 2 == 0 {
                HistoryRole::User
            } else {
                HistoryRole::Assistant
            };
            history.push(msg(role, &format!("m{i}")));
        }
        assert_eq!(history.len(), 10);

        let turns = history_window(&history);
        assert!(turns.len() <= HISTORY_WINDOW);
        assert_eq!(turns.first().unwrap().role, Role::User);
        assert!(turns.iter().all(|t| t.text != "greeting"));
        assert_eq!(turns.last().unwrap().text, "m8");
    }

    #[test]
    fn window_drops_leading_model_turns() {
        let history = vec![
            msg(HistoryRole::Assistant, "greeting"),
            msg(HistoryRole::Assistant, "a1"),
            msg(HistoryRole::Assistant, "a2"),
            msg(HistoryRole::User, "u1"),
            msg(HistoryRole::Assistant, "a3"),
        ];
        let turns = history_window(&history);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text, "u1");
        assert_eq!(turns[0].role, Role::User);
    }

    #[test]
    fn all_model_window_collapses_to_empty() {
        let history = vec![
            msg(HistoryRole::Assistant, "greeting"),
            msg(HistoryRole::Assistant, "a1"),
            msg(HistoryRole::Assistant, "a2"),
        ];
        assert!(history_window(&history).is_empty());
    }
}
