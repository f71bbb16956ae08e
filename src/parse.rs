//! Lenient decoder for the model's suggestion output.
//!
//! The upstream model is instructed to return a raw JSON array but routinely
//! wraps it in code fences or surrounds it with prose. Decoding repairs what
//! it can and substitutes generic content when nothing usable remains; it
//! never surfaces a parse failure to the caller.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Effort level of a suggested change. Unrecognized wire values fold to
/// [`Difficulty::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl From<String> for Difficulty {
    fn from(s: String) -> Self {
        match s.trim() {
            "Easy" | "easy" => Difficulty::Easy,
            "Hard" | "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

/// One structured reduction suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    /// Estimated savings in tons CO₂e per year.
    pub impact: f64,
    pub difficulty: Difficulty,
}

/// Number of suggestions the response contract promises.
pub const SUGGESTION_COUNT: usize = 3;

/// Placeholder impact when the model's value cannot be coerced to a number.
pub const IMPACT_PLACEHOLDER: f64 = 0.5;

/// Generic suggestions returned when the model's output cannot be repaired.
pub fn fallback_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion {
            title: "Use public transport".into(),
            description: "Switch to bus or train for your daily commute to significantly cut \
                          transport emissions."
                .into(),
            impact: 0.8,
            difficulty: Difficulty::Easy,
        },
        Suggestion {
            title: "Reduce meat consumption".into(),
            description: "Going meat-free three days a week can cut your diet footprint by up \
                          to 30%."
                .into(),
            impact: 0.6,
            difficulty: Difficulty::Easy,
        },
        Suggestion {
            title: "Switch to LED bulbs".into(),
            description: "Replacing all bulbs with LEDs saves energy and reduces your home \
                          electricity bill."
                .into(),
            impact: 0.3,
            difficulty: Difficulty::Easy,
        },
    ]
}

static FENCE_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[a-zA-Z0-9]*\s*").expect("valid regex"));
static FENCE_CLOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```\s*$").expect("valid regex"));
static ARRAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)(\[.*\])").expect("valid regex"));

fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let opened = FENCE_OPEN_RE.replace(trimmed, "");
    let closed = FENCE_CLOSE_RE.replace(&opened, "");
    closed.trim().to_string()
}

fn head(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn coerce_impact(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(IMPACT_PLACEHOLDER),
        Value::String(s) => s.trim().parse().unwrap_or(IMPACT_PLACEHOLDER),
        _ => IMPACT_PLACEHOLDER,
    }
}

fn suggestion_from(value: &Value) -> Option<Suggestion> {
    let obj = value.as_object()?;
    let title = obj.get("title")?.as_str()?.to_string();
    let description = obj.get("description")?.as_str()?.to_string();
    let impact = obj.get("impact").map(coerce_impact).unwrap_or(IMPACT_PLACEHOLDER);
    let difficulty: Difficulty = obj
        .get("difficulty")
        .and_then(Value::as_str)
        .unwrap_or("Medium")
        .to_string()
        .into();
    Some(Suggestion {
        title,
        description,
        impact,
        difficulty,
    })
}

/// Decode the model's suggestion output.
///
/// Tries a direct parse of the fence-stripped text, then the first bracketed
/// span, then gives up and returns [`fallback_suggestions`]. The result is
/// always exactly [`SUGGESTION_COUNT`] items; short-but-valid arrays are
/// padded from the fallback set.
pub fn parse_suggestions(raw: &str) -> Vec<Suggestion> {
    let cleaned = strip_fences(raw);
    let items: Option<Vec<Value>> = serde_json::from_str(&cleaned).ok().or_else(|| {
        ARRAY_RE
            .captures(&cleaned)
            .and_then(|c| serde_json::from_str(c.get(1).map_or("", |m| m.as_str())).ok())
    });

    let Some(items) = items else {
        warn!(raw = %head(raw, 500), "suggestion parse failed, using fallback");
        return fallback_suggestions();
    };

    let mut suggestions: Vec<Suggestion> = items.iter().filter_map(suggestion_from).collect();
    if suggestions.is_empty() {
        warn!(raw = %head(raw, 500), "suggestion payload had no usable items, using fallback");
        return fallback_suggestions();
    }
    suggestions.truncate(SUGGESTION_COUNT);
    for extra in fallback_suggestions() {
        if suggestions.len() >= SUGGESTION_COUNT {
            break;
        }
        suggestions.push(extra);
    }
    suggestions
}
