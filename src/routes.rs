//! HTTP surface for the estimation engine and advice gateway.
//!
//! Every handler terminates in a structured JSON body; internal diagnostic
//! detail goes to the log, never to the end user.

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

use crate::advice::{
    AdviceError, AdviceGateway, FALLBACK_TIPS, FootprintBreakdown, FootprintSnapshot,
    HistoryMessage, UNCONFIGURED_REPLY,
};
use crate::compare::equivalents;
use crate::estimate::{FootprintInput, FootprintResult};
use crate::store::{FootprintStore, StoredFootprint};

/// Shared handler state, constructed once at startup and passed by reference.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<AdviceGateway>,
    pub store: Arc<dyn FootprintStore>,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let chat_state = state.clone();
    let suggest_state = state.clone();
    let submit_state = state.clone();
    let history_state = state;
    Router::new()
        .route(
            "/api/chat",
            post(move |Json(body): Json<ChatBody>| {
                let state = chat_state.clone();
                async move { chat(state, body).await }
            }),
        )
        .route(
            "/api/suggestions",
            post(move |Json(body): Json<SuggestionsBody>| {
                let state = suggest_state.clone();
                async move { suggestions(state, body).await }
            }),
        )
        .route(
            "/api/footprint",
            post(move |Json(body): Json<FootprintBody>| {
                let state = submit_state.clone();
                async move { submit_footprint(state, body).await }
            }),
        )
        .route(
            "/api/footprint/:owner",
            get(move |Path(owner): Path<String>| {
                let state = history_state.clone();
                async move { footprint_history(state, owner).await }
            }),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ChatBody {
    message: Option<String>,
    footprint: Option<FootprintSnapshot>,
    habit_description: Option<String>,
    history: Vec<HistoryMessage>,
}

async fn chat(state: AppState, body: ChatBody) -> (StatusCode, Json<Value>) {
    let Some(message) = body.message.filter(|m| !m.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Message required"})),
        );
    };
    let footprint = body.footprint.unwrap_or_default();
    match state
        .gateway
        .chat(
            &message,
            &footprint,
            body.habit_description.as_deref(),
            &body.history,
        )
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(json!({"reply": reply}))),
        Err(err) => chat_failure(err),
    }
}

fn chat_failure(err: AdviceError) -> (StatusCode, Json<Value>) {
    match err {
        AdviceError::Unconfigured => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"reply": UNCONFIGURED_REPLY})),
        ),
        AdviceError::RateLimited { retry_after } => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "reply": format!(
                    "I'm answering a lot of questions right now. Give me about {retry_after} seconds and try again."
                ),
                "retryAfter": retry_after,
            })),
        ),
        AdviceError::ModelUnavailable => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "reply": "The coaching model is unavailable right now. Please try again later."
            })),
        ),
        AdviceError::AuthFailed => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "reply": "The coach's credentials were rejected. Please contact the site operator."
            })),
        ),
        AdviceError::Upstream(detail) => {
            warn!(%detail, "chat request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"reply": "Sorry, I had trouble processing that. Please try again!"})),
            )
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SuggestionsBody {
    transport: Option<f64>,
    energy: Option<f64>,
    diet: Option<f64>,
    waste: Option<f64>,
    total: Option<f64>,
    habit_description: Option<String>,
}

impl SuggestionsBody {
    /// All four category fields and the total are required; absence is
    /// rejected rather than defaulted to zero.
    fn breakdown(&self) -> Result<FootprintBreakdown, &'static str> {
        Ok(FootprintBreakdown {
            transport: self.transport.ok_or("transport")?,
            energy: self.energy.ok_or("energy")?,
            diet: self.diet.ok_or("diet")?,
            waste: self.waste.ok_or("waste")?,
            total: self.total.ok_or("total")?,
        })
    }
}

async fn suggestions(state: AppState, body: SuggestionsBody) -> (StatusCode, Json<Value>) {
    let breakdown = match body.breakdown() {
        Ok(b) => b,
        Err(field) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("Missing footprint field: {field}")})),
            );
        }
    };
    match state
        .gateway
        .suggestions(&breakdown, body.habit_description.as_deref())
        .await
    {
        Ok(list) => (StatusCode::OK, Json(json!({"suggestions": list}))),
        Err(err) => suggestions_failure(err),
    }
}

fn suggestions_failure(err: AdviceError) -> (StatusCode, Json<Value>) {
    match err {
        AdviceError::Unconfigured => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "The suggestion service is not configured.",
                "fallbackSuggestions": FALLBACK_TIPS,
            })),
        ),
        AdviceError::RateLimited { retry_after } => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": format!("Too many requests right now. Try again in about {retry_after} seconds."),
                "retryAfter": retry_after,
            })),
        ),
        err => {
            warn!(error = %err, "suggestions request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to generate suggestions. Please try again."})),
            )
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FootprintBody {
    owner: Option<String>,
    input: Option<FootprintInput>,
}

async fn submit_footprint(state: AppState, body: FootprintBody) -> (StatusCode, Json<Value>) {
    let Some(owner) = body.owner.filter(|o| !o.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Owner required"})),
        );
    };
    let Some(input) = body.input else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Footprint input required"})),
        );
    };

    let result = FootprintResult::compute(&input);
    let record = StoredFootprint::new(owner, input, result);
    if let Err(err) = state.store.append(&record).await {
        warn!(error = %err, "failed to append footprint record");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to save footprint"})),
        );
    }
    let comparisons = equivalents(record.result.total);
    (
        StatusCode::CREATED,
        Json(json!({
            "footprint": record,
            "equivalents": comparisons,
        })),
    )
}

async fn footprint_history(state: AppState, owner: String) -> (StatusCode, Json<Value>) {
    match state.store.history(&owner).await {
        Ok(history) => (StatusCode::OK, Json(json!({"history": history}))),
        Err(err) => {
            warn!(error = %err, "failed to load footprint history");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to load history"})),
            )
        }
    }
}
