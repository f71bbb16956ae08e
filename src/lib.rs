//! Carbon-footprint estimation and AI coaching service.
//!
//! Two cooperating pieces form the core: the pure [`estimate`] engine, which
//! maps habit data to tons of CO₂e per year, and the [`advice::AdviceGateway`],
//! a stateless proxy that turns a footprint plus an optional question into a
//! coaching reply or a fixed-size list of structured suggestions from an
//! upstream generative API. The [`routes`] module exposes both over HTTP.

pub mod advice;
pub mod args;
pub mod compare;
pub mod estimate;
pub mod factors;
pub mod llm;
pub mod logger;
pub mod parse;
pub mod prompt;
pub mod routes;
pub mod store;

pub use advice::{AdviceError, AdviceGateway, FootprintBreakdown, FootprintSnapshot, RetryPolicy};
pub use estimate::{FootprintInput, FootprintResult, estimate_total};
pub use llm::{GeminiClient, GenerativeClient};
pub use parse::{Suggestion, parse_suggestions};
pub use routes::{AppState, router};
pub use store::{FootprintStore, InMemoryStore, StoredFootprint};
