//! The AI advice gateway.
//!
//! Stateless request/response proxy in front of the generative API: builds a
//! prompt, makes one call, retries exactly once on a rate-limit condition
//! (sleeping for the server-suggested delay when the failure names one) and
//! maps every other failure straight to the error taxonomy. Each invocation
//! starts fresh; nothing is cached between calls.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::llm::{ChatTurn, FailureClass, GenerativeClient, UpstreamError, classify};
use crate::parse::{Suggestion, parse_suggestions};
use crate::prompt;

/// Static reply for deployments without an upstream credential.
pub const UNCONFIGURED_REPLY: &str =
    "The AI coach is not configured yet. Ask the site operator to set a GEMINI_API_KEY.";

/// Generic tips returned alongside an unconfigured suggestions response.
pub const FALLBACK_TIPS: [&str; 3] = [
    "Drive less or carpool to reduce your transportation emissions.",
    "Switch to LED lightbulbs to save energy.",
    "Incorporate more plant-based meals into your diet.",
];

/// Footprint snapshot passed along with a chat question. Every field is
/// optional; zero is a real value and absence renders as `N/A` in the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FootprintSnapshot {
    pub transport: Option<f64>,
    pub energy: Option<f64>,
    pub diet: Option<f64>,
    pub waste: Option<f64>,
    pub total: Option<f64>,
    pub previous_total: Option<f64>,
}

/// Complete category breakdown required for suggestion generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootprintBreakdown {
    pub transport: f64,
    pub energy: f64,
    pub diet: f64,
    pub waste: f64,
    pub total: f64,
}

/// Speaker of a caller-supplied history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
}

/// One entry of the caller-owned conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: HistoryRole,
    pub content: String,
}

/// Delay policy for the single rate-limit retry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Wait before the one automatic retry when the failure names no delay.
    pub first_delay: Duration,
    /// Wait hint reported to the caller once the retry is exhausted and the
    /// second failure names no delay of its own.
    pub exhausted_hint: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            first_delay: Duration::from_secs(15),
            exhausted_hint: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(first_delay: Duration, exhausted_hint: Duration) -> Self {
        Self {
            first_delay,
            exhausted_hint,
        }
    }
}

/// Failure surfaced by the gateway. Every code path through the gateway
/// terminates in a payload or one of these; nothing else escapes.
#[derive(Debug, thiserror::Error)]
pub enum AdviceError {
    #[error("no upstream credential configured")]
    Unconfigured,
    #[error("rate limited, retry in {retry_after}s")]
    RateLimited { retry_after: u64 },
    #[error("model unavailable")]
    ModelUnavailable,
    #[error("authentication rejected upstream")]
    AuthFailed,
    #[error("upstream failure: {0}")]
    Upstream(String),
}

/// Stateless proxy turning footprints and questions into coaching replies or
/// structured suggestions.
pub struct AdviceGateway {
    chat_client: Option<Arc<dyn GenerativeClient>>,
    suggest_client: Option<Arc<dyn GenerativeClient>>,
    policy: RetryPolicy,
}

impl AdviceGateway {
    /// Gateway with configured upstream clients. Chat and suggestion
    /// generation may be served by different models.
    pub fn new(
        chat_client: Arc<dyn GenerativeClient>,
        suggest_client: Arc<dyn GenerativeClient>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            chat_client: Some(chat_client),
            suggest_client: Some(suggest_client),
            policy,
        }
    }

    /// Gateway for deployments without a credential. Every call short-circuits
    /// to [`AdviceError::Unconfigured`] without touching the network.
    pub fn unconfigured() -> Self {
        Self {
            chat_client: None,
            suggest_client: None,
            policy: RetryPolicy::default(),
        }
    }

    /// Free-text coaching reply to `message`.
    pub async fn chat(
        &self,
        message: &str,
        footprint: &FootprintSnapshot,
        habit_description: Option<&str>,
        history: &[HistoryMessage],
    ) -> Result<String, AdviceError> {
        let client = self.chat_client.as_ref().ok_or(AdviceError::Unconfigured)?;
        let mut turns = prompt::history_window(history);
        turns.push(ChatTurn::user(prompt::chat_prompt(
            message,
            footprint,
            habit_description,
        )));
        let reply = self.call_with_retry(client.as_ref(), &turns).await?;
        Ok(reply.trim().to_string())
    }

    /// Exactly three structured suggestions for `footprint`. Unparseable model
    /// output is repaired, never surfaced as an error.
    pub async fn suggestions(
        &self,
        footprint: &FootprintBreakdown,
        habit_description: Option<&str>,
    ) -> Result<Vec<Suggestion>, AdviceError> {
        let client = self
            .suggest_client
            .as_ref()
            .ok_or(AdviceError::Unconfigured)?;
        let turns = vec![ChatTurn::user(prompt::suggestions_prompt(
            footprint,
            habit_description,
        ))];
        let raw = self.call_with_retry(client.as_ref(), &turns).await?;
        Ok(parse_suggestions(&raw))
    }

    /// One upstream call, plus at most one automatic retry when the first
    /// failure classifies as rate-limited. A second rate-limit failure is
    /// surfaced with a caller-visible wait hint; no third attempt is made.
    async fn call_with_retry(
        &self,
        client: &dyn GenerativeClient,
        turns: &[ChatTurn],
    ) -> Result<String, AdviceError> {
        let first = match client.generate(turns).await {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };
        match classify(&first) {
            FailureClass::RateLimited { delay } => {
                let wait = delay.unwrap_or(self.policy.first_delay);
                debug!(wait_s = wait.as_secs_f64(), "rate limited upstream, retrying once");
                tokio::time::sleep(wait).await;
                match client.generate(turns).await {
                    Ok(text) => Ok(text),
                    Err(second) => Err(self.terminal(second)),
                }
            }
            class => Err(map_class(class, &first)),
        }
    }

    fn terminal(&self, err: UpstreamError) -> AdviceError {
        match classify(&err) {
            FailureClass::RateLimited { delay } => {
                let hint = delay.unwrap_or(self.policy.exhausted_hint);
                warn!(error = %err, retry_after_s = hint.as_secs(), "retry exhausted, still rate limited");
                AdviceError::RateLimited {
                    retry_after: hint.as_secs(),
                }
            }
            class => map_class(class, &err),
        }
    }
}

fn map_class(class: FailureClass, err: &UpstreamError) -> AdviceError {
    warn!(error = %err, ?class, "upstream call failed");
    match class {
        FailureClass::ModelUnavailable => AdviceError::ModelUnavailable,
        FailureClass::AuthFailed => AdviceError::AuthFailed,
        // Rate limits are handled before mapping; reaching here means the
        // classification changed mid-flight, so treat it as unknown.
        FailureClass::RateLimited { .. } | FailureClass::Unknown => {
            AdviceError::Upstream(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted client: pops one response per call and counts invocations.
    struct ScriptedClient {
        responses: std::sync::Mutex<Vec<Result<String, UpstreamError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<String, UpstreamError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: std::sync::Mutex::new(responses),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeClient for ScriptedClient {
        async fn generate(&self, _turns: &[ChatTurn]) -> Result<String, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                panic!("unexpected extra upstream call");
            }
            responses.remove(0)
        }
    }

    fn rate_limit(message: &str) -> UpstreamError {
        UpstreamError::Status {
            code: 429,
            message: message.to_string(),
        }
    }

    fn zero_delay_gateway(client: Arc<ScriptedClient>) -> AdviceGateway {
        AdviceGateway::new(
            client.clone(),
            client,
            RetryPolicy::new(Duration::from_millis(0), Duration::from_secs(30)),
        )
    }

    fn breakdown() -> FootprintBreakdown {
        FootprintBreakdown {
            transport: 4.3,
            energy: 5.2,
            diet: 2.5,
            waste: 0.4,
            total: 12.4,
        }
    }

    #[tokio::test]
    async fn unconfigured_gateway_never_calls_upstream() {
        let gateway = AdviceGateway::unconfigured();
        let err = gateway
            .chat("hi", &FootprintSnapshot::default(), None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AdviceError::Unconfigured));

        let err = gateway.suggestions(&breakdown(), None).await.unwrap_err();
        assert!(matches!(err, AdviceError::Unconfigured));
    }

    #[tokio::test]
    async fn chat_trims_the_reply() {
        let client = ScriptedClient::new(vec![Ok("  a reply \n".into())]);
        let gateway = zero_delay_gateway(client.clone());
        let reply = gateway
            .chat("hi", &FootprintSnapshot::default(), None, &[])
            .await
            .unwrap();
        assert_eq!(reply, "a reply");
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn rate_limit_retries_exactly_once_then_succeeds() {
        let client = ScriptedClient::new(vec![
            Err(rate_limit("quota exceeded, retry in 0s")),
            Ok("second try".into()),
        ]);
        let gateway = zero_delay_gateway(client.clone());
        let reply = gateway
            .chat("hi", &FootprintSnapshot::default(), None, &[])
            .await
            .unwrap();
        assert_eq!(reply, "second try");
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn second_rate_limit_surfaces_wait_hint_without_third_attempt() {
        let client = ScriptedClient::new(vec![
            Err(rate_limit("retry in 0s")),
            Err(rate_limit("still throttled, retry in 10s")),
        ]);
        let gateway = zero_delay_gateway(client.clone());
        let err = gateway
            .chat("hi", &FootprintSnapshot::default(), None, &[])
            .await
            .unwrap_err();
        match err {
            AdviceError::RateLimited { retry_after } => assert_eq!(retry_after, 10),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn second_rate_limit_without_delay_uses_exhausted_hint() {
        let client = ScriptedClient::new(vec![
            Err(rate_limit("retry in 0s")),
            Err(rate_limit("throttled")),
        ]);
        let gateway = zero_delay_gateway(client.clone());
        let err = gateway
            .chat("hi", &FootprintSnapshot::default(), None, &[])
            .await
            .unwrap_err();
        match err {
            AdviceError::RateLimited { retry_after } => assert_eq!(retry_after, 30),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn hard_errors_are_not_retried() {
        let client = ScriptedClient::new(vec![Err(UpstreamError::Status {
            code: 404,
            message: "model not found".into(),
        })]);
        let gateway = zero_delay_gateway(client.clone());
        let err = gateway
            .chat("hi", &FootprintSnapshot::default(), None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AdviceError::ModelUnavailable));
        assert_eq!(client.calls(), 1);

        let client = ScriptedClient::new(vec![Err(UpstreamError::Status {
            code: 401,
            message: "bad key".into(),
        })]);
        let gateway = zero_delay_gateway(client.clone());
        let err = gateway.suggestions(&breakdown(), None).await.unwrap_err();
        assert!(matches!(err, AdviceError::AuthFailed));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn suggestions_repair_unparseable_output() {
        let client = ScriptedClient::new(vec![Ok("no json here at all".into())]);
        let gateway = zero_delay_gateway(client);
        let suggestions = gateway.suggestions(&breakdown(), None).await.unwrap();
        assert_eq!(suggestions.len(), 3);
    }
}
