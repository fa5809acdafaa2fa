// SPDX-License-Identifier: Apache-2.0
//! Advice resolver: local templated advice, or one bounded call to an
//! external chat-completions backend with a fixed fallback on any failure.
//!
//! The error-masking here is a contract, not an accident: when a credential
//! was supplied, callers always get `source: "ai"` and a non-empty advice
//! string, even when the backend timed out or answered garbage. The
//! success/fallback distinction is visible only in the logs.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default chat-completions endpoint (DashScope, OpenAI-compatible mode).
pub(crate) const DEFAULT_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";

/// Default model requested from the backend.
pub(crate) const DEFAULT_MODEL: &str = "qwen-turbo";

const SYSTEM_PROMPT: &str = "You are a professional carbon-reduction advisor. \
     Based on the user's emission data, give concise, actionable advice in at \
     most 100 characters.";

/// Served verbatim whenever the backend call fails in any way.
const FALLBACK_ADVICE: &str = "Keep up low-carbon habits: take public \
     transport more often and cut back on unnecessary purchases.";

/// Upper bound on generated length, to bound latency and cost.
const MAX_TOKENS: u32 = 200;

/// The backend call must never hang the whole request.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// Advice payload returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Advice {
    /// The advice text; never empty.
    pub(crate) advice: String,
    /// `"local"` for the templated path, `"ai"` whenever a key was supplied.
    pub(crate) source: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatContent>,
}

#[derive(Deserialize)]
struct ChatContent {
    #[serde(default)]
    content: Option<String>,
}

/// Resolves advice requests; owns the outbound HTTP client.
pub(crate) struct AdviceResolver {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    default_key: Option<String>,
}

impl AdviceResolver {
    /// Build a resolver with a bounded-timeout client.
    pub(crate) fn new(
        endpoint: String,
        model: String,
        default_key: Option<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .context("build advice http client")?;
        Ok(Self {
            http,
            endpoint,
            model,
            default_key,
        })
    }

    /// Per-request key wins over the process-wide default.
    fn effective_key<'a>(&'a self, request_key: Option<&'a str>) -> Option<&'a str> {
        request_key
            .filter(|key| !key.is_empty())
            .or(self.default_key.as_deref())
    }

    /// Resolve advice for one request. Never fails outward.
    pub(crate) async fn resolve(
        &self,
        week_carbon: f64,
        top_category: &str,
        request_key: Option<&str>,
    ) -> Advice {
        let Some(key) = self.effective_key(request_key) else {
            return Advice {
                advice: format!(
                    "Your footprint this week is {week_carbon:.1} kg CO2, mostly \
                     from {top_category}. Try trimming activity in that category."
                ),
                source: "local",
            };
        };

        match self.fetch(week_carbon, top_category, key).await {
            Ok(text) => {
                debug!(chars = text.len(), "advice backend answered");
                Advice {
                    advice: text,
                    source: "ai",
                }
            }
            // Masked by contract: callers still see source "ai".
            Err(err) => {
                warn!(?err, "advice backend failed; serving fallback");
                Advice {
                    advice: FALLBACK_ADVICE.to_owned(),
                    source: "ai",
                }
            }
        }
    }

    async fn fetch(&self, week_carbon: f64, top_category: &str, key: &str) -> Result<String> {
        let user_prompt = format!(
            "My carbon footprint this week is {week_carbon:.1} kg, mostly from \
             {top_category} activity. Please give me advice on reducing it."
        );
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(&request)
            .send()
            .await
            .context("send advice request")?
            .error_for_status()
            .context("advice backend status")?;
        let parsed: ChatResponse = response.json().await.context("decode advice response")?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow!("advice response missing content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens here; connections are refused immediately.
    fn dead_resolver(default_key: Option<&str>) -> AdviceResolver {
        AdviceResolver::new(
            "http://127.0.0.1:9/v1/chat/completions".into(),
            DEFAULT_MODEL.into(),
            default_key.map(str::to_owned),
        )
        .expect("resolver")
    }

    #[tokio::test]
    async fn keyless_advice_is_local_and_deterministic() {
        let resolver = dead_resolver(None);
        let advice = resolver.resolve(12.34, "transport", None).await;
        assert_eq!(advice.source, "local");
        assert!(advice.advice.contains("12.3"), "one-decimal carbon figure");
        assert!(advice.advice.contains("transport"));
    }

    #[tokio::test]
    async fn backend_failure_is_masked_by_the_fallback() {
        let resolver = dead_resolver(None);
        let advice = resolver.resolve(5.0, "food", Some("sk-test")).await;
        assert_eq!(advice.source, "ai");
        assert_eq!(advice.advice, FALLBACK_ADVICE);
    }

    #[tokio::test]
    async fn process_wide_key_also_selects_the_ai_path() {
        let resolver = dead_resolver(Some("sk-env"));
        let advice = resolver.resolve(5.0, "energy", None).await;
        assert_eq!(advice.source, "ai");
        assert!(!advice.advice.is_empty());
    }

    #[test]
    fn request_key_wins_over_default() {
        let resolver = dead_resolver(Some("sk-env"));
        assert_eq!(resolver.effective_key(Some("sk-req")), Some("sk-req"));
        assert_eq!(resolver.effective_key(None), Some("sk-env"));
        // empty per-request key reads as absent
        assert_eq!(resolver.effective_key(Some("")), Some("sk-env"));
    }
}
