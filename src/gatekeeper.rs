//! Governance Pipeline
//!
//! Runs one query through guard, router, cache, limiter, rotator and the
//! provider, in that order. Every failure comes back as a value.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::context::{AppContext, CachedReply};
use crate::error::{GatekeeperError, Result};
use crate::provider::Provider;
use crate::rotator::mask_credential;
use crate::router::{normalize_command, Intent, RoutingDecision, RoutingMode};

// == Gated Response ==
/// Answer returned to the host backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatedResponse {
    pub text: String,
    pub mode: RoutingMode,
    pub confidence: f64,
    pub sources: Vec<String>,
    /// True when no provider call was made for this answer
    pub cached: bool,
    pub decision: RoutingDecision,
}

impl GatedResponse {
    fn from_cache(reply: CachedReply, decision: RoutingDecision) -> Self {
        Self {
            text: reply.text,
            mode: decision.mode(),
            confidence: reply.confidence,
            sources: reply.sources,
            cached: true,
            decision,
        }
    }
}

impl AppContext {
    // == Handle ==
    /// Governs a single query for `caller_id`.
    ///
    /// Fast-path decisions are answered from cache or a canned reply. All
    /// other modes must pass the rate limiter and obtain a credential before
    /// the provider is called. Only context-free FAQ answers are written back
    /// to the response cache.
    pub async fn handle<P: Provider>(
        &self,
        caller_id: &str,
        command: &str,
        context: Option<&Value>,
        provider: &P,
    ) -> Result<GatedResponse> {
        let input = self.guard.validate_and_sanitize(command, context)?;
        // Routing sees the validated text; the escaped form is for the provider.
        let raw_command = command.trim();
        let decision = self.router.route(raw_command, input.context.as_ref());

        if decision.mode() == RoutingMode::FastPath {
            if let Some(reply) = self.responses.get(decision.cache_key()) {
                debug!(key = %decision.cache_key(), "serving cached reply");
                return Ok(GatedResponse::from_cache(reply, decision));
            }

            // A cached FAQ answer can expire between routing and lookup, so
            // only social messages get a canned answer here.
            if decision.detected_intents().contains(&Intent::Simple) {
                return Ok(GatedResponse {
                    text: canned_reply(raw_command).to_string(),
                    mode: RoutingMode::FastPath,
                    confidence: decision.confidence(),
                    sources: Vec::new(),
                    cached: true,
                    decision,
                });
            }
        }

        if !self.limiter.can_make_request(caller_id) {
            let wait_seconds = self.limiter.wait_time(caller_id);
            info!(caller = %caller_id, wait_seconds, "caller rate limited");
            return Err(GatekeeperError::RateLimited { wait_seconds });
        }

        let credential = self
            .credentials
            .next_key()
            .ok_or(GatekeeperError::CredentialsExhausted)?;

        let reply = match provider
            .generate(&credential, &input.command, input.context.as_ref())
            .await
        {
            Ok(reply) => reply,
            Err(err) if err.is_quota_exceeded() => {
                self.credentials.mark_failed(&credential);
                return Err(GatekeeperError::ProviderQuota {
                    retry_after: self.quota_retry_after(),
                });
            }
            Err(err) => {
                warn!(credential = %mask_credential(&credential), error = %err, "provider call failed");
                return Err(GatekeeperError::Provider(err.to_string()));
            }
        };

        let mode = match decision.mode() {
            // FAQ whose cached answer vanished: the knowledge path answered it
            RoutingMode::FastPath => RoutingMode::Knowledge,
            other => other,
        };
        if input.context.is_none() && decision.detected_intents().contains(&Intent::Faq) {
            self.responses.set(
                decision.cache_key(),
                CachedReply {
                    text: reply.text.clone(),
                    confidence: reply.confidence,
                    sources: reply.sources.clone(),
                    mode,
                },
                None,
            );
        }

        Ok(GatedResponse {
            text: reply.text,
            mode,
            confidence: reply.confidence,
            sources: reply.sources,
            cached: false,
            decision,
        })
    }
}

/// Canned answers for social messages, keyed on the normalized command.
fn canned_reply(command: &str) -> &'static str {
    let normalized = normalize_command(command);
    let first = normalized.split(' ').next().unwrap_or_default();
    match first {
        "terima" | "thanks" | "thank" | "tq" | "ty" | "thx" => "You're welcome! Anything else I can help with?",
        "bye" | "goodbye" | "jumpa" | "see" | "take" => "Goodbye! Feel free to come back anytime.",
        "ok" | "okay" | "okey" | "baik" | "noted" | "faham" | "alright" | "sure" | "yes" | "ya"
        | "no" | "tidak" | "cool" | "great" | "nice" => {
            "Noted. Let me know if you need anything else."
        }
        "selamat" if normalized == "selamat tinggal" => "Goodbye! Feel free to come back anytime.",
        _ => "Hello! How can I help you today?",
    }
}

// == Degraded Message ==
/// User-facing text for capacity errors; `None` for everything else.
pub fn degraded_message(err: &GatekeeperError) -> Option<String> {
    match err {
        GatekeeperError::RateLimited { wait_seconds } => Some(format!(
            "You are sending requests too quickly. Please try again in {} seconds.",
            wait_seconds.ceil() as u64
        )),
        GatekeeperError::CredentialsExhausted => Some(
            "The assistant is busy right now. Please try again in a moment.".to_string(),
        ),
        GatekeeperError::ProviderQuota { retry_after } => Some(format!(
            "The assistant has reached its usage limit. Please try again in {retry_after} seconds."
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::provider::{ProviderError, ProviderReply};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Provider that replays scripted outcomes and records the credentials it saw.
    #[derive(Default)]
    struct ScriptedProvider {
        outcomes: Mutex<VecDeque<std::result::Result<ProviderReply, ProviderError>>>,
        credentials: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn with(outcomes: Vec<std::result::Result<ProviderReply, ProviderError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                credentials: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.credentials.lock().clone()
        }
    }

    impl Provider for ScriptedProvider {
        async fn generate(
            &self,
            credential: &str,
            _prompt: &str,
            _context: Option<&Value>,
        ) -> std::result::Result<ProviderReply, ProviderError> {
            self.credentials.lock().push(credential.to_string());
            self.outcomes
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(ProviderReply::new("default answer", 0.5)))
        }
    }

    fn ctx_with(max_requests: usize) -> AppContext {
        let mut config = Config::default().with_provider_keys(["key-A", "key-B"]);
        config.rate_limit_max_requests = max_requests;
        AppContext::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_greeting_never_calls_provider() {
        let ctx = ctx_with(10);
        let provider = ScriptedProvider::default();

        let response = ctx.handle("u1", "Hai", None, &provider).await.unwrap();

        assert_eq!(response.mode, RoutingMode::FastPath);
        assert!(response.cached);
        assert!(provider.calls().is_empty());
        assert_eq!(ctx.limiter.stats().admitted, 0);
    }

    #[tokio::test]
    async fn test_faq_reply_is_cached_and_reused() {
        let ctx = ctx_with(10);
        let provider = ScriptedProvider::with(vec![Ok(
            ProviderReply::new("A faculty", 0.8).with_sources(["handbook"])
        )]);

        let first = ctx
            .handle("u1", "What is FSKTM?", None, &provider)
            .await
            .unwrap();
        assert!(!first.cached);
        assert_eq!(first.mode, RoutingMode::Knowledge);

        let second = ctx
            .handle("u2", "what is fsktm", None, &provider)
            .await
            .unwrap();
        assert!(second.cached);
        assert_eq!(second.mode, RoutingMode::FastPath);
        assert_eq!(second.sources, vec!["handbook"]);
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_non_faq_reply_is_never_shared_between_callers() {
        let ctx = ctx_with(10);
        let provider = ScriptedProvider::with(vec![
            Ok(ProviderReply::new("grades for alice", 0.8)),
            Ok(ProviderReply::new("grades for bob", 0.8)),
        ]);

        let alice = ctx
            .handle("alice", "Show my grades", Some(&json!({"student": "alice"})), &provider)
            .await
            .unwrap();
        let bob = ctx
            .handle("bob", "Show my grades", Some(&json!({"student": "bob"})), &provider)
            .await
            .unwrap();

        assert_eq!(alice.text, "grades for alice");
        assert_eq!(bob.mode, RoutingMode::Tools);
        assert!(!bob.cached);
        assert_eq!(bob.text, "grades for bob");
        assert_eq!(provider.calls().len(), 2);
        assert!(ctx.responses.is_empty());
    }

    #[tokio::test]
    async fn test_faq_with_context_is_not_written_back() {
        let ctx = ctx_with(10);
        let provider = ScriptedProvider::default();

        ctx.handle("u1", "What is my CGPA?", Some(&json!({"student": "u1"})), &provider)
            .await
            .unwrap();

        assert!(ctx.responses.is_empty());
    }

    #[tokio::test]
    async fn test_apostrophe_faq_is_detected() {
        let ctx = ctx_with(10);
        let provider = ScriptedProvider::default();

        let response = ctx
            .handle("u1", "What's FSKTM?", None, &provider)
            .await
            .unwrap();

        assert_eq!(
            response.decision.detected_intents(),
            &[Intent::Faq, Intent::Knowledge]
        );
        assert_eq!(ctx.responses.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_input_stops_pipeline() {
        let ctx = ctx_with(10);
        let provider = ScriptedProvider::default();

        let err = ctx
            .handle("u1", "<script>alert(1)</script>", None, &provider)
            .await
            .unwrap_err();

        assert!(matches!(err, GatekeeperError::InputRejected(_)));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limited_caller() {
        let ctx = ctx_with(1);
        let provider = ScriptedProvider::default();

        ctx.handle("u1", "Cari pelajar dengan CGPA 3.5 ke atas", None, &provider)
            .await
            .unwrap();
        let err = ctx
            .handle("u1", "Senaraikan kursus semester ini", None, &provider)
            .await
            .unwrap_err();

        match &err {
            GatekeeperError::RateLimited { wait_seconds } => assert!(*wait_seconds > 0.0),
            other => panic!("expected rate limit, got {other:?}"),
        }
        assert!(degraded_message(&err).is_some());
    }

    #[tokio::test]
    async fn test_quota_error_cools_credential_down() {
        let ctx = ctx_with(10);
        let provider = ScriptedProvider::with(vec![
            Err(ProviderError::new("429 Too Many Requests: quota exceeded")),
            Ok(ProviderReply::new("answer", 0.7)),
        ]);

        let err = ctx
            .handle("u1", "Senaraikan kursus tahun satu", None, &provider)
            .await
            .unwrap_err();
        assert_eq!(err, GatekeeperError::ProviderQuota { retry_after: 60 });

        ctx.handle("u1", "Senaraikan kursus tahun dua", None, &provider)
            .await
            .unwrap();
        ctx.handle("u1", "Senaraikan kursus tahun tiga", None, &provider)
            .await
            .unwrap();

        // key-A failed on the first call and stays out of rotation
        assert_eq!(provider.calls(), vec!["key-A", "key-B", "key-B"]);
        assert_eq!(ctx.credentials.stats().in_cooldown, 1);
    }

    #[tokio::test]
    async fn test_all_credentials_exhausted() {
        let ctx = ctx_with(10);
        ctx.credentials.mark_failed("key-A");
        ctx.credentials.mark_failed("key-B");
        let provider = ScriptedProvider::default();

        let err = ctx
            .handle("u1", "Senaraikan kursus", None, &provider)
            .await
            .unwrap_err();

        assert_eq!(err, GatekeeperError::CredentialsExhausted);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_other_provider_errors_do_not_cool_down() {
        let ctx = ctx_with(10);
        let provider =
            ScriptedProvider::with(vec![Err(ProviderError::new("connection reset by peer"))]);

        let err = ctx
            .handle("u1", "Senaraikan kursus", None, &provider)
            .await
            .unwrap_err();

        assert!(matches!(err, GatekeeperError::Provider(_)));
        assert_eq!(ctx.credentials.stats().in_cooldown, 0);
        assert!(degraded_message(&err).is_none());
    }

    #[test]
    fn test_canned_replies() {
        assert_eq!(canned_reply("Hai"), "Hello! How can I help you today?");
        assert_eq!(
            canned_reply("Terima kasih!"),
            "You're welcome! Anything else I can help with?"
        );
        assert_eq!(
            canned_reply("selamat tinggal"),
            "Goodbye! Feel free to come back anytime."
        );
        assert_eq!(canned_reply("selamat pagi"), "Hello! How can I help you today?");
    }

    #[tokio::test]
    async fn test_expired_faq_answer_falls_through_to_provider() {
        let ctx = ctx_with(10);
        let provider = ScriptedProvider::with(vec![Ok(ProviderReply::new("A faculty", 0.9))]);

        let response = ctx
            .handle("u1", "Apa itu FSKTM?", None, &provider)
            .await
            .unwrap();

        assert!(!response.cached);
        assert_eq!(response.mode, RoutingMode::Knowledge);
        assert_eq!(provider.calls().len(), 1);

        let again = ctx
            .handle("u1", "Apa itu FSKTM?", None, &provider)
            .await
            .unwrap();
        assert!(again.cached);
        assert_eq!(again.mode, RoutingMode::FastPath);
    }

    #[test]
    fn test_degraded_messages() {
        assert!(degraded_message(&GatekeeperError::CredentialsExhausted)
            .unwrap()
            .contains("busy"));
        assert!(degraded_message(&GatekeeperError::ProviderQuota { retry_after: 60 })
            .unwrap()
            .contains("60 seconds"));
        assert!(degraded_message(&GatekeeperError::RateLimited { wait_seconds: 1.2 })
            .unwrap()
            .contains("2 seconds"));
        assert!(degraded_message(&GatekeeperError::InputRejected("x".into())).is_none());
    }
}
