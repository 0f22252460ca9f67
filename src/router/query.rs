//! Query Router Module
//!
//! Stateless decision tree that maps a validated command to a processing mode.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::{hash_text, KeyLookup};
use crate::router::{Intent, PatternTable, RoutingDecision, RoutingMode};

/// Namespace of query cache keys
pub const QUERY_KEY_NAMESPACE: &str = "query";

/// Default length below which a social command may take the fast-path
pub const DEFAULT_SHORT_THRESHOLD: usize = 50;

const SIMPLE_CONFIDENCE: f64 = 0.95;
const FAQ_HIT_CONFIDENCE: f64 = 0.9;
const COMBINED_CONFIDENCE: f64 = 0.85;
const TOOLS_CONFIDENCE: f64 = 0.8;
const KNOWLEDGE_CONFIDENCE: f64 = 0.85;
const FALLBACK_CONFIDENCE: f64 = 0.6;

/// Complexity above this sends a command to tool mode.
const COMPLEXITY_THRESHOLD: f64 = 0.5;

// == Complexity ==
/// Additive complexity score, capped at 1.0.
///
/// - length: up to 0.3, reached at 500 characters
/// - 0.15 per conjunction
/// - 0.1 per question mark
/// - 0.2 per complex-pattern match
pub fn complexity_score(length: usize, conjunctions: usize, questions: usize, complex_matches: usize) -> f64 {
    let length_part = (length as f64 / 500.0 * 0.3).min(0.3);
    let score = length_part
        + conjunctions as f64 * 0.15
        + questions as f64 * 0.1
        + complex_matches as f64 * 0.2;
    score.min(1.0)
}

// == Normalize ==
/// Lower-cases, strips punctuation and collapses whitespace.
pub fn normalize_command(command: &str) -> String {
    let stripped: String = command
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deterministic cache key for a command.
pub fn query_cache_key(command: &str) -> String {
    hash_text(QUERY_KEY_NAMESPACE, &normalize_command(command))
}

// == Query Router ==
pub struct QueryRouter {
    patterns: &'static PatternTable,
    responses: Arc<dyn KeyLookup>,
    short_threshold: usize,
}

impl QueryRouter {
    /// Router over the built-in pattern table.
    ///
    /// `responses` is consulted for FAQ-shaped commands only.
    pub fn new(responses: Arc<dyn KeyLookup>, short_threshold: usize) -> Self {
        Self::with_patterns(PatternTable::builtin(), responses, short_threshold)
    }

    pub fn with_patterns(
        patterns: &'static PatternTable,
        responses: Arc<dyn KeyLookup>,
        short_threshold: usize,
    ) -> Self {
        Self {
            patterns,
            responses,
            short_threshold,
        }
    }

    // == Route ==
    pub fn route(&self, command: &str, context: Option<&Value>) -> RoutingDecision {
        let decision = self.decide(command);
        debug!(
            mode = %decision.mode(),
            confidence = decision.confidence(),
            intents = ?decision.detected_intents(),
            has_context = context.is_some(),
            "query routed"
        );
        decision
    }

    fn decide(&self, command: &str) -> RoutingDecision {
        let trimmed = command.trim();
        let normalized = normalize_command(trimmed);
        let cache_key = hash_text(QUERY_KEY_NAMESPACE, &normalized);
        let length = trimmed.chars().count();
        let mut intents: Vec<Intent> = Vec::new();

        // Social fast-path: the length gate is mandatory
        if length < self.short_threshold && self.patterns.matches(Intent::Simple, &normalized) {
            push_intent(&mut intents, Intent::Simple);
            return RoutingDecision::new(
                RoutingMode::FastPath,
                SIMPLE_CONFIDENCE,
                "short social message",
                cache_key,
                intents,
            );
        }

        if self.patterns.matches(Intent::Faq, trimmed) {
            push_intent(&mut intents, Intent::Faq);
            if self.responses.contains_key(&cache_key) {
                return RoutingDecision::new(
                    RoutingMode::FastPath,
                    FAQ_HIT_CONFIDENCE,
                    "frequently asked question with cached answer",
                    cache_key,
                    intents,
                );
            }
        }

        let complex_matches = self.patterns.count(Intent::Complex, trimmed);
        let is_complex = complex_matches > 0;
        let needs_tools = self.patterns.matches(Intent::ToolRequired, trimmed);
        let needs_knowledge = self.patterns.matches(Intent::Knowledge, trimmed);
        let complexity = complexity_score(
            length,
            self.patterns.conjunction_count(trimmed),
            trimmed.matches('?').count(),
            complex_matches,
        );

        if is_complex {
            push_intent(&mut intents, Intent::Complex);
        }
        if needs_tools {
            push_intent(&mut intents, Intent::ToolRequired);
        }
        if needs_knowledge {
            push_intent(&mut intents, Intent::Knowledge);
        }

        let (mode, confidence, reason) = if is_complex && needs_knowledge {
            (
                RoutingMode::Combined,
                COMBINED_CONFIDENCE,
                "analytical query over knowledge-base entities".to_string(),
            )
        } else if needs_tools || is_complex || complexity > COMPLEXITY_THRESHOLD {
            let reason = if needs_tools {
                "query needs structured data lookups".to_string()
            } else if is_complex {
                "analytical query needs multi-step processing".to_string()
            } else {
                format!("complexity {complexity:.2} above threshold")
            };
            (RoutingMode::Tools, TOOLS_CONFIDENCE, reason)
        } else if needs_knowledge {
            (
                RoutingMode::Knowledge,
                KNOWLEDGE_CONFIDENCE,
                "knowledge-base lookup".to_string(),
            )
        } else {
            (
                RoutingMode::Knowledge,
                FALLBACK_CONFIDENCE,
                "no specific intent, trying knowledge base first".to_string(),
            )
        };

        RoutingDecision::new(mode, confidence, reason, cache_key, intents)
    }
}

fn push_intent(intents: &mut Vec<Intent>, intent: Intent) {
    if !intents.contains(&intent) {
        intents.push(intent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SharedCache;

    fn router_with_cache() -> (QueryRouter, Arc<SharedCache<String>>) {
        let cache = Arc::new(SharedCache::new("responses", 100, 300));
        let router = QueryRouter::new(cache.clone(), DEFAULT_SHORT_THRESHOLD);
        (router, cache)
    }

    fn route(command: &str) -> RoutingDecision {
        router_with_cache().0.route(command, None)
    }

    #[test]
    fn test_greeting_takes_fast_path() {
        let decision = route("Hai");
        assert_eq!(decision.mode(), RoutingMode::FastPath);
        assert_eq!(decision.confidence(), 0.95);
        assert_eq!(decision.detected_intents(), &[Intent::Simple]);
    }

    #[test]
    fn test_tool_query() {
        let decision = route("Cari pelajar dengan CGPA 3.5 ke atas");
        assert_eq!(decision.mode(), RoutingMode::Tools);
        assert_eq!(decision.confidence(), 0.8);
        assert_eq!(decision.detected_intents(), &[Intent::ToolRequired]);
    }

    #[test]
    fn test_knowledge_query() {
        let decision = route("Siapa ketua FSKTM?");
        assert_eq!(decision.mode(), RoutingMode::Knowledge);
        assert_eq!(decision.confidence(), 0.85);
        assert_eq!(decision.detected_intents(), &[Intent::Knowledge]);
    }

    #[test]
    fn test_combined_query() {
        let decision = route("Analyze prestasi pelajar dan bandingkan dengan jabatan lain");
        assert_eq!(decision.mode(), RoutingMode::Combined);
        assert_eq!(decision.confidence(), 0.85);
        assert_eq!(
            decision.detected_intents(),
            &[Intent::Complex, Intent::Knowledge]
        );
    }

    #[test]
    fn test_complex_without_knowledge_goes_to_tools() {
        let decision = route("Predict the trend for next year");
        assert_eq!(decision.mode(), RoutingMode::Tools);
        assert_eq!(decision.detected_intents(), &[Intent::Complex]);
    }

    #[test]
    fn test_fallback_is_knowledge_with_low_confidence() {
        let decision = route("Tell me something interesting");
        assert_eq!(decision.mode(), RoutingMode::Knowledge);
        assert_eq!(decision.confidence(), 0.6);
        assert!(decision.detected_intents().is_empty());
    }

    #[test]
    fn test_greeting_over_length_threshold_is_not_fast_path() {
        let cache = Arc::new(SharedCache::<String>::new("responses", 10, 300));
        let router = QueryRouter::new(cache, 3);
        // "hello" matches the social pattern but is not shorter than 3
        let decision = router.route("hello", None);
        assert_ne!(decision.mode(), RoutingMode::FastPath);
    }

    #[test]
    fn test_greeting_prefix_does_not_force_fast_path() {
        let decision = route("Hai, siapa ketua FSKTM?");
        assert_eq!(decision.mode(), RoutingMode::Knowledge);
    }

    #[test]
    fn test_faq_with_cached_answer_short_circuits() {
        let (router, cache) = router_with_cache();
        let command = "Apa itu FSKTM?";

        let before = router.route(command, None);
        assert_eq!(before.mode(), RoutingMode::Knowledge);
        assert_eq!(before.detected_intents(), &[Intent::Faq, Intent::Knowledge]);

        cache.set(before.cache_key(), "cached answer".to_string(), None);
        let after = router.route(command, None);
        assert_eq!(after.mode(), RoutingMode::FastPath);
        assert_eq!(after.confidence(), 0.9);
        assert_eq!(after.detected_intents(), &[Intent::Faq]);
    }

    #[test]
    fn test_non_faq_ignores_cache() {
        let (router, cache) = router_with_cache();
        let command = "Siapa ketua FSKTM?";
        cache.set(query_cache_key(command), "cached".to_string(), None);

        assert_eq!(router.route(command, None).mode(), RoutingMode::Knowledge);
    }

    #[test]
    fn test_cache_key_normalization() {
        assert_eq!(
            query_cache_key("  Siapa   KETUA fsktm?? "),
            query_cache_key("siapa ketua FSKTM")
        );
        assert_ne!(query_cache_key("siapa ketua"), query_cache_key("siapa dekan"));
        assert_eq!(route("Hai!").cache_key(), query_cache_key("hai"));
    }

    #[test]
    fn test_normalize_command() {
        assert_eq!(normalize_command("  Hello,   World!! "), "hello world");
        assert_eq!(normalize_command("CGPA 3.5"), "cgpa 35");
    }

    #[test]
    fn test_complexity_score() {
        assert_eq!(complexity_score(0, 0, 0, 0), 0.0);
        assert!((complexity_score(250, 0, 0, 0) - 0.15).abs() < 1e-9);
        assert!((complexity_score(10_000, 0, 0, 0) - 0.3).abs() < 1e-9);
        assert_eq!(complexity_score(500, 4, 3, 5), 1.0);
    }

    #[test]
    fn test_high_complexity_alone_selects_tools() {
        // Three conjunctions and two question marks, no family vocabulary.
        let decision = route("Is it this and that or those and these? Maybe?");
        assert!(decision.detected_intents().is_empty());
        assert_eq!(decision.mode(), RoutingMode::Tools);
    }
}
