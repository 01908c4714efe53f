//! Enhancement: rewrites diary entries and summarizes a user's history.
//!
//! Both operations are fail-soft: an upstream failure never reaches the
//! caller. It comes back as `Enhanced::Degraded` carrying the fallback value
//! and the reason, so the pipeline can log it and keep going.
//!
//! `AppState` holds an `Arc<dyn Enhancer>`; tests swap in stubs.

pub mod prompts;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::enhancement::prompts::{
    build_analysis_prompt, build_enhance_prompt, ANALYSIS_MAX_TOKENS, ANALYSIS_SYSTEM,
    ENHANCE_MAX_TOKENS, ENHANCE_SYSTEM,
};
use crate::llm_client::{CompletionRequest, TextGenerator};
use crate::models::entry::{DiaryEntry, EntryContext};

/// Result of an enhancement step, tagged with how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Enhanced<T> {
    /// The generation service produced the value.
    Generated(T),
    /// No call was needed; the value is the default.
    Skipped(T),
    /// The call failed; the value is the fallback.
    Degraded { fallback: T, reason: String },
}

impl<T> Enhanced<T> {
    pub fn into_inner(self) -> T {
        match self {
            Enhanced::Generated(v) | Enhanced::Skipped(v) => v,
            Enhanced::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            Enhanced::Degraded { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// The enhancement seam used by the entry pipeline.
/// `history` is always newest first.
#[async_trait]
pub trait Enhancer: Send + Sync {
    /// Rewrites `content`. Falls back to `content` itself on failure.
    async fn enhance(&self, content: &str, history: &[DiaryEntry]) -> Enhanced<String>;

    /// Summarizes `history`. Empty history short-circuits to an empty map
    /// without calling out; failure falls back to an empty map.
    async fn analyze_context(&self, history: &[DiaryEntry]) -> Enhanced<EntryContext>;
}

/// LLM-backed enhancer. Single attempt per call.
pub struct DiaryEnhancer<G> {
    generator: G,
}

impl<G: TextGenerator> DiaryEnhancer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl<G: TextGenerator> Enhancer for DiaryEnhancer<G> {
    async fn enhance(&self, content: &str, history: &[DiaryEntry]) -> Enhanced<String> {
        let prompt = build_enhance_prompt(content, history);
        let request = CompletionRequest {
            system: ENHANCE_SYSTEM,
            prompt: &prompt,
            max_tokens: ENHANCE_MAX_TOKENS,
        };

        match self.generator.generate(request).await {
            Ok(text) => Enhanced::Generated(text),
            Err(e) => Enhanced::Degraded {
                fallback: content.to_string(),
                reason: e.to_string(),
            },
        }
    }

    async fn analyze_context(&self, history: &[DiaryEntry]) -> Enhanced<EntryContext> {
        if history.is_empty() {
            return Enhanced::Skipped(EntryContext::new());
        }

        let prompt = build_analysis_prompt(history);
        let request = CompletionRequest {
            system: ANALYSIS_SYSTEM,
            prompt: &prompt,
            max_tokens: ANALYSIS_MAX_TOKENS,
        };

        match self.generator.generate(request).await {
            Ok(analysis) => {
                let mut context = EntryContext::new();
                context.insert("analysis".to_string(), Value::String(analysis));
                context.insert("entry_count".to_string(), json!(history.len()));
                Enhanced::Generated(context)
            }
            Err(e) => Enhanced::Degraded {
                fallback: EntryContext::new(),
                reason: e.to_string(),
            },
        }
    }
}
