//! Entry pipeline: creates a diary entry.
//!
//! Flow: list_by_user(limit 5) → enhance → analyze_context → assemble → create.
//!
//! Enhancement and analysis never fail outward, so only the two store calls
//! can abort a request. There is no partial success: the entry is either
//! written in full or the request fails.
//!
//! Concurrent creates for the same user may or may not see each other in the
//! history fetch. That window is accepted; nothing here locks per user.

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::diary::store::DiaryStore;
use crate::enhancement::Enhancer;
use crate::errors::AppError;
use crate::models::entry::{DiaryEntry, NewDiaryEntry};

/// How many recent entries the pipeline loads as history.
pub const HISTORY_LIMIT: u32 = 5;

/// Request body for entry creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntryRequest {
    pub content: String,
    #[serde(alias = "userId")]
    pub user_id: String,
}

/// Runs the full pipeline and returns the stored entry.
pub async fn create_entry(
    store: &DiaryStore,
    enhancer: &dyn Enhancer,
    request: CreateEntryRequest,
) -> Result<DiaryEntry, AppError> {
    let CreateEntryRequest { content, user_id } = request;

    // Step 1: recent history, newest first
    let history = store.list_by_user(&user_id, Some(HISTORY_LIMIT)).await?;

    // Step 2: rewrite
    let enhanced = enhancer.enhance(&content, &history).await;
    if let Some(reason) = enhanced.degraded_reason() {
        warn!("Enhancement failed for user {user_id}, storing original text: {reason}");
    }

    // Step 3: history analysis
    let context = enhancer.analyze_context(&history).await;
    if let Some(reason) = context.degraded_reason() {
        warn!("Context analysis failed for user {user_id}, storing empty context: {reason}");
    }

    // Step 4: assemble
    let entry = NewDiaryEntry {
        user_id,
        content,
        enhanced_content: Some(enhanced.into_inner()),
        created_at: now_timestamp(),
        context: context.into_inner(),
    };

    // Step 5: persist
    let created = store.create(entry).await?;
    info!(
        "Created diary entry {} for user {} ({} history entries)",
        created.id,
        created.user_id,
        history.len()
    );

    Ok(created)
}

/// UTC, fixed microsecond precision, `Z` suffix: lexical order is time order.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::diary::store::tests::{memory_store, reject_inserts};
    use crate::enhancement::Enhanced;
    use crate::models::entry::EntryContext;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Enhancer with canned results that records the history it was given.
    pub(crate) struct StubEnhancer {
        pub enhanced: Enhanced<String>,
        pub context: Enhanced<EntryContext>,
        pub seen_history: Mutex<Vec<Vec<String>>>,
    }

    impl StubEnhancer {
        pub(crate) fn new(text: &str, context: Value) -> Self {
            let Value::Object(context) = context else {
                panic!("context must be an object");
            };
            Self {
                enhanced: Enhanced::Generated(text.to_string()),
                context: Enhanced::Generated(context),
                seen_history: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Enhancer for StubEnhancer {
        async fn enhance(&self, _content: &str, history: &[DiaryEntry]) -> Enhanced<String> {
            self.seen_history
                .lock()
                .unwrap()
                .push(history.iter().map(|e| e.content.clone()).collect());
            self.enhanced.clone()
        }

        async fn analyze_context(&self, _history: &[DiaryEntry]) -> Enhanced<EntryContext> {
            self.context.clone()
        }
    }

    fn request(content: &str, user_id: &str) -> CreateEntryRequest {
        CreateEntryRequest {
            content: content.to_string(),
            user_id: user_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_entry_end_to_end() {
        let store = memory_store().await;
        let enhancer = StubEnhancer::new(
            "Today was wonderful.",
            json!({"analysis": "positive", "entry_count": 0}),
        );

        let entry = create_entry(&store, &enhancer, request("had a good day", "u1"))
            .await
            .unwrap();

        assert_eq!(entry.id, 1);
        assert_eq!(entry.user_id, "u1");
        assert_eq!(entry.content, "had a good day");
        assert_eq!(entry.enhanced_content.as_deref(), Some("Today was wonderful."));
        assert_eq!(
            Value::Object(entry.context.clone()),
            json!({"analysis": "positive", "entry_count": 0})
        );

        let stored = store.get(entry.id).await.unwrap().unwrap();
        assert_eq!(stored, entry);
    }

    #[tokio::test]
    async fn test_degraded_results_are_stored() {
        let store = memory_store().await;
        let enhancer = StubEnhancer {
            enhanced: Enhanced::Degraded {
                fallback: "raw words".to_string(),
                reason: "timeout".to_string(),
            },
            context: Enhanced::Degraded {
                fallback: EntryContext::new(),
                reason: "timeout".to_string(),
            },
            seen_history: Mutex::new(Vec::new()),
        };

        let entry = create_entry(&store, &enhancer, request("raw words", "u1"))
            .await
            .unwrap();
        assert_eq!(entry.enhanced_content.as_deref(), Some("raw words"));
        assert!(entry.context.is_empty());
    }

    #[tokio::test]
    async fn test_history_is_newest_five_for_same_user() {
        let store = memory_store().await;
        let enhancer = StubEnhancer::new("ok", json!({}));

        for i in 1..=6 {
            create_entry(&store, &enhancer, request(&format!("entry {i}"), "u1"))
                .await
                .unwrap();
        }
        create_entry(&store, &enhancer, request("someone else", "u2"))
            .await
            .unwrap();
        create_entry(&store, &enhancer, request("entry 7", "u1"))
            .await
            .unwrap();

        let seen = enhancer.seen_history.lock().unwrap();
        assert!(seen[0].is_empty());
        assert!(seen[6].is_empty());
        assert_eq!(
            seen[7],
            vec!["entry 6", "entry 5", "entry 4", "entry 3", "entry 2"]
        );
    }

    #[tokio::test]
    async fn test_storage_failure_fails_whole_request() {
        let store = memory_store().await;
        let enhancer = StubEnhancer::new("polished", json!({"analysis": "fine"}));
        reject_inserts(&store).await;

        let result = create_entry(&store, &enhancer, request("lost words", "u1")).await;

        assert!(matches!(result, Err(AppError::Database(_))));
        // Both enhancement steps ran; only the write failed.
        assert_eq!(enhancer.seen_history.lock().unwrap().len(), 1);
        assert!(store.list_by_user("u1", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_increase_across_creates() {
        let store = memory_store().await;
        let enhancer = StubEnhancer::new("ok", json!({}));

        let mut ids = Vec::new();
        for _ in 0..3 {
            let entry = create_entry(&store, &enhancer, request("x", "u1"))
                .await
                .unwrap();
            ids.push(entry.id);
        }
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_timestamp_format_is_fixed_width_utc() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2024-05-01T10:00:00.000000Z".len());
    }

    #[test]
    fn test_request_accepts_camel_case_user_id() {
        let req: CreateEntryRequest =
            serde_json::from_value(json!({"content": "hi", "userId": "u9"})).unwrap();
        assert_eq!(req.user_id, "u9");
    }
}
