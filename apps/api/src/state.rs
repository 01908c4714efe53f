use std::sync::Arc;

use crate::diary::store::DiaryStore;
use crate::enhancement::Enhancer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup; nothing here is a process-wide singleton.
#[derive(Clone)]
pub struct AppState {
    pub store: DiaryStore,
    /// Pluggable enhancer. Default: `DiaryEnhancer<LlmClient>`.
    pub enhancer: Arc<dyn Enhancer>,
}
