//! Shared application state handed to every handler.

use std::sync::Arc;

use claimmate_core::{ClaimStore, GenerationBackend};
use claimmate_db::MemoryTimeline;

use crate::services::{
    ActionDispatcher, AttachmentPipeline, ConversationPlanner, EmailTransport, ExtractionService,
    KeywordIntentClassifier, MessageService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClaimStore>,
    /// Holds timeline messages while the primary store is failing.
    pub fallback_timeline: Arc<MemoryTimeline>,
    pub attachments: AttachmentPipeline,
    pub extraction: ExtractionService,
    pub messages: MessageService,
    pub dispatcher: Arc<ActionDispatcher>,
    pub planner: ConversationPlanner,
    /// Model name, `None` when no model is configured.
    pub model_name: Option<String>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ClaimStore>,
        backend: Option<Arc<dyn GenerationBackend>>,
        transport: Arc<dyn EmailTransport>,
        attachments: AttachmentPipeline,
    ) -> Self {
        Self {
            model_name: backend.as_ref().map(|b| b.model_name().to_string()),
            extraction: ExtractionService::new(backend.clone()),
            messages: MessageService::new(backend.clone()),
            dispatcher: Arc::new(ActionDispatcher::new(backend, transport)),
            planner: ConversationPlanner::new(Arc::new(KeywordIntentClassifier)),
            fallback_timeline: Arc::new(MemoryTimeline::new()),
            store,
            attachments,
        }
    }

    /// True when running on the in-memory store.
    pub fn is_demo(&self) -> bool {
        self.store.is_ephemeral()
    }
}
