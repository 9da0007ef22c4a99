//! CLI command implementations.

use std::sync::Arc;

use emberchat_chat::ConversationController;
use emberchat_config::AppConfig;
use emberchat_context::{ContextStore, Matcher, PromptAssembler};
use emberchat_core::history::ConversationHistory;
use emberchat_providers::{FallbackChain, HfEndpoint};
use emberchat_security::KeyProvider;
use tracing::warn;

pub mod ask;
pub mod chat;
pub mod seal_key;

/// Wire a conversation controller from configuration.
///
/// A failed context load degrades to an empty corpus rather than aborting;
/// the session then runs without retrieval.
pub(crate) async fn build_controller(config: &AppConfig) -> ConversationController {
    let mut store = ContextStore::new();
    if let Err(e) = store.load(&config.context_sources).await {
        warn!(error = %e, "Context load failed, continuing without context");
    }

    let tokens = Arc::new(KeyProvider::new(config.key_source.clone()));
    let mut chain = FallbackChain::new(tokens);
    for url in &config.endpoints {
        chain = chain.add(Arc::new(HfEndpoint::new(url)));
    }

    ConversationController::new(
        store,
        Matcher::new(config.matcher.fuzzy_threshold),
        PromptAssembler::new(config.preamble.clone()),
        chain,
        ConversationHistory::new(config.history.max_turns, config.history.max_context_entries),
    )
}
