//! Conversation controller — orchestrates one user turn end to end.
//!
//! Per turn: capture input, retrieve matching context, assemble the prompt,
//! run the endpoint fallback chain, and append the outcome to the
//! transcript. Every turn ends back in `Idle`; no error is fatal to the
//! session.
//!
//! All state lives on the controller instance and is touched from a single
//! task. There is no cancellation: a second turn submitted while one is in
//! flight is not guarded against and may interleave transcript updates.

use emberchat_context::{format_documents, ContextStore, Matcher, PromptAssembler};
use emberchat_core::history::ConversationHistory;
use emberchat_providers::FallbackChain;
use tracing::{debug, warn};

use crate::transcript::{Transcript, TranscriptEntry};

/// Where the controller is within the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    InputCaptured,
    ContextRetrieved,
    PromptAssembled,
    AwaitingResponse,
}

/// How a submitted input resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Empty or whitespace-only input; nothing happened.
    Ignored,
    /// A bot entry was appended.
    Answered,
    /// Every endpoint failed; an error entry was appended.
    Failed,
}

pub struct ConversationController {
    store: ContextStore,
    matcher: Matcher,
    assembler: PromptAssembler,
    chain: FallbackChain,
    history: ConversationHistory,
    transcript: Transcript,
    state: TurnState,
}

impl ConversationController {
    pub fn new(
        store: ContextStore,
        matcher: Matcher,
        assembler: PromptAssembler,
        chain: FallbackChain,
        history: ConversationHistory,
    ) -> Self {
        Self {
            store,
            matcher,
            assembler,
            chain,
            history,
            transcript: Transcript::new(),
            state: TurnState::Idle,
        }
    }

    /// Run one user turn. Whitespace-only input is a no-op.
    pub async fn take_turn(&mut self, input: &str) -> TurnOutcome {
        let input = input.trim();
        if input.is_empty() {
            return TurnOutcome::Ignored;
        }

        self.state = TurnState::InputCaptured;
        // Optimistic: the user entry lands before the outcome is known
        self.transcript.push(TranscriptEntry::user(input));
        self.history.push_user_input(input);

        let matched = self.matcher.matches(input, &self.store);
        self.state = TurnState::ContextRetrieved;
        self.history.push_context_entry(format_documents(&matched));

        let prompt = self.assembler.assemble(&self.history);
        self.state = TurnState::PromptAssembled;
        debug!(
            prompt_len = prompt.len(),
            matched = matched.len(),
            "Prompt assembled"
        );

        self.state = TurnState::AwaitingResponse;
        let outcome = match self.chain.complete(&prompt).await {
            Ok(generated) => {
                let mut text = generated.text;
                if !matched.is_empty() {
                    let citations = matched
                        .iter()
                        .map(|d| d.citation())
                        .collect::<Vec<_>>()
                        .join(", ");
                    text.push_str(&format!(" (source: {citations})"));
                }
                self.history.push_response(&text);
                self.transcript.push(TranscriptEntry::bot(text));
                TurnOutcome::Answered
            }
            Err(e) => {
                warn!(error = %e, "Turn failed, all endpoints exhausted");
                self.transcript.push(TranscriptEntry::error("Error"));
                TurnOutcome::Failed
            }
        };

        self.state = TurnState::Idle;
        outcome
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Speaker;
    use async_trait::async_trait;
    use emberchat_core::document::ContextDocument;
    use emberchat_core::endpoint::{GeneratedText, ModelEndpoint, TokenSource};
    use emberchat_core::error::{KeyError, ProviderError};
    use std::sync::{Arc, Mutex};

    struct StaticTokenSource {
        calls: Mutex<usize>,
    }

    impl StaticTokenSource {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl TokenSource for StaticTokenSource {
        async fn obtain_token(&self) -> Result<String, KeyError> {
            *self.calls.lock().unwrap() += 1;
            Ok("token".into())
        }
    }

    /// Replies with a fixed answer, or an HTTP failure when `fail` is set.
    struct ScriptedEndpoint {
        reply: String,
        fail: bool,
    }

    #[async_trait]
    impl ModelEndpoint for ScriptedEndpoint {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _prompt: &str,
            _token: &str,
        ) -> Result<GeneratedText, ProviderError> {
            if self.fail {
                Err(ProviderError::Http {
                    status_code: 500,
                    message: "boom".into(),
                })
            } else {
                Ok(GeneratedText {
                    text: self.reply.clone(),
                    endpoint: "scripted".into(),
                })
            }
        }
    }

    fn blog_doc() -> ContextDocument {
        let mut doc: ContextDocument = serde_json::from_str(
            r#"{"id": "post-1", "title": "Caching deep dive", "tags": ["blog", "caching"]}"#,
        )
        .unwrap();
        doc.source = "blogs.json".into();
        doc
    }

    fn controller_with(
        docs: Vec<ContextDocument>,
        tokens: Arc<StaticTokenSource>,
        endpoint: ScriptedEndpoint,
    ) -> ConversationController {
        ConversationController::new(
            ContextStore::from_documents(docs),
            Matcher::default(),
            PromptAssembler::new("Be helpful."),
            FallbackChain::new(tokens).add(Arc::new(endpoint)),
            ConversationHistory::default(),
        )
    }

    #[tokio::test]
    async fn whitespace_input_is_noop() {
        let tokens = StaticTokenSource::new();
        let mut controller = controller_with(
            vec![],
            tokens.clone(),
            ScriptedEndpoint {
                reply: "unused".into(),
                fail: false,
            },
        );

        assert_eq!(controller.take_turn("   \t  ").await, TurnOutcome::Ignored);
        assert!(controller.transcript().is_empty());
        // No network activity at all
        assert_eq!(tokens.calls(), 0);
        assert_eq!(controller.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn successful_turn_appends_user_then_bot() {
        let mut controller = controller_with(
            vec![],
            StaticTokenSource::new(),
            ScriptedEndpoint {
                reply: "Hi there!".into(),
                fail: false,
            },
        );

        let outcome = controller.take_turn("hello").await;
        assert_eq!(outcome, TurnOutcome::Answered);

        let entries = controller.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].speaker, Speaker::User);
        assert_eq!(entries[0].text, "hello");
        assert_eq!(entries[1].speaker, Speaker::Bot);
        assert_eq!(entries[1].text, "Hi there!");
        assert_eq!(controller.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn matched_context_adds_source_suffix() {
        let mut controller = controller_with(
            vec![blog_doc()],
            StaticTokenSource::new(),
            ScriptedEndpoint {
                reply: "Caching answer.".into(),
                fail: false,
            },
        );

        controller
            .take_turn("tell me about your blog post on caching")
            .await;

        let bot = controller.transcript().last().unwrap();
        assert_eq!(bot.text, "Caching answer. (source: blogs/post-1)");
    }

    #[tokio::test]
    async fn failed_turn_appends_error_and_recovers() {
        let mut controller = controller_with(
            vec![],
            StaticTokenSource::new(),
            ScriptedEndpoint {
                reply: String::new(),
                fail: true,
            },
        );

        assert_eq!(controller.take_turn("hello").await, TurnOutcome::Failed);

        let entries = controller.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].speaker, Speaker::Error);
        assert_eq!(controller.state(), TurnState::Idle);

        // The controller keeps accepting input after a failure
        assert_eq!(controller.take_turn("again").await, TurnOutcome::Failed);
        assert_eq!(controller.transcript().len(), 4);
    }

    #[tokio::test]
    async fn history_buffers_stay_bounded_across_turns() {
        let mut controller = controller_with(
            vec![],
            StaticTokenSource::new(),
            ScriptedEndpoint {
                reply: "ok".into(),
                fail: false,
            },
        );

        for i in 0..25 {
            controller.take_turn(&format!("message {i}")).await;
        }

        assert_eq!(controller.history().turn_count(), 10);
        assert_eq!(controller.history().context_entries().count(), 3);
        // Transcript itself is append-only and unbounded
        assert_eq!(controller.transcript().len(), 50);
    }
}
