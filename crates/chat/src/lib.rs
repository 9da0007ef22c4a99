//! Conversation orchestration for emberchat.
//!
//! The [`controller::ConversationController`] wires the context store,
//! matcher, prompt assembler, and endpoint fallback chain into the per-turn
//! state machine; the [`transcript`] module holds the user-visible record.

pub mod controller;
pub mod transcript;

pub use controller::{ConversationController, TurnOutcome, TurnState};
pub use transcript::{Speaker, Transcript, TranscriptEntry};
