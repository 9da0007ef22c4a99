//! # Emberchat Core
//!
//! Domain types, traits, and error definitions for the emberchat retrieval-
//! augmented chat client. This crate has **zero framework dependencies** —
//! it defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The inference seams are defined as traits here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod document;
pub mod endpoint;
pub mod error;
pub mod history;

// Re-export key types at crate root for ergonomics
pub use document::{ContextDocument, DocumentContent, Segment};
pub use endpoint::{GeneratedText, ModelEndpoint, TokenSource};
pub use error::{ContextError, Error, KeyError, ProviderError};
pub use history::{BoundedBuffer, ConversationHistory};
