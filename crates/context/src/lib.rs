//! Context retrieval for emberchat.
//!
//! Three pieces, in pipeline order: the [`store::ContextStore`] loads the
//! JSON document corpus, the [`matcher::Matcher`] selects the documents
//! relevant to a user query, and the [`prompt`] module formats matches and
//! conversation history into the final instruction prompt.

pub mod matcher;
pub mod prompt;
pub mod store;

pub use matcher::Matcher;
pub use prompt::{format_documents, PromptAssembler};
pub use store::ContextStore;
