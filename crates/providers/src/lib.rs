//! Inference endpoint implementations for emberchat.
//!
//! [`hf::HfEndpoint`] speaks the hosted Hugging Face inference contract;
//! [`fallback::FallbackChain`] tries an ordered list of endpoints until one
//! returns a well-formed result.

pub mod fallback;
pub mod hf;

pub use fallback::FallbackChain;
pub use hf::HfEndpoint;
