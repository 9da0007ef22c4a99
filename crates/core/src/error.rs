//! Error types for the emberchat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all emberchat operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Context errors ---
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    // --- Key errors ---
    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

// --- Bounded context errors ---

/// Errors from loading context documents.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Failed to load {source_name}: {reason}")]
    Load { source_name: String, reason: String },

    #[error("Invalid context JSON in {source_name}: {reason}")]
    Parse { source_name: String, reason: String },
}

/// Errors from the encrypted-key provider.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Failed to load encrypted key: {0}")]
    Load(String),

    #[error("Decryption failed: {0}")]
    Decrypt(String),
}

/// Errors from inference endpoints and the fallback chain.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    Http { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Token unavailable: {0}")]
    TokenUnavailable(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("All endpoints exhausted, last error: {last}")]
    AllEndpointsExhausted { last: String },
}
