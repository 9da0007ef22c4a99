//! Endpoint and token-source traits — the seams of the inference pipeline.
//!
//! A [`ModelEndpoint`] knows how to send an assembled prompt to one hosted
//! model and extract the generated text. A [`TokenSource`] produces the
//! bearer token an endpoint call authenticates with. The fallback chain
//! calls both without knowing which implementation is behind them.

use async_trait::async_trait;

use crate::error::{KeyError, ProviderError};

/// The generated text extracted from a successful inference response.
#[derive(Debug, Clone)]
pub struct GeneratedText {
    /// The model output.
    pub text: String,

    /// Which endpoint produced it.
    pub endpoint: String,
}

/// A single hosted-model inference endpoint.
#[async_trait]
pub trait ModelEndpoint: Send + Sync {
    /// A human-readable name for this endpoint (typically its URL).
    fn name(&self) -> &str;

    /// Post `prompt` with a bearer `token` and extract the generated text.
    async fn complete(
        &self,
        prompt: &str,
        token: &str,
    ) -> std::result::Result<GeneratedText, ProviderError>;
}

/// Produces a bearer token for one inference attempt.
///
/// Tokens are ephemeral: callers must obtain a fresh one per attempt and
/// drop it as soon as the call returns.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn obtain_token(&self) -> std::result::Result<String, KeyError>;
}
