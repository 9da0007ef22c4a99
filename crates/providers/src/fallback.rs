//! Endpoint fallback — ordered chain over inference endpoints.
//!
//! Endpoints are tried strictly in configured order, each awaited to
//! completion or failure before the next begins. A fresh bearer token is
//! obtained per attempt and dropped as soon as that attempt resolves; no
//! endpoint is ever retried.

use std::sync::Arc;

use emberchat_core::endpoint::{GeneratedText, ModelEndpoint, TokenSource};
use emberchat_core::error::ProviderError;
use tracing::{info, warn};

/// An ordered chain of endpoints sharing one token source.
pub struct FallbackChain {
    tokens: Arc<dyn TokenSource>,
    endpoints: Vec<Arc<dyn ModelEndpoint>>,
}

impl FallbackChain {
    /// Create a new chain with no endpoints.
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            tokens,
            endpoints: Vec::new(),
        }
    }

    /// Append an endpoint to the chain.
    pub fn add(mut self, endpoint: Arc<dyn ModelEndpoint>) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Number of endpoints in the chain.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Try each endpoint in order; first well-formed result wins.
    pub async fn complete(&self, prompt: &str) -> Result<GeneratedText, ProviderError> {
        if self.endpoints.is_empty() {
            return Err(ProviderError::NotConfigured(
                "No endpoints in fallback chain".into(),
            ));
        }

        let mut last_error = String::new();

        for (i, endpoint) in self.endpoints.iter().enumerate() {
            let endpoint_name = endpoint.name().to_string();

            info!(
                endpoint = %endpoint_name,
                attempt = i + 1,
                total = self.endpoints.len(),
                "Fallback: trying endpoint"
            );

            // Token is scoped to this attempt and dropped when it resolves
            let token = match self.tokens.obtain_token().await {
                Ok(token) => token,
                Err(e) => {
                    warn!(
                        endpoint = %endpoint_name,
                        error = %e,
                        "Fallback: token unavailable, trying next"
                    );
                    last_error = ProviderError::TokenUnavailable(e.to_string()).to_string();
                    continue;
                }
            };

            match endpoint.complete(prompt, &token).await {
                Ok(generated) => return Ok(generated),
                Err(e) => {
                    warn!(
                        endpoint = %endpoint_name,
                        error = %e,
                        "Fallback: endpoint failed, trying next"
                    );
                    last_error = e.to_string();
                }
            }
        }

        Err(ProviderError::AllEndpointsExhausted { last: last_error })
    }
}
