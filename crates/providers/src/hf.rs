//! Hosted-inference endpoint client.
//!
//! Speaks the Hugging Face Inference API contract: an authenticated POST of
//! `{"inputs": <prompt>, "parameters": {"return_full_text": false}}` whose
//! success response is an array whose first element carries
//! `generated_text`.

use async_trait::async_trait;
use emberchat_core::endpoint::{GeneratedText, ModelEndpoint};
use emberchat_core::error::ProviderError;
use serde::Deserialize;
use tracing::{debug, warn};

/// One hosted model endpoint, addressed by URL.
pub struct HfEndpoint {
    url: String,
    client: reqwest::Client,
}

impl HfEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ModelEndpoint for HfEndpoint {
    fn name(&self) -> &str {
        &self.url
    }

    async fn complete(
        &self,
        prompt: &str,
        token: &str,
    ) -> Result<GeneratedText, ProviderError> {
        let body = serde_json::json!({
            "inputs": prompt,
            "parameters": {
                "return_full_text": false,
            },
        });

        debug!(endpoint = %self.url, prompt_len = prompt.len(), "Sending inference request");

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(endpoint = %self.url, status = %status, "Endpoint returned error");
            return Err(ProviderError::Http {
                status_code: status.as_u16(),
                message: error_body,
            });
        }

        let raw = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let text = extract_generated_text(&raw)?;

        Ok(GeneratedText {
            text,
            endpoint: self.url.clone(),
        })
    }
}

/// Pull the first `generated_text` out of a response body.
fn extract_generated_text(body: &str) -> Result<String, ProviderError> {
    let results: Vec<ApiGeneration> = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("failed to parse response: {e}")))?;

    results
        .into_iter()
        .next()
        .map(|g| g.generated_text)
        .ok_or_else(|| ProviderError::MalformedResponse("empty result array".into()))
}

#[derive(Debug, Deserialize)]
struct ApiGeneration {
    generated_text: String,
}
