//! Context store — loads and holds the document corpus.
//!
//! Sources are JSON files (local paths or http(s) URLs), each containing an
//! array of documents. Every document is stamped with the file name of the
//! source it came from; the matcher and transcript citations rely on it.

use emberchat_core::document::ContextDocument;
use emberchat_core::error::ContextError;
use tracing::{debug, info, warn};

/// In-memory collection of context documents for one session.
pub struct ContextStore {
    documents: Vec<ContextDocument>,
    client: reqwest::Client,
}

impl ContextStore {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a store from an already-loaded document collection.
    ///
    /// Callers are responsible for having stamped each document's `source`.
    pub fn from_documents(documents: Vec<ContextDocument>) -> Self {
        Self {
            documents,
            client: reqwest::Client::new(),
        }
    }

    /// Load documents from each source in order.
    ///
    /// The first source that fails to fetch or parse aborts the whole load
    /// and leaves the store unchanged. A store that already holds documents
    /// treats `load` as a no-op.
    pub async fn load(&mut self, sources: &[String]) -> Result<(), ContextError> {
        if !self.documents.is_empty() {
            debug!(documents = self.documents.len(), "Store already loaded, skipping");
            return Ok(());
        }

        let mut loaded = Vec::new();

        for source in sources {
            let source_name = source_file_name(source);
            let body = self.fetch(source, &source_name).await?;

            let mut docs: Vec<ContextDocument> =
                serde_json::from_str(&body).map_err(|e| ContextError::Parse {
                    source_name: source_name.clone(),
                    reason: e.to_string(),
                })?;

            for doc in &mut docs {
                doc.source = source_name.clone();
            }

            debug!(source = %source_name, count = docs.len(), "Loaded context source");
            loaded.extend(docs);
        }

        info!(documents = loaded.len(), sources = sources.len(), "Context corpus loaded");
        self.documents = loaded;
        Ok(())
    }

    async fn fetch(&self, source: &str, source_name: &str) -> Result<String, ContextError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            let response = self.client.get(source).send().await.map_err(|e| {
                ContextError::Load {
                    source_name: source_name.to_string(),
                    reason: e.to_string(),
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                warn!(source = %source_name, status = %status, "Context fetch failed");
                return Err(ContextError::Load {
                    source_name: source_name.to_string(),
                    reason: format!("status {status}"),
                });
            }

            response.text().await.map_err(|e| ContextError::Load {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })
        } else {
            tokio::fs::read_to_string(source)
                .await
                .map_err(|e| ContextError::Load {
                    source_name: source_name.to_string(),
                    reason: e.to_string(),
                })
        }
    }

    pub fn documents(&self) -> &[ContextDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The bare file name of a source path or URL ("data/blogs.json" → "blogs.json").
fn source_file_name(source: &str) -> String {
    source
        .rsplit('/')
        .next()
        .unwrap_or(source)
        .split('?')
        .next()
        .unwrap_or(source)
        .to_string()
}
