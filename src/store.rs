use async_trait::async_trait;
use std::error::Error;

/// Error type surfaced by [`DocumentStore`] implementations.
pub type StoreError = Box<dyn Error + Send + Sync>;

/// Document-store operations the delivery hook depends on.
///
/// Implementations wrap a concrete backend client (Elasticsearch, OpenSearch,
/// an in-memory fake in tests). The hook shares one implementation across
/// concurrent callers and never closes it; connections stay owned by the
/// implementation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Check whether `index` exists.
    ///
    /// **Returns**
    /// - `Ok(true)` / `Ok(false)` if the store answered.
    /// - `Err(..)` if the store could not be queried.
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError>;

    /// Create `index`.
    ///
    /// **Returns**
    /// - `Ok(true)` if the store acknowledged the creation.
    /// - `Ok(false)` if the request completed without acknowledgment.
    /// - `Err(..)` if the request itself failed.
    async fn create_index(&self, index: &str) -> Result<bool, StoreError>;

    /// Submit one document into `index` under the given category label.
    ///
    /// Called inline on the firing caller, once per event. Implementations
    /// should use async I/O and be safe for concurrent use; cancellation is
    /// applied by the caller dropping the returned future.
    async fn index_document(
        &self,
        index: &str,
        doc_type: &str,
        body: &serde_json::Value,
    ) -> Result<(), StoreError>;
}
