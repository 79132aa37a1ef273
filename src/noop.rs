use crate::store::{DocumentStore, StoreError};
use async_trait::async_trait;

/// A store that accepts everything and keeps nothing.
///
/// Useful for measuring the overhead of the hook itself without any
/// external I/O, and for unit tests that don't care about persistence.
#[derive(Clone, Default)]
pub struct NoopStore;

#[async_trait]
impl DocumentStore for NoopStore {
    async fn index_exists(&self, _index: &str) -> Result<bool, StoreError> {
        Ok(true)
    }

    async fn create_index(&self, _index: &str) -> Result<bool, StoreError> {
        Ok(true)
    }

    async fn index_document(
        &self,
        _index: &str,
        _doc_type: &str,
        _body: &serde_json::Value,
    ) -> Result<(), StoreError> {
        Ok(())
    }
}
