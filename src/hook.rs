use crate::caller::{self, CallSite};
use crate::level::Severity;
use crate::record::LogRecord;
use crate::store::{DocumentStore, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Document category label every record is submitted under.
pub const DOC_TYPE: &str = "log";

/// Stack depth at which caller resolution starts. The prefix filter inside
/// the resolver does the real work; this only steps over the capture
/// machinery itself.
const CALLER_DEPTH: usize = 3;

/// Errors produced while constructing the hook or delivering an event.
#[derive(thiserror::Error, Debug)]
pub enum HookError {
    /// The store accepted the index-creation request but did not confirm it.
    #[error("cannot create index {0:?}")]
    CannotCreateIndex(String),

    /// The hook's lifecycle was cancelled; no delivery can succeed anymore.
    #[error("log delivery cancelled")]
    Cancelled,

    #[error("failed to serialize log record")]
    Serialize(#[from] serde_json::Error),

    /// The store reported a failure, surfaced verbatim.
    #[error("document store error: {0}")]
    Store(#[source] StoreError),
}

/// One log event as handed over by the logging framework.
///
/// The hook treats the field map as caller-owned: resolved source location
/// is added to a copy that ships with the document, never to this map.
#[derive(Debug, Clone)]
pub struct Entry {
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub message: String,
    pub data: BTreeMap<String, serde_json::Value>,
}

impl Entry {
    /// An entry stamped with the current time and an empty field map.
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        Entry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            data: BTreeMap::new(),
        }
    }
}

/// Delivery hook that ships each admitted log event to the document store
/// as one synchronous indexing call.
///
/// Everything the hook holds is fixed at construction: identity fields, the
/// accepted severity set, the shared store handle and the cancellation
/// token. One instance can therefore be fired from any number of callers at
/// once; relative arrival order at the store is whatever concurrent
/// requests produce.
pub struct ElasticHook {
    store: Arc<dyn DocumentStore>,
    host: String,
    service: String,
    version: String,
    index: String,
    levels: Vec<Severity>,
    token: CancellationToken,
}

impl ElasticHook {
    /// Construct a hook targeting `index`, creating the index if the store
    /// does not have it yet.
    ///
    /// **Parameters**
    /// - `store`: shared backend client; the hook never closes it.
    /// - `service` / `version`: logical identity stamped on every record.
    /// - `min_level`: least severe level the hook accepts.
    /// - `index`: target index name.
    ///
    /// **Returns**
    /// - A ready hook.
    /// - The store's own error if the index could not be verified or
    ///   created, or [`HookError::CannotCreateIndex`] if the creation
    ///   request went unacknowledged.
    ///
    /// The local hostname is resolved best-effort; records carry an empty
    /// host string when the lookup fails.
    pub async fn new(
        store: Arc<dyn DocumentStore>,
        service: impl Into<String>,
        version: impl Into<String>,
        min_level: Severity,
        index: impl Into<String>,
    ) -> Result<Self, HookError> {
        let index = index.into();
        let levels = Severity::accepted_from(min_level);
        let token = CancellationToken::new();

        let exists = store.index_exists(&index).await.map_err(HookError::Store)?;
        if !exists {
            let acknowledged = store.create_index(&index).await.map_err(HookError::Store)?;
            if !acknowledged {
                return Err(HookError::CannotCreateIndex(index));
            }
        }

        let host = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .unwrap_or_default();

        Ok(ElasticHook {
            store,
            host,
            service: service.into(),
            version: version.into(),
            index,
            levels,
            token,
        })
    }

    /// Severity levels this hook accepts, most severe first.
    ///
    /// Admission is enforced at the framework boundary;
    /// [`fire`](Self::fire) does not re-check the level.
    pub fn levels(&self) -> &[Severity] {
        &self.levels
    }

    /// Deliver one event to the store.
    ///
    /// Exactly one indexing attempt is made; the caller is blocked until
    /// the store answers, the request fails, or [`cancel`](Self::cancel)
    /// fires. No retry, no buffering.
    pub async fn fire(&self, entry: &Entry) -> Result<(), HookError> {
        if self.token.is_cancelled() {
            return Err(HookError::Cancelled);
        }

        let CallSite { file, func, line } = caller::resolve(CALLER_DEPTH);
        let file = base_file_name(&file);

        let mut data = entry.data.clone();
        data.insert("file".to_string(), serde_json::Value::from(file.clone()));
        data.insert("func".to_string(), serde_json::Value::from(func.clone()));
        data.insert("line".to_string(), serde_json::Value::from(line));

        let record = LogRecord {
            service: self.service.clone(),
            version: self.version.clone(),
            host: self.host.clone(),
            file,
            func_name: func,
            line,
            timestamp: entry.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            message: entry.message.clone(),
            level: entry.level,
            data,
        };
        let body = serde_json::to_value(&record)?;

        tokio::select! {
            _ = self.token.cancelled() => Err(HookError::Cancelled),
            result = self.store.index_document(&self.index, DOC_TYPE, &body) => {
                result.map_err(HookError::Store)
            }
        }
    }

    /// Cancel the hook's lifecycle.
    ///
    /// Idempotent and irreversible: in-flight deliveries are aborted and
    /// every later [`fire`](Self::fire) fails with
    /// [`HookError::Cancelled`]. The store client's own connections are
    /// not touched.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

fn base_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::{sleep, Duration};

    #[derive(Default)]
    struct RecordingStore {
        exists: bool,
        ack: bool,
        fail_exists: bool,
        creations: AtomicUsize,
        documents: Mutex<Vec<(String, String, serde_json::Value)>>,
    }

    #[async_trait]
    impl DocumentStore for RecordingStore {
        async fn index_exists(&self, _index: &str) -> Result<bool, StoreError> {
            if self.fail_exists {
                return Err("cluster unreachable".into());
            }
            Ok(self.exists)
        }

        async fn create_index(&self, _index: &str) -> Result<bool, StoreError> {
            self.creations.fetch_add(1, Ordering::SeqCst);
            Ok(self.ack)
        }

        async fn index_document(
            &self,
            index: &str,
            doc_type: &str,
            body: &serde_json::Value,
        ) -> Result<(), StoreError> {
            self.documents
                .lock()
                .unwrap()
                .push((index.to_string(), doc_type.to_string(), body.clone()));
            Ok(())
        }
    }

    /// Store whose delivery never completes on its own.
    struct HangingStore;

    #[async_trait]
    impl DocumentStore for HangingStore {
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
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    async fn hook_with(store: Arc<RecordingStore>, min_level: Severity) -> ElasticHook {
        ElasticHook::new(store as Arc<dyn DocumentStore>, "orders", "2.1.0", min_level, "orders-logs")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn existing_index_skips_creation() {
        let store = Arc::new(RecordingStore {
            exists: true,
            ..RecordingStore::default()
        });
        hook_with(Arc::clone(&store), Severity::Info).await;
        assert_eq!(store.creations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_index_is_created() {
        let store = Arc::new(RecordingStore {
            exists: false,
            ack: true,
            ..RecordingStore::default()
        });
        hook_with(Arc::clone(&store), Severity::Info).await;
        assert_eq!(store.creations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unacknowledged_creation_is_a_distinct_error() {
        let store = Arc::new(RecordingStore {
            exists: false,
            ack: false,
            ..RecordingStore::default()
        });
        let result = ElasticHook::new(
            store as Arc<dyn DocumentStore>,
            "orders",
            "2.1.0",
            Severity::Info,
            "orders-logs",
        )
        .await;
        assert!(matches!(result, Err(HookError::CannotCreateIndex(index)) if index == "orders-logs"));
    }

    #[tokio::test]
    async fn existence_check_error_propagates() {
        let store = Arc::new(RecordingStore {
            fail_exists: true,
            ..RecordingStore::default()
        });
        let result = ElasticHook::new(
            store as Arc<dyn DocumentStore>,
            "orders",
            "2.1.0",
            Severity::Info,
            "orders-logs",
        )
        .await;
        assert!(matches!(result, Err(HookError::Store(_))));
    }

    #[tokio::test]
    async fn fire_ships_one_document_with_fixed_identity() {
        let store = Arc::new(RecordingStore {
            exists: true,
            ..RecordingStore::default()
        });
        let hook = hook_with(Arc::clone(&store), Severity::Warn).await;

        let mut entry = Entry::new(Severity::Error, "m");
        entry.data.insert("k".to_string(), serde_json::json!("v"));
        hook.fire(&entry).await.unwrap();

        let documents = store.documents.lock().unwrap();
        assert_eq!(documents.len(), 1);
        let (index, doc_type, body) = &documents[0];
        assert_eq!(index, "orders-logs");
        assert_eq!(doc_type, DOC_TYPE);
        assert_eq!(body["Service"], "orders");
        assert_eq!(body["Version"], "2.1.0");
        assert_eq!(body["Level"], "error");
        assert_eq!(body["Message"], "m");
        assert_eq!(body["Data"]["k"], "v");
        assert!(body["Host"].is_string());

        // Resolved location lands in the top-level fields and the data map,
        // while the caller's own map stays untouched.
        assert_eq!(body["File"], body["Data"]["file"]);
        assert_eq!(body["FuncName"], body["Data"]["func"]);
        assert_eq!(body["Line"], body["Data"]["line"]);
        assert!(body["Line"].is_u64());
        assert_eq!(entry.data.len(), 1);

        let timestamp = body["Timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert!(timestamp.ends_with('Z'));
        let fraction = timestamp.rsplit('.').next().unwrap().trim_end_matches('Z');
        assert_eq!(fraction.len(), 9);
    }

    #[tokio::test]
    async fn fire_after_cancel_fails_without_touching_the_store() {
        let store = Arc::new(RecordingStore {
            exists: true,
            ..RecordingStore::default()
        });
        let hook = hook_with(Arc::clone(&store), Severity::Info).await;

        hook.cancel();
        hook.cancel(); // idempotent

        let result = hook.fire(&Entry::new(Severity::Error, "late")).await;
        assert!(matches!(result, Err(HookError::Cancelled)));
        assert!(store.documents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_aborts_an_in_flight_delivery() {
        let hook = Arc::new(
            ElasticHook::new(Arc::new(HangingStore), "orders", "2.1.0", Severity::Info, "orders-logs")
                .await
                .unwrap(),
        );

        let firing = {
            let hook = Arc::clone(&hook);
            tokio::spawn(async move { hook.fire(&Entry::new(Severity::Error, "stuck")).await })
        };

        sleep(Duration::from_millis(20)).await;
        hook.cancel();

        let result = firing.await.unwrap();
        assert!(matches!(result, Err(HookError::Cancelled)));
    }

    #[tokio::test]
    async fn minimum_warn_accepts_exactly_the_severe_half() {
        let store = Arc::new(RecordingStore {
            exists: true,
            ..RecordingStore::default()
        });
        let hook = hook_with(Arc::clone(&store), Severity::Warn).await;

        assert_eq!(
            hook.levels(),
            &[Severity::Panic, Severity::Fatal, Severity::Error, Severity::Warn],
        );

        hook.fire(&Entry::new(Severity::Warn, "threshold")).await.unwrap();
        let documents = store.documents.lock().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].2["Level"], "warn");
    }
}
