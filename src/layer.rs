use crate::hook::{ElasticHook, Entry};
use crate::level::Severity;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that forwards admitted events to an
/// [`ElasticHook`].
///
/// Delivery happens inline on the emitting thread: the event is turned into
/// an [`Entry`] and the hook is fired before `on_event` returns, so a slow
/// store slows the caller. There is no channel and no background task.
///
/// Admission uses the hook's accepted-level set via `enabled`. Note that
/// without a per-layer filter this applies to the whole subscriber stack,
/// so levels the hook rejects are not seen by sibling layers either.
pub struct ElasticLayer {
    hook: Arc<ElasticHook>,
    handle: Handle,
}

impl ElasticLayer {
    /// Wrap `hook` for use with a `tracing_subscriber` registry.
    ///
    /// Must be called from within a tokio runtime; the handle is captured
    /// here and reused for deliveries from non-runtime threads. Events
    /// emitted from async context require the multi-thread runtime, since
    /// the emitting worker blocks in place for the duration of the call.
    pub fn new(hook: Arc<ElasticHook>) -> Self {
        ElasticLayer {
            hook,
            handle: Handle::current(),
        }
    }

    fn deliver(&self, entry: Entry) {
        let fire = self.hook.fire(&entry);
        let result = match Handle::try_current() {
            Ok(_) => tokio::task::block_in_place(|| self.handle.block_on(fire)),
            Err(_) => self.handle.block_on(fire),
        };
        if let Err(e) = result {
            eprintln!("error shipping log record: {}", e);
        }
    }
}

impl<S> Layer<S> for ElasticLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        self.hook.levels().contains(&Severity::from(metadata.level()))
    }

    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let entry = Entry {
            timestamp: Utc::now(),
            level: Severity::from(event.metadata().level()),
            message: message.unwrap_or_default(),
            data: fields,
        };

        self.deliver(entry);
    }
}

use tracing::field::{Field, Visit};

/// Collects event fields into a JSON map, routing the conventional
/// `message` field into the entry's message slot.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, serde_json::Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(value.to_string()),
            );
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(format!("{:?}", value)),
            );
        }
    }
}
