//! Log capture for assertions on emitted tracing events
//!
//! `LogCapture::install()` sets a thread-local default subscriber, so it works
//! with `#[tokio::test]` (current-thread runtime) without touching the global
//! subscriber other tests may have installed.

use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

/// Captured log record
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Non-message fields rendered as `name=value`
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Log capture layer
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the thread-local default subscriber until the guard drops
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Records at `level` whose message contains `pattern`
    pub fn matching(&self, level: Level, pattern: &str) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level && r.message.contains(pattern))
            .collect()
    }

    pub fn assert_contains(&self, level: Level, pattern: &str) -> LogRecord {
        match self.matching(level, pattern).into_iter().next() {
            Some(record) => record,
            None => panic!(
                "Expected {} log matching '{}', none found. All logs:\n{}",
                level,
                pattern,
                self.records()
                    .iter()
                    .map(|r| format!("{} {}", r.level, r.message))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }

    pub fn assert_no_match(&self, level: Level, pattern: &str) {
        let matches = self.matching(level, pattern);
        assert!(
            matches.is_empty(),
            "Expected no {} logs matching '{}', found {}",
            level,
            pattern,
            matches.len()
        );
    }
}

impl<S> tracing_subscriber::Layer<S> for LogCapture
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        use tracing::field::Visit;

        #[derive(Default)]
        struct RecordVisitor {
            message: String,
            fields: Vec<(String, String)>,
        }

        impl Visit for RecordVisitor {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = value.to_string();
                } else {
                    self.fields.push((field.name().to_string(), value.to_string()));
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                let rendered = format!("{:?}", value);
                if field.name() == "message" {
                    self.message = rendered;
                } else {
                    self.fields.push((field.name().to_string(), rendered));
                }
            }
        }

        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        self.records.lock().unwrap().push(LogRecord {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}
