//! Thread-local tracing capture for asserting on what the engine logs.
#![allow(dead_code)]

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// One recorded event with its fields rendered as text.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Records events on the current thread until dropped.
///
/// Use a current-thread runtime so spawned tasks log on the same thread.
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    _guard: DefaultGuard,
}

impl LogCapture {
    pub fn start() -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let recorder = Recorder {
            events: Arc::clone(&events),
        };
        let guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(recorder));
        Self {
            events,
            _guard: guard,
        }
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// First event at `level` whose message contains `needle`.
    pub fn find(&self, level: Level, needle: &str) -> Option<CapturedEvent> {
        self.events()
            .into_iter()
            .find(|e| e.level == level && e.message.contains(needle))
    }

    /// Assert an event exists and return it for field checks.
    pub fn expect_event(&self, level: Level, needle: &str) -> CapturedEvent {
        self.find(level, needle).unwrap_or_else(|| {
            panic!(
                "no {level} event containing {needle:?}; saw {:#?}",
                self.events()
                    .iter()
                    .map(|e| format!("{} {}", e.level, e.message))
                    .collect::<Vec<_>>()
            )
        })
    }

    pub fn assert_no_errors(&self) {
        let errors: Vec<_> = self
            .events()
            .into_iter()
            .filter(|e| e.level == Level::ERROR)
            .collect();
        assert!(errors.is_empty(), "Unexpected errors: {errors:#?}");
    }
}

struct Recorder {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for Recorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldText::default();
        event.record(&mut fields);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: fields.message,
            fields: fields.rest,
        });
    }
}

#[derive(Default)]
struct FieldText {
    message: String,
    rest: Vec<(String, String)>,
}

impl FieldText {
    fn push(&mut self, field: &Field, text: String) {
        if field.name() == "message" {
            self.message = text;
        } else {
            self.rest.push((field.name().to_string(), text));
        }
    }
}

impl Visit for FieldText {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }
}
