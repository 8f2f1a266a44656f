use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

/// Per-kind item counts produced by one generation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenerationSummary {
    pub instructions: usize,
    pub commands: usize,
    pub skills: usize,
    pub agents: usize,
}

/// Lifecycle events dispatched on the [`EventBus`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A watched source path changed
    SourceChanged { path: PathBuf },

    /// A generation pass began
    RegenerationStarted { at: DateTime<Utc> },

    /// A generation pass committed its output
    RegenerationCompleted {
        summary: RegenerationSummary,
        written: usize,
        removed: usize,
        at: DateTime<Utc>,
    },

    /// A generation pass failed; the previous output stays in place
    RegenerationFailed { message: String, at: DateTime<Utc> },

    /// The companion site server is being built and launched
    ServerStarting { url: String },

    /// The companion site server answered its readiness probe
    ServerReady { url: String },

    /// The companion site server was stopped or exited
    ServerStopped { code: Option<i32> },
}

type Handler = Box<dyn Fn(&Event) + Send + Sync>;

/// Synchronous publish/subscribe hub
///
/// Handlers run on the emitting thread, in registration order.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every subsequent event
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(handler));
    }

    pub fn emit(&self, event: &Event) {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        for handler in handlers.iter() {
            handler(event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .finish()
    }
}
