use std::sync::OnceLock;

use super::{Listener, SessionEvent};

static LISTENERS: OnceLock<EventRegistry> = OnceLock::new();

/// Listeners that receive every [`SessionEvent`], in registration order.
pub struct EventRegistry {
    listeners: Vec<Box<dyn Listener>>,
}

impl EventRegistry {
    fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn listen(&mut self, listener: impl Listener) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    async fn notify(&self, event: &SessionEvent) {
        log::trace!(
            target: "autodig_session::events",
            "msg=\"dispatching\" event=\"{}\" listeners={}",
            event.name(),
            self.len()
        );
        for listener in &self.listeners {
            listener.handle(event).await;
        }
    }
}

/// Installs the process-wide listeners. Call once at startup; a second
/// call is ignored with a warning.
pub fn register_event_listeners<F>(configure: F)
where
    F: FnOnce(&mut EventRegistry),
{
    let mut registry = EventRegistry::new();
    configure(&mut registry);
    let count = registry.len();
    match LISTENERS.set(registry) {
        Ok(()) => log::debug!(
            target: "autodig_session::events",
            "msg=\"listeners registered\" count={}",
            count
        ),
        Err(_) => log::warn!(
            target: "autodig_session::events",
            "msg=\"listeners already registered, ignoring\""
        ),
    }
}

/// Sends `event` to the registered listeners, if any.
pub async fn dispatch(event: SessionEvent) {
    if let Some(registry) = LISTENERS.get() {
        registry.notify(&event).await;
    }
}
