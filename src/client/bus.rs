//! In-process event bus for the Plaza client runtime.
//!
//! The bus decouples state mutation and transport events from UI
//! reaction. Publishing is synchronous: every handler registered for the
//! topic runs before `publish` returns, on the caller's thread.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::web::dto::ChatMessageResponse;
use crate::Result;

/// Well-known topics.
pub mod topics {
    /// Inbound chat broadcasts from the gateway.
    pub const CHAT_MESSAGE: &str = "chat.message";
    /// Scoped chat errors from the gateway.
    pub const CHAT_ERROR: &str = "chat.error";
    /// Realtime channel lifecycle events.
    pub const CONNECTION: &str = "connection";
    /// Session slice changes.
    pub const STATE_SESSION: &str = "state.session";
    /// Overlay slice changes.
    pub const STATE_OVERLAYS: &str = "state.overlays";
    /// Wizard slice changes.
    pub const STATE_WIZARD: &str = "state.wizard";
}

/// State slices the store publishes change events for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSlice {
    /// Auth/session data.
    Session,
    /// UI overlay flags.
    Overlays,
    /// Transient placement-wizard state.
    Wizard,
}

impl StateSlice {
    /// The topic change events for this slice are published under.
    pub fn topic(&self) -> &'static str {
        match self {
            StateSlice::Session => topics::STATE_SESSION,
            StateSlice::Overlays => topics::STATE_OVERLAYS,
            StateSlice::Wizard => topics::STATE_WIZARD,
        }
    }
}

/// The closed set of events that travel over the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    /// The realtime channel came up.
    Connected,
    /// The realtime channel was refused at handshake time.
    AuthFailed,
    /// The realtime channel went down.
    Disconnected,
    /// A chat broadcast arrived from the gateway.
    MessageBroadcast(ChatMessageResponse),
    /// A scoped chat error arrived from the gateway.
    ChatError {
        /// Human-readable message.
        message: String,
    },
    /// A state store slice changed.
    StateChanged {
        /// The slice that changed.
        slice: StateSlice,
    },
}

/// A registered handler. Errors are logged and do not stop later
/// handlers from running.
type Handler = Box<dyn FnMut(&BusEvent) -> Result<()> + Send>;

/// In-process publish/subscribe bus.
pub struct EventBus {
    handlers: Mutex<HashMap<String, Vec<(u64, Arc<Mutex<Handler>>)>>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler for a topic.
    ///
    /// Handlers for one topic run in registration order. The returned
    /// subscription is the disposer; call [`Subscription::dispose`] to
    /// unregister.
    pub fn subscribe<F>(self: &Arc<Self>, topic: &str, handler: F) -> Subscription
    where
        F: FnMut(&BusEvent) -> Result<()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut handlers = self.handlers.lock().expect("bus lock poisoned");
        handlers
            .entry(topic.to_string())
            .or_default()
            .push((id, Arc::new(Mutex::new(Box::new(handler)))));

        Subscription {
            bus: Arc::clone(self),
            topic: topic.to_string(),
            id,
            disposed: false,
        }
    }

    /// Remove one handler registration.
    ///
    /// Removing the last handler for a topic frees its entry. Returns
    /// true if a handler was removed.
    pub fn unsubscribe(&self, topic: &str, id: u64) -> bool {
        let mut handlers = self.handlers.lock().expect("bus lock poisoned");
        let Some(registered) = handlers.get_mut(topic) else {
            return false;
        };
        let before = registered.len();
        registered.retain(|(handler_id, _)| *handler_id != id);
        let removed = registered.len() < before;
        if registered.is_empty() {
            handlers.remove(topic);
        }
        removed
    }

    /// Synchronously invoke every handler currently registered for a
    /// topic.
    ///
    /// A handler returning an error is logged and does not prevent the
    /// remaining handlers from running. Publishing to a topic with zero
    /// subscribers is a no-op.
    pub fn publish(&self, topic: &str, event: &BusEvent) {
        // Snapshot the registration list so handlers may subscribe or
        // unsubscribe while the cycle runs.
        let snapshot: Vec<Arc<Mutex<Handler>>> = {
            let handlers = self.handlers.lock().expect("bus lock poisoned");
            match handlers.get(topic) {
                Some(registered) => registered.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return,
            }
        };

        for handler in snapshot {
            let mut handler = handler.lock().expect("handler lock poisoned");
            if let Err(e) = handler(event) {
                tracing::warn!("Event handler for topic {} failed: {}", topic, e);
            }
        }
    }

    /// Number of handlers registered for a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.handlers
            .lock()
            .expect("bus lock poisoned")
            .get(topic)
            .map_or(0, |registered| registered.len())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Disposer returned by [`EventBus::subscribe`].
pub struct Subscription {
    bus: Arc<EventBus>,
    topic: String,
    id: u64,
    disposed: bool,
}

impl Subscription {
    /// Unregister the handler. Safe to call more than once.
    pub fn dispose(&mut self) {
        if !self.disposed {
            self.bus.unsubscribe(&self.topic, self.id);
            self.disposed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlazaError;

    fn chat_error(message: &str) -> BusEvent {
        BusEvent::ChatError {
            message: message.to_string(),
        }
    }

    #[test]
    fn test_publish_reaches_subscriber() {
        let bus = Arc::new(EventBus::new());
        let received = Arc::new(Mutex::new(Vec::new()));

        let sink = received.clone();
        let _sub = bus.subscribe(topics::CHAT_ERROR, move |event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });

        bus.publish(topics::CHAT_ERROR, &chat_error("boom"));

        let events = received.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], chat_error("boom"));
    }

    #[test]
    fn test_publish_no_subscribers_is_noop() {
        let bus = EventBus::new();
        bus.publish("nobody-home", &BusEvent::Connected);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = Arc::new(EventBus::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let o1 = order.clone();
        let _sub1 = bus.subscribe("t", move |_| {
            o1.lock().unwrap().push(1);
            Ok(())
        });
        let o2 = order.clone();
        let _sub2 = bus.subscribe("t", move |_| {
            o2.lock().unwrap().push(2);
            Ok(())
        });
        let o3 = order.clone();
        let _sub3 = bus.subscribe("t", move |_| {
            o3.lock().unwrap().push(3);
            Ok(())
        });

        bus.publish("t", &BusEvent::Connected);

        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_failing_handler_does_not_stop_others() {
        let bus = Arc::new(EventBus::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let o1 = order.clone();
        let _sub1 = bus.subscribe("t", move |_| {
            o1.lock().unwrap().push(1);
            Err(PlazaError::Validation("handler failure".to_string()))
        });
        let o2 = order.clone();
        let _sub2 = bus.subscribe("t", move |_| {
            o2.lock().unwrap().push(2);
            Ok(())
        });

        bus.publish("t", &BusEvent::Connected);

        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_dispose_removes_exactly_one_handler() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(Mutex::new(0));

        let c1 = count.clone();
        let mut sub1 = bus.subscribe("t", move |_| {
            *c1.lock().unwrap() += 1;
            Ok(())
        });
        let c2 = count.clone();
        let _sub2 = bus.subscribe("t", move |_| {
            *c2.lock().unwrap() += 10;
            Ok(())
        });

        sub1.dispose();
        bus.publish("t", &BusEvent::Connected);

        assert_eq!(*count.lock().unwrap(), 10);
        assert_eq!(bus.subscriber_count("t"), 1);
    }

    #[test]
    fn test_dispose_twice_is_safe() {
        let bus = Arc::new(EventBus::new());
        let mut sub = bus.subscribe("t", |_| Ok(()));
        sub.dispose();
        sub.dispose();
        assert_eq!(bus.subscriber_count("t"), 0);
    }

    #[test]
    fn test_last_handler_removal_frees_topic_entry() {
        let bus = Arc::new(EventBus::new());
        let mut sub = bus.subscribe("t", |_| Ok(()));

        assert_eq!(bus.subscriber_count("t"), 1);
        sub.dispose();

        // The topic entry itself is gone
        assert!(!bus.handlers.lock().unwrap().contains_key("t"));
    }

    #[test]
    fn test_handler_can_unsubscribe_during_publish() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(Mutex::new(0));

        let bus_inner = bus.clone();
        let c = count.clone();
        let sub_id_holder: Arc<Mutex<Option<u64>>> = Arc::new(Mutex::new(None));
        let holder = sub_id_holder.clone();

        let sub = bus.subscribe("t", move |_| {
            *c.lock().unwrap() += 1;
            if let Some(id) = *holder.lock().unwrap() {
                bus_inner.unsubscribe("t", id);
            }
            Ok(())
        });
        *sub_id_holder.lock().unwrap() = Some(sub.id);

        bus.publish("t", &BusEvent::Connected);
        bus.publish("t", &BusEvent::Connected);

        // Handler removed itself during the first cycle
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_state_slice_topics() {
        assert_eq!(StateSlice::Session.topic(), topics::STATE_SESSION);
        assert_eq!(StateSlice::Overlays.topic(), topics::STATE_OVERLAYS);
        assert_eq!(StateSlice::Wizard.topic(), topics::STATE_WIZARD);
    }
}
