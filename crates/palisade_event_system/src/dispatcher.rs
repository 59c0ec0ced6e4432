//! Event routing: the type-to-handler-list registry and the dispatch loop.

use crate::event::{Event, EventExecutor, EventType, Listener, PluginOwner};
use crate::handler::{HandlerList, RegisteredListener};
use crate::priority::EventPriority;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Routes typed events to their handler lists and invokes registrations in
/// priority order.
///
/// The dispatcher owns one [`HandlerList`] per registered [`EventType`].
/// Event-defining modules populate the registry with
/// [`register_event_type`](Self::register_event_type) at startup; an event
/// whose tag was never registered has no handler list, and dispatching it is
/// a logged no-op rather than an error.
pub struct EventDispatcher {
    handler_lists: DashMap<EventType, Arc<HandlerList>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handler_lists: DashMap::new(),
        }
    }

    /// Register an event type, creating its handler list if it does not
    /// exist yet. Idempotent; repeated calls return the same list.
    pub fn register_event_type(&self, event_type: EventType) -> Arc<HandlerList> {
        self.handler_lists
            .entry(event_type)
            .or_insert_with(|| Arc::new(HandlerList::new()))
            .clone()
    }

    /// The handler list for an event type, or `None` if the tag was never
    /// registered.
    pub fn handler_list(&self, event_type: EventType) -> Option<Arc<HandlerList>> {
        self.handler_lists.get(&event_type).map(|e| e.value().clone())
    }

    /// Register a listener for an event type.
    ///
    /// Fails silently if the owning plugin is not enabled (plugins may
    /// attempt registration mid-teardown) or if the event type is unknown.
    pub fn register_listener(
        &self,
        event_type: EventType,
        listener: Arc<dyn Listener>,
        executor: EventExecutor,
        owner: Arc<dyn PluginOwner>,
        priority: EventPriority,
        ignore_cancelled: bool,
    ) {
        if !owner.is_enabled() {
            debug!(
                "Ignoring listener registration for {} from disabled plugin {}",
                event_type,
                owner.name()
            );
            return;
        }
        let Some(list) = self.handler_list(event_type) else {
            warn!(
                "No handler list for event type {}; listener from {} not registered",
                event_type,
                owner.name()
            );
            return;
        };
        let registration = Arc::new(RegisteredListener::new(
            listener,
            executor,
            priority,
            owner,
            ignore_cancelled,
        ));
        list.register(registration);
        debug!("Registered listener for {}", event_type);
    }

    /// Deliver an event to every registration in its handler list's baked
    /// order.
    ///
    /// Registrations whose owning plugin is disabled are skipped. Delivery
    /// is never short-circuited by cancellation, and a failing listener is
    /// logged without aborting the remaining deliveries.
    pub fn dispatch(&self, event: &mut dyn Event) {
        let event_type = event.event_type();
        let Some(list) = self.handler_list(event_type) else {
            warn!("No handler list for dispatched event type {}", event_type);
            return;
        };

        let baked = list.baked();
        for registration in baked.iter() {
            if !registration.owner().is_enabled() {
                continue;
            }
            if let Err(e) = registration.call_event(event) {
                error!(
                    "Listener owned by {} failed handling {}: {}",
                    registration.owner().name(),
                    event_type,
                    e
                );
            }
        }
    }

    /// Rebuild the baked snapshot of every handler list.
    ///
    /// Called once after a batch of registrations completes (a plugin
    /// finishing enabling) so dispatch never re-sorts mid-stream.
    pub fn bake_all(&self) {
        for entry in self.handler_lists.iter() {
            entry.value().bake();
        }
    }

    /// Remove every registration owned by the named plugin from every
    /// handler list.
    pub fn unregister_plugin(&self, plugin_name: &str) {
        for entry in self.handler_lists.iter() {
            entry.value().unregister_owner(plugin_name);
        }
    }

    /// Remove every registration from every handler list and tear down the
    /// type registry.
    pub fn clear(&self) {
        for entry in self.handler_lists.iter() {
            entry.value().clear();
        }
        self.handler_lists.clear();
    }

    /// Number of registered event types.
    pub fn event_type_count(&self) -> usize {
        self.handler_lists.len()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{typed_executor, Cancellable};
    use std::any::Any;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    const CHAT: EventType = EventType::new("chat");
    const UNKNOWN: EventType = EventType::new("unknown");

    #[derive(Debug)]
    struct ChatEvent {
        message: String,
        cancelled: bool,
    }

    impl ChatEvent {
        fn new(message: &str) -> Self {
            Self {
                message: message.to_string(),
                cancelled: false,
            }
        }
    }

    impl Event for ChatEvent {
        fn event_type(&self) -> EventType {
            CHAT
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn cancellable_mut(&mut self) -> Option<&mut dyn Cancellable> {
            Some(self)
        }
    }

    impl Cancellable for ChatEvent {
        fn is_cancelled(&self) -> bool {
            self.cancelled
        }

        fn set_cancelled(&mut self, cancelled: bool) {
            self.cancelled = cancelled;
        }
    }

    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }

        fn record(&self, tag: &str) {
            self.calls.lock().unwrap().push(tag.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Listener for Recorder {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct FakeOwner {
        name: String,
        enabled: AtomicBool,
    }

    impl FakeOwner {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                enabled: AtomicBool::new(true),
            })
        }

        fn set_enabled(&self, enabled: bool) {
            self.enabled.store(enabled, Ordering::Relaxed);
        }
    }

    impl PluginOwner for FakeOwner {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_enabled(&self) -> bool {
            self.enabled.load(Ordering::Relaxed)
        }
    }

    fn record_executor(tag: &'static str) -> EventExecutor {
        typed_executor(move |listener: &Recorder, _: &mut ChatEvent| {
            listener.record(tag);
            Ok(())
        })
    }

    #[test]
    fn dispatch_runs_priority_ascending_with_fifo_ties() {
        let dispatcher = EventDispatcher::new();
        dispatcher.register_event_type(CHAT);
        let owner = FakeOwner::new("p");
        let recorder = Recorder::new();

        for (tag, priority) in [
            ("monitor", EventPriority::Monitor),
            ("normal-1", EventPriority::Normal),
            ("lowest", EventPriority::Lowest),
            ("normal-2", EventPriority::Normal),
            ("high", EventPriority::High),
        ] {
            dispatcher.register_listener(
                CHAT,
                recorder.clone(),
                record_executor(tag),
                owner.clone(),
                priority,
                false,
            );
        }
        dispatcher.bake_all();

        let mut event = ChatEvent::new("hello");
        dispatcher.dispatch(&mut event);

        assert_eq!(
            recorder.calls(),
            vec!["lowest", "normal-1", "normal-2", "high", "monitor"]
        );
    }

    #[test]
    fn cancellation_does_not_short_circuit_delivery() {
        let dispatcher = EventDispatcher::new();
        dispatcher.register_event_type(CHAT);
        let owner = FakeOwner::new("p");
        let recorder = Recorder::new();

        dispatcher.register_listener(
            CHAT,
            recorder.clone(),
            typed_executor(|listener: &Recorder, event: &mut ChatEvent| {
                listener.record("canceller");
                event.set_cancelled(true);
                Ok(())
            }),
            owner.clone(),
            EventPriority::Low,
            false,
        );
        // Both flag variants still run after cancellation; the flag is
        // advisory, not a delivery gate.
        dispatcher.register_listener(
            CHAT,
            recorder.clone(),
            typed_executor(|listener: &Recorder, event: &mut ChatEvent| {
                assert!(event.is_cancelled());
                listener.record("respects-flag");
                Ok(())
            }),
            owner.clone(),
            EventPriority::Normal,
            true,
        );
        dispatcher.register_listener(
            CHAT,
            recorder.clone(),
            typed_executor(|listener: &Recorder, event: &mut ChatEvent| {
                assert!(event.is_cancelled());
                listener.record("ignores-flag");
                Ok(())
            }),
            owner.clone(),
            EventPriority::High,
            false,
        );
        dispatcher.bake_all();

        let mut event = ChatEvent::new("hello");
        dispatcher.dispatch(&mut event);

        assert!(event.is_cancelled());
        assert_eq!(
            recorder.calls(),
            vec!["canceller", "respects-flag", "ignores-flag"]
        );
    }

    #[test]
    fn disabled_owner_registrations_are_skipped() {
        let dispatcher = EventDispatcher::new();
        dispatcher.register_event_type(CHAT);
        let live = FakeOwner::new("live");
        let dead = FakeOwner::new("dead");
        let recorder = Recorder::new();

        dispatcher.register_listener(
            CHAT,
            recorder.clone(),
            record_executor("live"),
            live.clone(),
            EventPriority::Normal,
            false,
        );
        dispatcher.register_listener(
            CHAT,
            recorder.clone(),
            record_executor("dead"),
            dead.clone(),
            EventPriority::Normal,
            false,
        );
        dispatcher.bake_all();
        dead.set_enabled(false);

        let mut event = ChatEvent::new("hello");
        dispatcher.dispatch(&mut event);

        assert_eq!(recorder.calls(), vec!["live"]);
    }

    #[test]
    fn registration_for_disabled_plugin_is_a_silent_no_op() {
        let dispatcher = EventDispatcher::new();
        dispatcher.register_event_type(CHAT);
        let owner = FakeOwner::new("p");
        owner.set_enabled(false);
        let recorder = Recorder::new();

        dispatcher.register_listener(
            CHAT,
            recorder.clone(),
            record_executor("never"),
            owner.clone(),
            EventPriority::Normal,
            false,
        );

        assert!(dispatcher.handler_list(CHAT).unwrap().is_empty());
    }

    #[test]
    fn dispatch_of_unknown_event_type_is_a_no_op() {
        let dispatcher = EventDispatcher::new();
        assert!(dispatcher.handler_list(UNKNOWN).is_none());

        #[derive(Debug)]
        struct StrayEvent;

        impl Event for StrayEvent {
            fn event_type(&self) -> EventType {
                UNKNOWN
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        let mut event = StrayEvent;
        dispatcher.dispatch(&mut event);
    }

    #[test]
    fn listener_registered_mid_dispatch_misses_the_inflight_event() {
        let dispatcher = Arc::new(EventDispatcher::new());
        dispatcher.register_event_type(CHAT);
        let owner = FakeOwner::new("p");
        let recorder = Recorder::new();

        let inner_dispatcher = dispatcher.clone();
        let inner_owner = owner.clone();
        let inner_recorder = recorder.clone();
        dispatcher.register_listener(
            CHAT,
            recorder.clone(),
            typed_executor(move |listener: &Recorder, _: &mut ChatEvent| {
                listener.record("outer");
                inner_dispatcher.register_listener(
                    CHAT,
                    inner_recorder.clone(),
                    record_executor("inner"),
                    inner_owner.clone(),
                    EventPriority::Lowest,
                    false,
                );
                Ok(())
            }),
            owner.clone(),
            EventPriority::Normal,
            false,
        );
        dispatcher.bake_all();

        let mut first = ChatEvent::new("first");
        dispatcher.dispatch(&mut first);
        // The inner registration landed after the snapshot was taken.
        assert_eq!(recorder.calls(), vec!["outer"]);

        dispatcher.bake_all();
        let mut second = ChatEvent::new("second");
        dispatcher.dispatch(&mut second);
        // After rebaking, the inner registration (Lowest) runs ahead of the
        // outer one (Normal).
        assert_eq!(recorder.calls(), vec!["outer", "inner", "outer"]);
    }

    #[test]
    fn unregister_plugin_removes_from_every_list() {
        let dispatcher = EventDispatcher::new();
        let other: EventType = EventType::new("other");
        dispatcher.register_event_type(CHAT);
        dispatcher.register_event_type(other);
        let owner = FakeOwner::new("p");
        let recorder = Recorder::new();

        dispatcher.register_listener(
            CHAT,
            recorder.clone(),
            record_executor("chat"),
            owner.clone(),
            EventPriority::Normal,
            false,
        );
        dispatcher.unregister_plugin("p");

        let mut event = ChatEvent::new("hello");
        dispatcher.dispatch(&mut event);
        assert!(recorder.calls().is_empty());
        assert!(dispatcher.handler_list(CHAT).unwrap().is_empty());
    }
}
