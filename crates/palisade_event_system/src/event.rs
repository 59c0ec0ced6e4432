//! Core event traits and the event-type tag used for routing.

use crate::error::EventError;
use std::any::Any;
use std::fmt;

/// Routing tag identifying one concrete event type.
///
/// Each concrete event type owns exactly one tag, and each tag maps to one
/// process-wide [`HandlerList`](crate::handler::HandlerList) inside the
/// dispatcher. Event-defining modules mint their own tags and register them
/// with [`EventDispatcher::register_event_type`](crate::dispatcher::EventDispatcher::register_event_type)
/// at startup, so there is no central enum to edit when a new event type is
/// added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventType(&'static str);

impl EventType {
    /// Create a tag from a stable, unique name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The tag's name, as used in logs.
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Trait implemented by every concrete event type.
///
/// Events are plain data. Listeners receive them by `&mut` reference and may
/// mutate their payload; downcasting to the concrete type goes through
/// [`Event::as_any_mut`], usually via [`typed_executor`].
pub trait Event: Any + Send + Sync + fmt::Debug {
    /// The routing tag for this event type.
    fn event_type(&self) -> EventType;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The event's cancellation capability, if it has one.
    ///
    /// Returning `Some` marks the type as Cancellable. Cancellation is a data
    /// flag only: dispatch never short-circuits on it.
    fn cancellable_mut(&mut self) -> Option<&mut dyn Cancellable> {
        None
    }
}

/// Capability of events that listeners may mark as suppressed.
///
/// Setting the flag does not halt delivery to the remaining listeners; it
/// only tells downstream consumers of the event to disregard it.
pub trait Cancellable {
    fn is_cancelled(&self) -> bool;

    fn set_cancelled(&mut self, cancelled: bool);
}

/// Marker trait for listener instances.
///
/// A listener is any state a plugin binds registrations to; the executor
/// closure downcasts it back to the concrete type at invocation time.
pub trait Listener: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Capability interface over the plugin that owns a registration.
///
/// The event system never sees plugin internals; it only needs the owner's
/// name (for unregistration) and its live enabled flag (checked on every
/// dispatch, so a disabled plugin's registrations go quiet immediately).
pub trait PluginOwner: Send + Sync {
    fn name(&self) -> &str;

    fn is_enabled(&self) -> bool;
}

/// Callback invoked for one registration during dispatch.
pub type EventExecutor =
    Box<dyn Fn(&dyn Listener, &mut dyn Event) -> Result<(), EventError> + Send + Sync>;

/// Wrap a strongly-typed callback into an [`EventExecutor`].
///
/// The returned executor downcasts the listener and event to their concrete
/// types and fails with a mismatch error if either downcast fails, which
/// indicates a registration against the wrong event type.
pub fn typed_executor<L, E, F>(callback: F) -> EventExecutor
where
    L: Listener,
    E: Event,
    F: Fn(&L, &mut E) -> Result<(), EventError> + Send + Sync + 'static,
{
    Box::new(move |listener, event| {
        let listener = listener
            .as_any()
            .downcast_ref::<L>()
            .ok_or(EventError::ListenerMismatch(std::any::type_name::<L>()))?;
        let event = event
            .as_any_mut()
            .downcast_mut::<E>()
            .ok_or(EventError::EventMismatch(std::any::type_name::<E>()))?;
        callback(listener, event)
    })
}
