//! # Palisade Event System
//!
//! Priority-ordered, cancellable event delivery for the Palisade plugin
//! runtime. The system is built around a few core pieces:
//!
//! - **[`Event`]**: trait implemented by every concrete event type, tagged
//!   with an [`EventType`] used for routing.
//! - **[`HandlerList`]**: per-event-type registry of registrations with a
//!   baked snapshot for stable iteration during dispatch.
//! - **[`RegisteredListener`]**: one listener binding with its executor,
//!   priority tier, and owning plugin.
//! - **[`EventDispatcher`]**: routes an event instance to its handler list
//!   and invokes registrations in priority order.
//!
//! The whole system runs on the host's single logic thread. Dispatch is
//! synchronous and re-entrant: a listener may register further listeners or
//! fire further events while a dispatch is in flight, because iteration
//! always works over a baked copy of the registration list.

pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handler;
pub mod priority;

pub use dispatcher::EventDispatcher;
pub use error::EventError;
pub use event::{typed_executor, Cancellable, Event, EventExecutor, EventType, Listener, PluginOwner};
pub use handler::{HandlerList, RegisteredListener};
pub use priority::EventPriority;

/// Result type used throughout the event system.
pub type Result<T> = std::result::Result<T, EventError>;
