//! Listener registrations and the per-event-type handler list.

use crate::error::EventError;
use crate::event::{Event, EventExecutor, Listener, PluginOwner};
use crate::priority::EventPriority;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// One listener binding: listener instance, executor, priority tier,
/// owning plugin, and the cancellation-ignoring flag.
///
/// The `ignore_cancelled` flag is advisory data carried with the
/// registration. It never gates invocation; dispatch calls every
/// registration of an enabled owner regardless of the event's cancelled
/// state.
pub struct RegisteredListener {
    listener: Arc<dyn Listener>,
    executor: EventExecutor,
    priority: EventPriority,
    owner: Arc<dyn PluginOwner>,
    ignore_cancelled: bool,
}

impl RegisteredListener {
    pub fn new(
        listener: Arc<dyn Listener>,
        executor: EventExecutor,
        priority: EventPriority,
        owner: Arc<dyn PluginOwner>,
        ignore_cancelled: bool,
    ) -> Self {
        Self {
            listener,
            executor,
            priority,
            owner,
            ignore_cancelled,
        }
    }

    /// Invoke this registration's executor with the event.
    pub fn call_event(&self, event: &mut dyn Event) -> Result<(), EventError> {
        (self.executor)(self.listener.as_ref(), event)
    }

    pub fn listener(&self) -> &Arc<dyn Listener> {
        &self.listener
    }

    pub fn priority(&self) -> EventPriority {
        self.priority
    }

    pub fn owner(&self) -> &Arc<dyn PluginOwner> {
        &self.owner
    }

    pub fn ignore_cancelled(&self) -> bool {
        self.ignore_cancelled
    }
}

impl std::fmt::Debug for RegisteredListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredListener")
            .field("priority", &self.priority)
            .field("owner", &self.owner.name())
            .field("ignore_cancelled", &self.ignore_cancelled)
            .finish()
    }
}

/// Registry of every listener registration for one concrete event type.
///
/// Registrations are kept in insertion order; baking produces a stable
/// snapshot sorted by ascending priority with ties kept FIFO. Dispatch
/// iterates the snapshot, so mutating the list mid-dispatch (a listener
/// registering or a plugin disabling) never disturbs an iteration already
/// in flight.
pub struct HandlerList {
    registrations: RwLock<Vec<Arc<RegisteredListener>>>,
    baked: RwLock<Option<Arc<[Arc<RegisteredListener>]>>>,
}

impl HandlerList {
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
            baked: RwLock::new(None),
        }
    }

    /// Add a registration and invalidate the baked snapshot.
    pub fn register(&self, registration: Arc<RegisteredListener>) {
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(registration);
        self.invalidate();
    }

    /// Remove every registration owned by the named plugin.
    pub fn unregister_owner(&self, plugin_name: &str) {
        let removed = {
            let mut registrations = self
                .registrations
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let before = registrations.len();
            registrations.retain(|r| r.owner().name() != plugin_name);
            before - registrations.len()
        };
        if removed > 0 {
            debug!("Unregistered {} listeners owned by {}", removed, plugin_name);
            self.invalidate();
        }
    }

    /// Remove every registration.
    pub fn clear(&self) {
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.invalidate();
    }

    /// Rebuild the baked snapshot now.
    pub fn bake(&self) {
        let snapshot = self.sorted_snapshot();
        *self.baked.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }

    /// The baked snapshot, rebuilding it first if a registration change
    /// invalidated it.
    pub fn baked(&self) -> Arc<[Arc<RegisteredListener>]> {
        if let Some(snapshot) = self
            .baked
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return snapshot;
        }
        let snapshot = self.sorted_snapshot();
        *self.baked.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        snapshot
    }

    pub fn len(&self) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn invalidate(&self) {
        *self.baked.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn sorted_snapshot(&self) -> Arc<[Arc<RegisteredListener>]> {
        let mut snapshot: Vec<Arc<RegisteredListener>> = self
            .registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        // Stable sort keeps registration order within a priority tier.
        snapshot.sort_by_key(|r| r.priority());
        snapshot.into()
    }
}

impl Default for HandlerList {
    fn default() -> Self {
        Self::new()
    }
}
