//! Listener priority tiers.

use serde::{Deserialize, Serialize};

/// Priority tier of a listener registration.
///
/// Delivery is priority-ascending: `Lowest` runs first and `Monitor` runs
/// last, after every tier that may still mutate the event. Within a tier,
/// registrations are invoked in registration order (FIFO).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPriority {
    Lowest,
    Low,
    Normal,
    High,
    Highest,
    /// Observation only; listeners at this tier should not mutate the event.
    Monitor,
}

impl Default for EventPriority {
    fn default() -> Self {
        EventPriority::Normal
    }
}
