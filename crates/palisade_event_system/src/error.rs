//! Error types for event registration and dispatch.

/// Errors surfaced by listener executors during dispatch.
///
/// Dispatch itself never aborts on a failing listener; errors are logged and
/// delivery continues with the next registration.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// A listener executor failed while processing an event
    #[error("handler execution error: {0}")]
    HandlerExecution(String),
    /// An executor was invoked with a listener of an unexpected concrete type
    #[error("listener type mismatch: expected {0}")]
    ListenerMismatch(&'static str),
    /// An executor was invoked with an event of an unexpected concrete type
    #[error("event type mismatch: expected {0}")]
    EventMismatch(&'static str),
}
