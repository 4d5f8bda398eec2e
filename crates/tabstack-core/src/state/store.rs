use super::events::Event;
use super::types::Command;

/// Trait for dispatching commands against window-grouping state.
///
/// Decouples command definitions from their execution so the CLI replay,
/// tests, and a platform event loop can drive the same state machine.
///
/// # Semantics
///
/// - **Ordering**: Commands execute in the order received. No implicit batching.
/// - **Re-entrancy**: Commands never run deferred work themselves; callers
///   drain it separately once its delay has passed.
/// - **Error handling**: Implementations define their own error type. Invalid
///   requests (a group that no longer exists, an already-owned window) are
///   no-ops that return no events, not errors.
/// - **Events**: On success, dispatch returns the events describing what
///   changed, in the order they happened. An empty vector means nothing did.
pub trait Store {
    type Error;
    fn dispatch(&mut self, cmd: Command) -> Result<Vec<Event>, Self::Error>;
}
