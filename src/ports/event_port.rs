//! Event subscription port trait.

use crate::domain::error::AutolotError;
use crate::domain::event::{Event, SubscriptionId, Topic};

/// Serial source of session events.
///
/// Only events on subscribed topics are delivered. Every id handed out by
/// `subscribe` must be released with `unsubscribe` exactly once.
pub trait EventSource {
    fn subscribe(&mut self, topic: Topic) -> Result<SubscriptionId, AutolotError>;

    fn unsubscribe(&mut self, id: SubscriptionId) -> Result<(), AutolotError>;

    /// Next event, or `None` once the source is exhausted.
    fn next_event(&mut self) -> Option<Event>;
}
