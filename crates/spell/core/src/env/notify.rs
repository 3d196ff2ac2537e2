//! Outbound notification sink.

use crate::spell::SpellNotification;

/// Receives notifications published by casts, in publication order.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: SpellNotification);
}
