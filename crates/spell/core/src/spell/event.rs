//! Cooperative delayed-event queue.
//!
//! Each cast owns one [`SpellEventManager`]. Events are plain values; the cast
//! interprets fired events itself, so the queue never holds a reference back
//! into the cast.

use crate::state::{EntityId, SpellId};

/// A pending delayed action.
#[derive(Clone, Debug, PartialEq)]
pub struct SpellEvent<A> {
    /// Seconds left before the event fires.
    pub remaining: f64,
    pub action: A,
}

/// Delayed actions ordered by remaining time; ties keep insertion order.
#[derive(Clone, Debug)]
pub struct SpellEventManager<A> {
    events: Vec<SpellEvent<A>>,
}

impl<A> SpellEventManager<A> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Queues `action` to fire once `delay` seconds have elapsed.
    pub fn enqueue(&mut self, delay: f64, action: A) {
        let remaining = delay.max(0.0);
        let index = self.events.partition_point(|e| e.remaining <= remaining);
        self.events.insert(index, SpellEvent { remaining, action });
    }

    /// Advances every event by `dt` and returns the actions that fired, in
    /// firing order. Fired events are removed and never fire again.
    pub fn update(&mut self, dt: f64) -> Vec<A> {
        for event in &mut self.events {
            event.remaining -= dt;
        }
        let due = self.events.partition_point(|e| e.remaining <= 0.0);
        self.events.drain(..due).map(|e| e.action).collect()
    }

    #[inline]
    pub fn has_pending_event(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpellEvent<A>> {
        self.events.iter()
    }

    /// Drops every pending event without firing it.
    pub fn cancel_events(&mut self) -> Vec<A> {
        self.events.drain(..).map(|e| e.action).collect()
    }
}

impl<A> Default for SpellEventManager<A> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Cast Events
// ============================================================================

/// Actions a cast schedules on its own queue.
#[derive(Clone, Debug, PartialEq)]
pub enum SpellEventAction {
    /// Run an execute pass.
    Execute,
    /// Run an execute pass for the given multiphase phase.
    ExecutePhase(u8),
    /// End a channel.
    Finish,
    /// A timed effect ran out on the listed targets.
    EffectExpired {
        effect_id: u32,
        targets: Vec<EntityId>,
    },
    /// Hand a delayed proxy cast to the owner.
    CastProxy(ProxyCastRequest),
}

/// Request for the owning entity to start a proxy cast.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProxyCastRequest {
    pub spell: SpellId,
    pub caster: EntityId,
    pub primary_target: EntityId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fires_in_remaining_time_order() {
        let mut events = SpellEventManager::new();
        events.enqueue(2.0, "late");
        events.enqueue(1.0, "early");
        events.enqueue(1.0, "early-second");
        assert_eq!(events.update(1.5), vec!["early", "early-second"]);
        assert!(events.has_pending_event());
        assert_eq!(events.update(0.5), vec!["late"]);
        assert!(!events.has_pending_event());
    }

    #[test]
    fn zero_delay_fires_on_next_update() {
        let mut events = SpellEventManager::new();
        events.enqueue(0.0, 1);
        assert!(events.has_pending_event());
        assert_eq!(events.update(0.0), vec![1]);
    }

    #[test]
    fn fired_events_do_not_fire_twice() {
        let mut events = SpellEventManager::new();
        events.enqueue(0.1, ());
        assert_eq!(events.update(1.0).len(), 1);
        assert!(events.update(1.0).is_empty());
    }

    #[test]
    fn cancel_drops_everything() {
        let mut events = SpellEventManager::new();
        events.enqueue(1.0, 'a');
        events.enqueue(3.0, 'b');
        assert_eq!(events.cancel_events(), vec!['a', 'b']);
        assert!(events.update(10.0).is_empty());
    }

    proptest! {
        #[test]
        fn every_event_fires_exactly_once(
            delays in prop::collection::vec(0.0f64..5.0, 0..32),
            step in 0.05f64..1.0,
        ) {
            let mut events = SpellEventManager::new();
            for (index, delay) in delays.iter().enumerate() {
                events.enqueue(*delay, index);
            }
            let mut fired = Vec::new();
            let mut guard = 0;
            while events.has_pending_event() && guard < 1000 {
                fired.extend(events.update(step));
                guard += 1;
            }
            fired.sort_unstable();
            prop_assert_eq!(fired, (0..delays.len()).collect::<Vec<_>>());
        }

        #[test]
        fn firing_order_follows_delay(delays in prop::collection::vec(0.0f64..5.0, 1..16)) {
            let mut events = SpellEventManager::new();
            for (index, delay) in delays.iter().enumerate() {
                events.enqueue(*delay, index);
            }
            let fired = events.update(10.0);
            for pair in fired.windows(2) {
                prop_assert!(delays[pair[0]] <= delays[pair[1]]);
            }
        }
    }
}
