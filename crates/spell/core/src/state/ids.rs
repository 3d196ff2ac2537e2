//! Process-wide id generators.
//!
//! One [`SpellIds`] is constructed at process start and handed to every cast
//! through [`SpellEnv`](crate::env::SpellEnv). Counters start at 1 and only move
//! forward.

use std::sync::atomic::{AtomicU32, Ordering};

use super::{CastingId, EffectInstanceId};

#[derive(Debug)]
pub struct SpellIds {
    casting: AtomicU32,
    effect_instance: AtomicU32,
}

impl SpellIds {
    pub const fn new() -> Self {
        Self {
            casting: AtomicU32::new(1),
            effect_instance: AtomicU32::new(1),
        }
    }

    /// Allocates the next casting id.
    pub fn next_casting_id(&self) -> CastingId {
        CastingId(self.casting.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocates the next effect-instance id.
    pub fn next_effect_instance_id(&self) -> EffectInstanceId {
        EffectInstanceId(self.effect_instance.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SpellIds {
    fn default() -> Self {
        Self::new()
    }
}
