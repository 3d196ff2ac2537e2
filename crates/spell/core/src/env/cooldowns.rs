//! Cooldown store gateway.

use crate::state::{EntityId, SpellId};

/// Remaining cooldowns per caster, in seconds. Zero means ready.
pub trait CooldownGateway: Send + Sync {
    fn spell_cooldown(&self, caster: EntityId, spell: SpellId) -> f64;
    fn set_spell_cooldown(&self, caster: EntityId, spell: SpellId, seconds: f64);

    fn group_cooldown(&self, caster: EntityId, group: u32) -> f64;
    fn set_group_cooldown(&self, caster: EntityId, group: u32, seconds: f64);

    fn global_cooldown(&self, caster: EntityId, bucket: u32) -> f64;
    fn set_global_cooldown(&self, caster: EntityId, bucket: u32, seconds: f64);
}
