//! In-memory collaborators.
//!
//! Mutex-backed implementations of every gateway trait. The integration tests
//! run on these, and embedders can use them to prototype spell data before a
//! real world server exists. Telegraph containment is configured per
//! telegraph id rather than computed, since shape math lives in the world.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{
    CooldownGateway, CostGateway, NotificationSink, PrerequisiteOracle, SpellCatalog, UnitKind,
    UnitSnapshot, WorldGateway,
};
use crate::spell::{SpellCost, SpellDefinition, SpellNotification, Telegraph};
use crate::state::{EntityId, PrerequisiteId, SpellId, Vector3};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Catalog
// ============================================================================

/// Catalog filled once before casts are created.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    spells: HashMap<SpellId, SpellDefinition>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spell: SpellDefinition) {
        self.spells.insert(spell.id, spell);
    }

    pub fn with(mut self, spell: SpellDefinition) -> Self {
        self.insert(spell);
        self
    }
}

impl SpellCatalog for MemoryCatalog {
    fn spell(&self, id: SpellId) -> Option<&SpellDefinition> {
        self.spells.get(&id)
    }
}

// ============================================================================
// Prerequisites
// ============================================================================

/// Every prerequisite fails unless granted to a unit.
#[derive(Debug, Default)]
pub struct MemoryPrerequisites {
    met: Mutex<HashSet<(EntityId, PrerequisiteId)>>,
}

impl MemoryPrerequisites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, actor: EntityId, prerequisite: PrerequisiteId) {
        lock(&self.met).insert((actor, prerequisite));
    }

    pub fn revoke(&self, actor: EntityId, prerequisite: PrerequisiteId) {
        lock(&self.met).remove(&(actor, prerequisite));
    }
}

impl PrerequisiteOracle for MemoryPrerequisites {
    fn meets(&self, actor: EntityId, prerequisite: PrerequisiteId) -> bool {
        lock(&self.met).contains(&(actor, prerequisite))
    }
}

// ============================================================================
// Cooldowns
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum CooldownKey {
    Spell(SpellId),
    Group(u32),
    Global(u32),
}

/// Cooldown store that counts down when [`MemoryCooldowns::advance`] is called.
#[derive(Debug, Default)]
pub struct MemoryCooldowns {
    remaining: Mutex<HashMap<(EntityId, CooldownKey), f64>>,
}

impl MemoryCooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves every cooldown forward by `dt` seconds.
    pub fn advance(&self, dt: f64) {
        lock(&self.remaining).retain(|_, seconds| {
            *seconds -= dt;
            *seconds > 0.0
        });
    }

    fn get(&self, caster: EntityId, key: CooldownKey) -> f64 {
        lock(&self.remaining)
            .get(&(caster, key))
            .copied()
            .unwrap_or(0.0)
    }

    fn set(&self, caster: EntityId, key: CooldownKey, seconds: f64) {
        let mut remaining = lock(&self.remaining);
        if seconds > 0.0 {
            remaining.insert((caster, key), seconds);
        } else {
            remaining.remove(&(caster, key));
        }
    }
}

impl CooldownGateway for MemoryCooldowns {
    fn spell_cooldown(&self, caster: EntityId, spell: SpellId) -> f64 {
        self.get(caster, CooldownKey::Spell(spell))
    }

    fn set_spell_cooldown(&self, caster: EntityId, spell: SpellId, seconds: f64) {
        self.set(caster, CooldownKey::Spell(spell), seconds);
    }

    fn group_cooldown(&self, caster: EntityId, group: u32) -> f64 {
        self.get(caster, CooldownKey::Group(group))
    }

    fn set_group_cooldown(&self, caster: EntityId, group: u32, seconds: f64) {
        self.set(caster, CooldownKey::Group(group), seconds);
    }

    fn global_cooldown(&self, caster: EntityId, bucket: u32) -> f64 {
        self.get(caster, CooldownKey::Global(bucket))
    }

    fn set_global_cooldown(&self, caster: EntityId, bucket: u32, seconds: f64) {
        self.set(caster, CooldownKey::Global(bucket), seconds);
    }
}

// ============================================================================
// Costs
// ============================================================================

/// Charges and resource pools per unit.
#[derive(Debug, Default)]
pub struct MemoryCosts {
    charges: Mutex<HashMap<(EntityId, SpellId), u32>>,
    resources: Mutex<HashMap<(EntityId, u32), f32>>,
}

impl MemoryCosts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_charges(&self, caster: EntityId, spell: SpellId, charges: u32) {
        lock(&self.charges).insert((caster, spell), charges);
    }

    pub fn set_resource(&self, caster: EntityId, resource: u32, amount: f32) {
        lock(&self.resources).insert((caster, resource), amount);
    }

    pub fn resource(&self, caster: EntityId, resource: u32) -> f32 {
        lock(&self.resources)
            .get(&(caster, resource))
            .copied()
            .unwrap_or(0.0)
    }
}

impl CostGateway for MemoryCosts {
    fn remaining_charges(&self, caster: EntityId, spell: SpellId) -> Option<u32> {
        lock(&self.charges).get(&(caster, spell)).copied()
    }

    fn consume_charge(&self, caster: EntityId, spell: SpellId) {
        if let Some(charges) = lock(&self.charges).get_mut(&(caster, spell)) {
            *charges = charges.saturating_sub(1);
        }
    }

    fn can_afford(&self, caster: EntityId, costs: &[SpellCost]) -> bool {
        costs
            .iter()
            .all(|cost| self.resource(caster, cost.resource) >= cost.amount)
    }

    fn consume(&self, caster: EntityId, costs: &[SpellCost]) {
        let mut resources = lock(&self.resources);
        for cost in costs {
            let pool = resources.entry((caster, cost.resource)).or_insert(0.0);
            *pool = (*pool - cost.amount).max(0.0);
        }
    }
}

// ============================================================================
// World
// ============================================================================

/// Units, visibility and telegraph contents held in memory.
///
/// Units are enumerated in insertion order for radius queries.
#[derive(Debug, Default)]
pub struct MemoryWorld {
    units: Mutex<Vec<UnitSnapshot>>,
    hidden: Mutex<HashSet<(EntityId, EntityId)>>,
    casting: Mutex<HashSet<EntityId>>,
    telegraph_contents: Mutex<HashMap<u32, Vec<EntityId>>>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a unit.
    pub fn spawn(&self, unit: UnitSnapshot) {
        let mut units = lock(&self.units);
        match units.iter_mut().find(|u| u.id == unit.id) {
            Some(existing) => *existing = unit,
            None => units.push(unit),
        }
    }

    pub fn spawn_at(&self, id: EntityId, kind: UnitKind, position: Vector3) {
        self.spawn(UnitSnapshot {
            id,
            kind,
            position,
            yaw: 0.0,
            alive: true,
        });
    }

    pub fn despawn(&self, id: EntityId) {
        lock(&self.units).retain(|u| u.id != id);
    }

    pub fn move_to(&self, id: EntityId, position: Vector3, yaw: f32) {
        if let Some(unit) = lock(&self.units).iter_mut().find(|u| u.id == id) {
            unit.position = position;
            unit.yaw = yaw;
        }
    }

    pub fn set_alive(&self, id: EntityId, alive: bool) {
        if let Some(unit) = lock(&self.units).iter_mut().find(|u| u.id == id) {
            unit.alive = alive;
        }
    }

    pub fn hide(&self, viewer: EntityId, target: EntityId) {
        lock(&self.hidden).insert((viewer, target));
    }

    pub fn set_casting(&self, id: EntityId, casting: bool) {
        let mut set = lock(&self.casting);
        if casting {
            set.insert(id);
        } else {
            set.remove(&id);
        }
    }

    /// Declares which units the telegraph with `telegraph_id` contains.
    pub fn set_telegraph_contents(&self, telegraph_id: u32, units: Vec<EntityId>) {
        lock(&self.telegraph_contents).insert(telegraph_id, units);
    }
}

impl WorldGateway for MemoryWorld {
    fn unit(&self, id: EntityId) -> Option<UnitSnapshot> {
        lock(&self.units).iter().find(|u| u.id == id).copied()
    }

    fn is_visible(&self, viewer: EntityId, target: EntityId) -> bool {
        self.unit(target).is_some() && !lock(&self.hidden).contains(&(viewer, target))
    }

    fn is_casting(&self, id: EntityId) -> bool {
        lock(&self.casting).contains(&id)
    }

    fn units_in_radius(&self, center: Vector3, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        lock(&self.units)
            .iter()
            .filter(|u| {
                let dx = u.position.x - center.x;
                let dy = u.position.y - center.y;
                let dz = u.position.z - center.z;
                dx * dx + dy * dy + dz * dz <= radius_sq
            })
            .map(|u| u.id)
            .collect()
    }

    fn units_in_telegraph(&self, telegraph: &Telegraph<'_>) -> Vec<EntityId> {
        lock(&self.telegraph_contents)
            .get(&telegraph.id())
            .cloned()
            .unwrap_or_default()
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Sink that records every notification in publication order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    published: Mutex<Vec<SpellNotification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far.
    pub fn published(&self) -> Vec<SpellNotification> {
        lock(&self.published).clone()
    }

    /// Variant names of everything published so far.
    pub fn kinds(&self) -> Vec<&'static str> {
        lock(&self.published).iter().map(|n| n.kind()).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        lock(&self.published)
            .iter()
            .filter(|n| n.kind() == kind)
            .count()
    }

    /// Drains the recorded notifications.
    pub fn take(&self) -> Vec<SpellNotification> {
        std::mem::take(&mut *lock(&self.published))
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, notification: SpellNotification) {
        tracing::trace!(target: "spell::notify", kind = notification.kind(), "publish");
        lock(&self.published).push(notification);
    }
}
