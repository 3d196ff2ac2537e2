//! Target resolution.
//!
//! The target list is rebuilt from scratch on every execute pass. Its order is
//! visible to clients through the cast-go notification, so the resolver always
//! appends in the same sequence:
//!
//! 1. the caster (`CASTER`)
//! 2. the primary target, if it resolves and the caster can see it (`TARGET`)
//! 3. the area query around the caster (`AREA`)
//! 4. units inside the ability's telegraphs (`TELEGRAPH`)
//! 5. the telegraph subset truncated to the ability's target cap

use std::collections::HashSet;

use crate::env::SpellEnv;
use crate::state::{EffectInstanceId, EntityId};

use super::definition::{SpellDefinition, phase_allows};
use super::notification::{DamageDescription, EffectReport, TargetReport};
use super::telegraph::{Telegraph, anchor_all};
use super::types::{CastMethod, SpellFlags, SpellTargetFlags};

// ============================================================================
// Target Records
// ============================================================================

/// One resolved target and the effects applied to it this pass.
#[derive(Clone, Debug, PartialEq)]
pub struct SpellTargetInfo {
    pub entity: EntityId,
    pub flags: SpellTargetFlags,
    pub effects: Vec<SpellTargetEffectInfo>,
}

impl SpellTargetInfo {
    pub fn new(entity: EntityId, flags: SpellTargetFlags) -> Self {
        Self {
            entity,
            flags,
            effects: Vec::new(),
        }
    }

    /// True when the only role held is `TELEGRAPH`.
    #[inline]
    pub fn is_telegraph_only(&self) -> bool {
        self.flags == SpellTargetFlags::TELEGRAPH
    }

    pub fn report(&self) -> TargetReport {
        TargetReport {
            target: self.entity,
            flags: self.flags,
            effects: self.effects.iter().map(SpellTargetEffectInfo::report).collect(),
        }
    }
}

/// Record of one effect applied to one target.
#[derive(Clone, Debug, PartialEq)]
pub struct SpellTargetEffectInfo {
    pub effect_id: u32,
    pub instance_id: EffectInstanceId,
    pub delay: f64,
    pub duration: f64,
    /// Filled in by damage-dealing handlers.
    pub damage: Option<DamageDescription>,
}

impl SpellTargetEffectInfo {
    pub fn report(&self) -> EffectReport {
        EffectReport {
            effect_id: self.effect_id,
            instance_id: self.instance_id,
            delay: self.delay,
            remaining_duration: self.duration,
            damage: self.damage,
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Computes the ordered target set for one execute pass.
pub struct TargetResolver<'a> {
    pub env: SpellEnv<'a>,
    pub caster: EntityId,
    pub spell: &'a SpellDefinition,
    pub primary_target: Option<EntityId>,
    pub phase: u8,
}

impl<'a> TargetResolver<'a> {
    /// Resolves targets, re-anchoring `telegraphs` for player casters.
    ///
    /// Non-player telegraphs were fixed when the cast started and are only
    /// anchored here if that never happened.
    pub fn resolve(&self, telegraphs: &mut Vec<Telegraph<'a>>) -> Vec<SpellTargetInfo> {
        let world = self.env.world;
        let caster_unit = world.unit(self.caster);
        let mut targets = vec![SpellTargetInfo::new(self.caster, SpellTargetFlags::CASTER)];

        if let Some(primary) = self.primary_target
            && world.unit(primary).is_some()
            && world.is_visible(self.caster, primary)
        {
            targets.push(SpellTargetInfo::new(primary, SpellTargetFlags::TARGET));
        }

        if let (Some(radius), Some(unit)) = (self.spell.aoe_radius, caster_unit) {
            let mut seen = HashSet::new();
            for id in world.units_in_radius(unit.position, radius) {
                if seen.insert(id) {
                    targets.push(SpellTargetInfo::new(id, SpellTargetFlags::AREA));
                }
            }
        }

        if !self.spell.telegraphs.is_empty() {
            match caster_unit {
                Some(unit) if unit.is_player() || telegraphs.is_empty() => {
                    *telegraphs = anchor_all(&self.spell.telegraphs, unit.position, unit.yaw);
                }
                None if telegraphs.is_empty() => {
                    tracing::warn!(
                        target: "spell::target",
                        caster = %self.caster,
                        spell = %self.spell.id,
                        "caster not resolvable, telegraphs skipped"
                    );
                }
                _ => {}
            }
            let selected = self.select_in_telegraphs(telegraphs);
            replace_telegraph_entries(&mut targets, selected);
        }

        if let Some(cap) = self.spell.aoe_target_cap {
            let mut accepted = Vec::new();
            for target in targets.iter().filter(|t| t.is_telegraph_only()) {
                if accepted.len() as u32 >= cap {
                    break;
                }
                accepted.push(target.entity);
            }
            replace_telegraph_entries(&mut targets, accepted);
        }

        tracing::trace!(
            target: "spell::target",
            spell = %self.spell.id,
            count = targets.len(),
            "targets resolved"
        );
        targets
    }

    fn select_in_telegraphs(&self, telegraphs: &[Telegraph<'a>]) -> Vec<EntityId> {
        let multiphase = self.spell.cast_method == CastMethod::Multiphase;
        let unique = self.spell.flags.contains(SpellFlags::UNIQUE_TARGET);
        let mut selected = Vec::new();
        let mut seen_in_pass = HashSet::new();

        for telegraph in telegraphs {
            if !phase_allows(telegraph.phase_mask(), self.phase, multiphase) {
                continue;
            }
            let mut seen_in_telegraph = HashSet::new();
            for id in self.env.world.units_in_telegraph(telegraph) {
                if !seen_in_telegraph.insert(id) {
                    continue;
                }
                if unique && !seen_in_pass.insert(id) {
                    continue;
                }
                selected.push(id);
            }
        }
        selected
    }
}

/// Drops every telegraph-only entry and appends `entities` as new ones.
fn replace_telegraph_entries(targets: &mut Vec<SpellTargetInfo>, entities: Vec<EntityId>) {
    targets.retain(|t| !t.is_telegraph_only());
    targets.extend(
        entities
            .into_iter()
            .map(|id| SpellTargetInfo::new(id, SpellTargetFlags::TELEGRAPH)),
    );
}
