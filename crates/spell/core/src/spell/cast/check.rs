//! Cast validation.
//!
//! Checks run in a fixed order and the first failure wins, so the code a
//! caster sees is deterministic for a given world state.

use crate::env::UnitSnapshot;
use crate::spell::CastResult;

use super::Spell;

/// Which checks a validation pass runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CheckMode {
    /// First `cast()` of a new instance.
    Initial,
    /// Continuation of a waiting threshold chain. The root already holds the
    /// caster's cast slot, charge and global cooldown, so those are skipped.
    Continuation,
}

impl Spell<'_> {
    /// Runs the cast checks without changing any state.
    pub fn check_cast(&self) -> CastResult {
        match self.validate(CheckMode::Initial) {
            Ok(_) => CastResult::Ok,
            Err(result) => result,
        }
    }

    pub(super) fn validate(&self, mode: CheckMode) -> Result<UnitSnapshot, CastResult> {
        let env = self.env;
        let spell = self.config.spell;

        let caster = env
            .world
            .unit(self.caster)
            .ok_or(CastResult::CasterNotFound)?;
        if !caster.alive {
            return Err(CastResult::CasterCannotBeDead);
        }

        let runner_override = self.runner_override();
        if !runner_override
            && let Some(prerequisite) = spell.caster_cast_prerequisite
            && !env.prerequisites.meets(self.caster, prerequisite)
        {
            return Err(CastResult::PrerequisiteCasterCast);
        }

        self.check_target_cast()?;
        self.check_crowd_control()?;

        if mode == CheckMode::Initial && caster.is_player() && env.world.is_casting(self.caster) {
            return Err(CastResult::SpellAlreadyCasting);
        }

        let gated = !self.config.is_proxy && self.config.user_initiated;
        if gated {
            if env.cooldowns.spell_cooldown(self.caster, spell.id) > 0.0 {
                return Err(CastResult::SpellCooldown);
            }
            if spell
                .cooldown_groups
                .iter()
                .any(|&group| env.cooldowns.group_cooldown(self.caster, group) > 0.0)
            {
                return Err(CastResult::SpellGroupCooldown);
            }
        }

        if mode == CheckMode::Initial
            && gated
            && let Some(global) = spell.global_cooldown
            && env.cooldowns.global_cooldown(self.caster, global.bucket) > 0.0
        {
            return Err(CastResult::SpellGlobalCooldown);
        }

        if mode == CheckMode::Initial
            && spell.uses_charges
            && env.costs.remaining_charges(self.caster, spell.id) == Some(0)
        {
            return Err(CastResult::SpellNoCharges);
        }

        if !runner_override && !env.costs.can_afford(self.caster, &spell.costs) {
            return Err(CastResult::InsufficientResources);
        }

        Ok(caster)
    }

    /// True if the caster meets any runner prerequisite of the ability.
    pub(super) fn runner_override(&self) -> bool {
        self.config
            .spell
            .runner_prerequisites
            .iter()
            .any(|&prerequisite| self.env.prerequisites.meets(self.caster, prerequisite))
    }

    /// Target-side cast prerequisite. Abilities carry no target prerequisite
    /// data yet, so this always passes.
    fn check_target_cast(&self) -> Result<(), CastResult> {
        Ok(())
    }

    /// Crowd-control gate. Crowd control is not modelled yet; always passes.
    fn check_crowd_control(&self) -> Result<(), CastResult> {
        Ok(())
    }
}
