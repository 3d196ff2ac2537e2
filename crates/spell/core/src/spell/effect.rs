//! Effect pipeline.
//!
//! Effects run in definition order, because an effect may leave state behind
//! (a queued proxy, the cancel-only flag) that later effects in the same pass
//! observe. Handlers are looked up by [`SpellEffectType`] in a registry built
//! once at process start; what a handler does to its target is opaque here.

use std::collections::HashMap;
use std::sync::Arc;

use crate::env::SpellEnv;
use crate::error::{CoreError, EffectError};
use crate::state::{CastingId, EntityId};

use super::definition::{SpellDefinition, SpellEffect, phase_allows};
use super::event::{SpellEventAction, SpellEventManager};
use super::proxy::{Proxy, ProxyHandler};
use super::target::{SpellTargetEffectInfo, SpellTargetInfo};
use super::types::{CastMethod, SpellEffectFlags, SpellEffectType};

// ============================================================================
// Handler Interface
// ============================================================================

/// Everything a handler may read or touch while applying one effect to one
/// target.
pub struct EffectContext<'c> {
    pub env: SpellEnv<'c>,
    pub cast_id: CastingId,
    pub caster: EntityId,
    pub target: EntityId,
    pub spell: &'c SpellDefinition,
    pub effect: &'c SpellEffect,
    /// Record that will be reported for this application.
    pub info: &'c mut SpellTargetEffectInfo,
    pub proxies: &'c mut Vec<Proxy>,
    force_cancel_only: &'c mut bool,
}

impl EffectContext<'_> {
    /// Keeps the cast alive until it is cancelled or finished explicitly.
    pub fn set_force_cancel_only(&mut self) {
        *self.force_cancel_only = true;
    }

    /// Queues a proxy cast to be evaluated after this pass's effects.
    pub fn queue_proxy(&mut self, proxy: Proxy) {
        self.proxies.push(proxy);
    }
}

/// Applies one effect type.
pub trait EffectHandler: Send + Sync {
    fn apply(&self, ctx: &mut EffectContext<'_>) -> Result<(), EffectError>;
}

// ============================================================================
// Handler Registry
// ============================================================================

/// Capability table mapping effect types to handlers.
#[derive(Clone, Default)]
pub struct EffectHandlerRegistry {
    handlers: HashMap<SpellEffectType, Arc<dyn EffectHandler>>,
}

impl EffectHandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the handlers this crate implements itself.
    ///
    /// Default handlers:
    /// - `Proxy`: queues a secondary cast ([`ProxyHandler`])
    pub fn with_defaults() -> Self {
        Self::new().with(SpellEffectType::Proxy, ProxyHandler)
    }

    /// Registers `handler` for `effect_type`, replacing any previous one.
    pub fn register(&mut self, effect_type: SpellEffectType, handler: impl EffectHandler + 'static) {
        self.handlers.insert(effect_type, Arc::new(handler));
    }

    pub fn with(mut self, effect_type: SpellEffectType, handler: impl EffectHandler + 'static) -> Self {
        self.register(effect_type, handler);
        self
    }

    pub fn get(&self, effect_type: SpellEffectType) -> Option<&Arc<dyn EffectHandler>> {
        self.handlers.get(&effect_type)
    }

    pub fn contains(&self, effect_type: SpellEffectType) -> bool {
        self.handlers.contains_key(&effect_type)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl core::fmt::Debug for EffectHandlerRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Mutable cast state one effect pass works on.
pub(crate) struct EffectPass<'p, 'a> {
    pub env: SpellEnv<'a>,
    pub cast_id: CastingId,
    pub caster: EntityId,
    pub spell: &'a SpellDefinition,
    pub phase: u8,
    pub targets: &'p mut [SpellTargetInfo],
    pub proxies: &'p mut Vec<Proxy>,
    pub trigger_counts: &'p mut HashMap<u32, u32>,
    pub events: &'p mut SpellEventManager<SpellEventAction>,
}

/// What the pass hands back to the cast.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct EffectPassOutcome {
    /// Longest effect duration scheduled this pass.
    pub duration: f64,
    pub force_cancel_only: bool,
}

impl EffectPass<'_, '_> {
    pub fn run(self) -> EffectPassOutcome {
        let EffectPass {
            env,
            cast_id,
            caster,
            spell,
            phase,
            targets,
            proxies,
            trigger_counts,
            events,
        } = self;
        let multiphase = spell.cast_method == CastMethod::Multiphase;
        let mut outcome = EffectPassOutcome::default();

        for effect in &spell.effects {
            if let Some(prerequisite) = effect.caster_apply_prerequisite
                && !env.prerequisites.meets(caster, prerequisite)
            {
                tracing::trace!(
                    target: "spell::effect",
                    %cast_id,
                    effect = effect.id,
                    "caster fails apply prerequisite"
                );
                continue;
            }

            if !phase_allows(effect.phase_mask, phase, multiphase) {
                continue;
            }

            let Some(handler) = env.handlers.get(effect.effect_type) else {
                tracing::warn!(
                    target: "spell::effect",
                    %cast_id,
                    effect = effect.id,
                    effect_type = %effect.effect_type,
                    "no handler registered, effect skipped"
                );
                continue;
            };

            let mut applied_to = Vec::new();
            for target in targets
                .iter_mut()
                .filter(|t| t.flags.intersects(effect.target_flags))
            {
                let gate = if target.entity == caster {
                    effect.caster_prerequisite
                } else {
                    effect.target_prerequisite
                };
                if let Some(prerequisite) = gate
                    && !env.prerequisites.meets(target.entity, prerequisite)
                {
                    continue;
                }

                let mut info = SpellTargetEffectInfo {
                    effect_id: effect.id,
                    instance_id: env.ids.next_effect_instance_id(),
                    delay: effect.delay,
                    duration: effect.duration,
                    damage: None,
                };
                let mut ctx = EffectContext {
                    env,
                    cast_id,
                    caster,
                    target: target.entity,
                    spell,
                    effect,
                    info: &mut info,
                    proxies: &mut *proxies,
                    force_cancel_only: &mut outcome.force_cancel_only,
                };

                match handler.apply(&mut ctx) {
                    Ok(()) => {
                        target.effects.push(info);
                        *trigger_counts.entry(effect.id).or_insert(0) += 1;
                        applied_to.push(target.entity);
                    }
                    Err(error) if error.severity().is_recoverable() => {
                        tracing::debug!(
                            target: "spell::effect",
                            %cast_id,
                            effect = effect.id,
                            target_unit = %target.entity,
                            code = error.error_code(),
                            %error,
                            "effect skipped"
                        );
                    }
                    Err(error) => {
                        tracing::warn!(
                            target: "spell::effect",
                            %cast_id,
                            effect = effect.id,
                            target_unit = %target.entity,
                            code = error.error_code(),
                            severity = error.severity().as_str(),
                            %error,
                            "effect handler failed"
                        );
                    }
                }
            }

            if effect.duration > 0.0 {
                events.enqueue(
                    effect.duration,
                    SpellEventAction::EffectExpired {
                        effect_id: effect.id,
                        targets: applied_to,
                    },
                );
                outcome.duration = outcome.duration.max(effect.duration);
            } else if effect.flags.contains(SpellEffectFlags::CANCEL_ONLY) {
                outcome.force_cancel_only = true;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl EffectHandler for Noop {
        fn apply(&self, _ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
            Ok(())
        }
    }

    #[test]
    fn defaults_register_proxy_handler() {
        let registry = EffectHandlerRegistry::with_defaults();
        assert!(registry.contains(SpellEffectType::Proxy));
        assert_eq!(registry.len(), 1);
        assert!(EffectHandlerRegistry::new().is_empty());
    }

    #[test]
    fn register_replaces_existing_handler() {
        let mut registry = EffectHandlerRegistry::new()
            .with(SpellEffectType::Damage, Noop)
            .with(SpellEffectType::Heal, Noop);
        registry.register(SpellEffectType::Damage, Noop);
        assert_eq!(registry.len(), 2);
        assert!(registry.get(SpellEffectType::Damage).is_some());
        assert!(registry.get(SpellEffectType::Teleport).is_none());
    }
}
