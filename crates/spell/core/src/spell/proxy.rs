//! Effect-spawned secondary casts.
//!
//! Proxies are collected while effects run and handled in two strict phases
//! once the pass is over: every proxy is evaluated first, then every proxy
//! that passed is cast. Delayed proxies go onto the parent's own event queue so
//! they interleave with its other timers.

use crate::env::SpellEnv;
use crate::error::EffectError;
use crate::state::{EntityId, PrerequisiteId, SpellId};

use super::effect::{EffectContext, EffectHandler};
use super::event::{ProxyCastRequest, SpellEventAction, SpellEventManager};

#[derive(Clone, Debug, PartialEq)]
pub struct Proxy {
    pub spell: SpellId,
    pub target: EntityId,
    /// Seconds before the proxy cast is handed to the owner.
    pub delay: f64,
    /// Prerequisite the target must meet at evaluation time.
    pub condition: Option<PrerequisiteId>,
    can_cast: bool,
}

impl Proxy {
    pub fn new(spell: SpellId, target: EntityId) -> Self {
        Self {
            spell,
            target,
            delay: 0.0,
            condition: None,
            can_cast: false,
        }
    }

    pub fn with_delay(mut self, seconds: f64) -> Self {
        self.delay = seconds;
        self
    }

    pub fn with_condition(mut self, prerequisite: PrerequisiteId) -> Self {
        self.condition = Some(prerequisite);
        self
    }

    /// Result of the last evaluation.
    pub fn can_cast(&self) -> bool {
        self.can_cast
    }

    /// Resolves the proxy's spell, target and condition.
    pub fn evaluate(&mut self, env: &SpellEnv<'_>) {
        let known_spell = env.catalog.spell(self.spell).is_some();
        let live_target = env.world.unit(self.target).is_some_and(|unit| unit.alive);
        let condition_met = self
            .condition
            .is_none_or(|prerequisite| env.prerequisites.meets(self.target, prerequisite));
        self.can_cast = known_spell && live_target && condition_met;

        if !self.can_cast {
            tracing::debug!(
                target: "spell::proxy",
                spell = %self.spell,
                target_unit = %self.target,
                known_spell,
                live_target,
                condition_met,
                "proxy rejected"
            );
        }
    }

    /// Casts an evaluated proxy on behalf of `caster`.
    pub fn cast(
        &self,
        caster: EntityId,
        events: &mut SpellEventManager<SpellEventAction>,
        requests: &mut Vec<ProxyCastRequest>,
    ) {
        if !self.can_cast {
            return;
        }
        let request = ProxyCastRequest {
            spell: self.spell,
            caster,
            primary_target: self.target,
        };
        if self.delay > 0.0 {
            events.enqueue(self.delay, SpellEventAction::CastProxy(request));
        } else {
            requests.push(request);
        }
    }
}

/// Evaluates then casts every pending proxy, and clears the list.
pub(crate) fn handle_proxies(
    proxies: &mut Vec<Proxy>,
    env: &SpellEnv<'_>,
    caster: EntityId,
    events: &mut SpellEventManager<SpellEventAction>,
    requests: &mut Vec<ProxyCastRequest>,
) {
    for proxy in proxies.iter_mut() {
        proxy.evaluate(env);
    }
    for proxy in proxies.iter() {
        proxy.cast(caster, events, requests);
    }
    proxies.clear();
}

// ============================================================================
// Proxy Effect Handler
// ============================================================================

/// Handler for [`SpellEffectType::Proxy`](super::SpellEffectType::Proxy).
///
/// Parameters: `[spell id, delay in milliseconds, target prerequisite (0 = none), _]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProxyHandler;

impl EffectHandler for ProxyHandler {
    fn apply(&self, ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
        let [spell, delay_ms, condition, _] = ctx.effect.parameters;
        if spell == 0 {
            return Err(EffectError::InvalidData(format!(
                "proxy effect {} has no spell",
                ctx.effect.id
            )));
        }

        let mut proxy = Proxy::new(SpellId(spell), ctx.target).with_delay(f64::from(delay_ms) / 1000.0);
        if condition != 0 {
            proxy = proxy.with_condition(PrerequisiteId(condition));
        }
        ctx.queue_proxy(proxy);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluated(proxy: Proxy) -> Proxy {
        Proxy {
            can_cast: true,
            ..proxy
        }
    }

    #[test]
    fn immediate_proxy_becomes_request() {
        let mut events = SpellEventManager::new();
        let mut requests = Vec::new();
        evaluated(Proxy::new(SpellId(9), EntityId(2))).cast(EntityId(1), &mut events, &mut requests);
        assert_eq!(
            requests,
            vec![ProxyCastRequest {
                spell: SpellId(9),
                caster: EntityId(1),
                primary_target: EntityId(2),
            }]
        );
        assert!(!events.has_pending_event());
    }

    #[test]
    fn delayed_proxy_goes_to_event_queue() {
        let mut events = SpellEventManager::new();
        let mut requests = Vec::new();
        evaluated(Proxy::new(SpellId(9), EntityId(2)).with_delay(0.5)).cast(
            EntityId(1),
            &mut events,
            &mut requests,
        );
        assert!(requests.is_empty());
        assert!(matches!(
            events.update(0.5).as_slice(),
            [SpellEventAction::CastProxy(_)]
        ));
    }

    #[test]
    fn unevaluated_proxy_is_not_cast() {
        let mut events = SpellEventManager::new();
        let mut requests = Vec::new();
        Proxy::new(SpellId(9), EntityId(2)).cast(EntityId(1), &mut events, &mut requests);
        assert!(requests.is_empty());
    }
}
