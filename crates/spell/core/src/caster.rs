//! Per-entity owner of in-flight casts.
//!
//! [`SpellCaster`] is the thin driver an entity embeds: it routes input to a
//! waiting threshold chain or a new cast, ticks every cast, starts the proxy
//! casts they request and drops casts once they are terminal.

use crate::env::SpellEnv;
use crate::error::{CoreError, SpellError};
use crate::spell::{CastConfig, CastResult, Spell, SpellNotification};
use crate::state::{CastingId, EntityId};

pub struct SpellCaster<'a> {
    env: SpellEnv<'a>,
    caster: EntityId,
    spells: Vec<Spell<'a>>,
}

impl<'a> SpellCaster<'a> {
    pub fn new(env: SpellEnv<'a>, caster: EntityId) -> Self {
        Self {
            env,
            caster,
            spells: Vec::new(),
        }
    }

    pub fn caster(&self) -> EntityId {
        self.caster
    }

    /// Starts a cast, or continues the waiting chain of the same ability.
    pub fn cast_spell(&mut self, config: CastConfig<'a>) -> Result<CastResult, SpellError> {
        if config.user_initiated
            && let Some(waiting) = self
                .spells
                .iter_mut()
                .find(|spell| spell.is_waiting() && spell.spell_id() == config.spell.id)
        {
            return waiting.cast();
        }

        if !config.is_proxy && config.user_initiated && self.is_casting() && self.is_player() {
            tracing::debug!(
                target: "spell::caster",
                caster = %self.caster,
                spell = %config.spell.id,
                "already casting"
            );
            self.env.notifications.publish(SpellNotification::CastResult {
                spell_id: config.spell.id,
                result: CastResult::SpellAlreadyCasting,
            });
            return Ok(CastResult::SpellAlreadyCasting);
        }

        let mut spell = Spell::new(self.env, self.caster, config);
        let result = spell.cast()?;
        if !spell.is_failed() {
            self.spells.push(spell);
        }
        Ok(result)
    }

    /// Ticks every cast, then starts requested proxies and reaps terminal casts.
    pub fn update(&mut self, dt: f64) {
        let mut requests = Vec::new();
        for spell in &mut self.spells {
            spell.update(dt);
            requests.append(&mut spell.drain_proxy_casts());
        }
        self.spells.retain(|spell| !spell.is_finished() && !spell.is_failed());

        for request in requests {
            let Some(definition) = self.env.catalog.spell(request.spell) else {
                tracing::warn!(
                    target: "spell::caster",
                    caster = %self.caster,
                    spell = %request.spell,
                    "proxy spell missing from catalog"
                );
                continue;
            };
            let config = CastConfig::proxy(definition, Some(request.primary_target));
            match self.cast_spell(config) {
                Ok(result) if !result.is_ok() => tracing::debug!(
                    target: "spell::caster",
                    caster = %self.caster,
                    spell = %request.spell,
                    %result,
                    "proxy cast rejected"
                ),
                Ok(_) => {}
                Err(error) => tracing::error!(
                    target: "spell::caster",
                    caster = %self.caster,
                    spell = %request.spell,
                    code = error.error_code(),
                    severity = error.severity().as_str(),
                    %error,
                    "proxy cast failed"
                ),
            }
        }
    }

    /// Cancels every cast that is casting or still has a chain open.
    pub fn cancel_casting(&mut self, reason: CastResult) {
        for spell in &mut self.spells {
            if spell.is_casting() || spell.has_threshold_to_cast() {
                spell.cancel_cast(reason);
            }
        }
    }

    pub fn is_casting(&self) -> bool {
        self.spells.iter().any(Spell::is_casting)
    }

    fn is_player(&self) -> bool {
        self.env
            .world
            .unit(self.caster)
            .is_some_and(|unit| unit.is_player())
    }

    pub fn spell(&self, cast_id: CastingId) -> Option<&Spell<'a>> {
        self.spells.iter().find(|spell| spell.cast_id() == cast_id)
    }

    pub fn spells(&self) -> &[Spell<'a>] {
        &self.spells
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }
}
