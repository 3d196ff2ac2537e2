//! Threshold chains.
//!
//! A RapidTap or ChargeRelease root spawns one child cast per step. The root
//! stays in `Waiting` across taps and until every child has reached a
//! terminal status. `threshold_value` never decreases and never exceeds
//! `threshold_max`.

use crate::error::{CastOperation, CoreError, SpellError};
use crate::spell::notification::SpellNotification;
use crate::spell::parameters::CastConfig;
use crate::spell::result::CastResult;
use crate::spell::types::{CastMethod, SpellStatus};

use super::Spell;
use super::check::CheckMode;

impl Spell<'_> {
    /// Spawns the next child of the chain.
    pub(super) fn handle_threshold_cast(&mut self) -> Result<CastResult, SpellError> {
        if self.status != SpellStatus::Waiting {
            return Err(SpellError::InvalidState {
                operation: CastOperation::ThresholdCast,
                status: self.status,
            });
        }

        if self.children.iter().any(|child| child.is_casting()) {
            tracing::debug!(
                target: "spell::threshold",
                cast_id = %self.cast_id,
                "threshold child still casting"
            );
            return Ok(CastResult::SpellAlreadyCasting);
        }
        if self.threshold_value >= self.threshold_max {
            return Ok(CastResult::SpellAlreadyCasting);
        }

        let method = self.cast_method();
        if let Err(result) = self.validate(CheckMode::Continuation) {
            if method == CastMethod::RapidTap && result != CastResult::PrerequisiteCasterCast {
                tracing::debug!(
                    target: "spell::threshold",
                    cast_id = %self.cast_id,
                    %result,
                    "threshold step rejected, chain ends"
                );
                if !self.config.is_proxy {
                    self.publish(SpellNotification::CastResult {
                        spell_id: self.spell_id(),
                        result,
                    });
                }
                self.finish();
                return Ok(result);
            }
            tracing::debug!(
                target: "spell::threshold",
                cast_id = %self.cast_id,
                %result,
                "threshold step continues despite failed check"
            );
        }

        let index = match method {
            CastMethod::ChargeRelease => self.config.spell.hold_tier(self.hold_duration),
            _ => usize::from(self.threshold_value),
        };
        let Some(entry) = self.config.spell.thresholds.get(index).copied() else {
            return self.abort_chain(SpellError::MissingThreshold {
                spell: self.spell_id(),
                index,
            });
        };
        let Some(child_spell) = self.env.catalog.spell(entry.spell) else {
            return self.abort_chain(SpellError::UnknownSpell(entry.spell));
        };

        let config = CastConfig {
            spell: child_spell,
            root_spell: self.config.root_spell,
            parent_spell: self.config.spell,
            primary_target: self.config.primary_target,
            user_initiated: self.config.user_initiated,
            is_proxy: self.config.is_proxy || method == CastMethod::ChargeRelease,
            threshold_order: index as u8 + 1,
            cooldown_override: None,
            force_cancel_only: false,
        };
        let mut child = Spell::new(self.env, self.caster, config);
        let result = child.cast()?;
        tracing::debug!(
            target: "spell::threshold",
            cast_id = %self.cast_id,
            child = %child.cast_id,
            spell = %child_spell.id,
            order = index + 1,
            %result,
            "threshold child spawned"
        );
        self.children.push(child);

        if method == CastMethod::ChargeRelease {
            if !self.config.is_proxy {
                self.apply_cooldown();
            }
            self.threshold_value = self.threshold_max;
        } else {
            self.threshold_value += 1;
        }

        self.publish(SpellNotification::ThresholdUpdate {
            spell_id: self.config.root_spell.id,
            value: self.threshold_value,
        });
        Ok(result)
    }

    /// Accumulates hold time and releases once the last tier is reached.
    pub(super) fn hold(&mut self, dt: f64) {
        if self.threshold_value >= self.threshold_max {
            return;
        }

        let spell = self.config.spell;
        let tier = spell.hold_tier(self.hold_duration);
        self.hold_duration += dt;
        let reached = spell.hold_tier(self.hold_duration);
        if reached != tier {
            self.publish(SpellNotification::ThresholdUpdate {
                spell_id: self.config.root_spell.id,
                value: reached as u8,
            });
        }

        if self.hold_duration >= spell.max_hold_duration()
            && let Err(error) = self.handle_threshold_cast()
        {
            tracing::error!(
                target: "spell::threshold",
                cast_id = %self.cast_id,
                %error,
                "automatic release failed"
            );
        }
    }

    fn abort_chain(&mut self, error: SpellError) -> Result<CastResult, SpellError> {
        tracing::error!(
            target: "spell::threshold",
            cast_id = %self.cast_id,
            code = error.error_code(),
            severity = error.severity().as_str(),
            %error,
            "threshold chain aborted"
        );
        self.finish();
        Err(error)
    }
}
