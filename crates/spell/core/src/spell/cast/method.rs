//! Cast-method handlers.
//!
//! Each handler only schedules work on the cast's event queue (or executes
//! immediately); the events themselves are interpreted by the cast.

use crate::spell::event::SpellEventAction;
use crate::spell::types::CastMethod;

use super::Spell;

impl Spell<'_> {
    /// Dispatches on the ability's cast method right after `Casting` is entered.
    pub(super) fn start_cast_method(&mut self) {
        match self.cast_method() {
            CastMethod::Normal | CastMethod::RapidTap | CastMethod::ChargeRelease => {
                self.start_normal()
            }
            CastMethod::Channeled | CastMethod::ChanneledField => self.start_channel(),
            CastMethod::Multiphase => self.start_multiphase(),
            method @ (CastMethod::PressHold
            | CastMethod::ClientSideInteraction
            | CastMethod::Aura) => {
                tracing::debug!(
                    target: "spell::cast",
                    cast_id = %self.cast_id,
                    %method,
                    "no dedicated cast method handler, casting as Normal"
                );
                self.start_normal();
            }
        }
    }

    /// Executes once after the cast time, or right away without one.
    fn start_normal(&mut self) {
        let cast_time = self.config.spell.cast_time;
        if cast_time > 0.0 {
            self.events.enqueue(cast_time, SpellEventAction::Execute);
        } else {
            self.execute();
        }
    }

    /// Pulses at every interval boundary within the cast time, then finishes.
    ///
    /// A channel shorter than one interval still pulses once, at its end.
    fn start_channel(&mut self) {
        let cast_time = self.config.spell.cast_time;
        let interval = match self.config.spell.channel_interval {
            interval if interval > 0.0 => interval,
            _ => self.env.config.channel_pulse_interval,
        };

        let pulses = if interval > 0.0 {
            (cast_time / interval).floor() as u32
        } else {
            0
        };
        if pulses == 0 {
            self.events.enqueue(cast_time, SpellEventAction::Execute);
        } else {
            for pulse in 1..=pulses {
                self.events
                    .enqueue(interval * f64::from(pulse), SpellEventAction::Execute);
            }
        }
        self.events.enqueue(cast_time, SpellEventAction::Finish);

        tracing::trace!(
            target: "spell::cast",
            cast_id = %self.cast_id,
            pulses = pulses.max(1),
            interval,
            "channel scheduled"
        );
    }

    /// Schedules every phase relative to the end of the cast time.
    ///
    /// Without phase data the spell is cast as Normal.
    fn start_multiphase(&mut self) {
        let spell = self.config.spell;
        if spell.phases.is_empty() {
            tracing::warn!(
                target: "spell::cast",
                cast_id = %self.cast_id,
                spell = %spell.id,
                "multiphase spell has no phases"
            );
            self.start_normal();
            return;
        }
        for (index, phase) in spell.phases.iter().enumerate() {
            self.events.enqueue(
                spell.cast_time + phase.delay,
                SpellEventAction::ExecutePhase(index as u8),
            );
        }
    }
}
